//! 型の解析

use crate::frontend::ast::{FloatType, IntType, Type};
use crate::frontend::error::Result;
use crate::frontend::lexer::{Token, TokenKind};

use super::Parser;

/// 組み込み型のキーワードを型に変換する
pub fn primitive_type(kind: TokenKind) -> Option<Type> {
    let ty = match kind {
        TokenKind::Byte => Type::Byte,
        TokenKind::Bool => Type::Bool,
        TokenKind::Float32 => Type::Float(FloatType::Float32),
        TokenKind::Float64 => Type::Float(FloatType::Float64),
        TokenKind::Timestamp => Type::Timestamp,
        TokenKind::String => Type::String,
        TokenKind::Any => Type::Any,
        TokenKind::File => Type::File,
        other => Type::Int(int_type(other)?),
    };
    Some(ty)
}

/// 整数型のキーワードを整数型に変換する
pub fn int_type(kind: TokenKind) -> Option<IntType> {
    let ty = match kind {
        TokenKind::Int8 => IntType::Int8,
        TokenKind::Int16 => IntType::Int16,
        TokenKind::Int32 => IntType::Int32,
        TokenKind::Int64 => IntType::Int64,
        TokenKind::Uint8 => IntType::Uint8,
        TokenKind::Uint16 => IntType::Uint16,
        TokenKind::Uint32 => IntType::Uint32,
        TokenKind::Uint64 => IntType::Uint64,
        _ => return None,
    };
    Some(ty)
}

impl<'s, I: Iterator<Item = Token>> Parser<'s, I> {
    /// 型を解析する
    ///
    /// ```text
    /// type := primitive | Name | '[]' type | 'map' '<' comparable ',' type '>'
    /// ```
    pub(crate) fn parse_type(&mut self) -> Result<Type> {
        let kind = self.current().kind;
        match kind {
            TokenKind::Array => {
                self.advance();
                Ok(Type::Array(Box::new(self.parse_type()?)))
            }
            TokenKind::Map => self.parse_map_type(),
            TokenKind::Identifier => {
                let name = self.expect_pascal_case("type name")?;
                Ok(Type::Custom(name.value))
            }
            _ => match primitive_type(kind) {
                Some(ty) => {
                    self.advance();
                    Ok(ty)
                }
                None => Err(self.unexpected("a type")),
            },
        }
    }

    fn parse_map_type(&mut self) -> Result<Type> {
        self.advance();
        self.expect(TokenKind::OpenAngle, "'<' after 'map'")?;

        let key_token = self.current().clone();
        if key_token.kind == TokenKind::Error {
            return Err(self.unexpected("map key type"));
        }
        let key = match primitive_type(key_token.kind) {
            Some(ty) if key_token.kind.is_comparable_type() => ty,
            _ => {
                return Err(self.error_at(&key_token, "expected map key type to be comparable"));
            }
        };
        self.advance();

        self.expect(TokenKind::Comma, "',' after map key type")?;
        let value = self.parse_type()?;
        self.expect(TokenKind::CloseAngle, "'>' to close map type")?;
        Ok(Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }
}
