//! トップレベル文の解析
//!
//! 現在のトークンの種類で文の種類を決めます。トップレベルに裸の識別子が
//! 現れた場合は定数宣言の省略形として扱い、`alias`/`base`/`define` の後に
//! 識別子が続く場合だけ宣言文として扱います。

use crate::frontend::ast::{
    Arg, Const, CustomError, Declaration, Enum, EnumConstant, Field, Message, MessageKeyword,
    Method, Return, Service, Statement, StringValue, Transport, Value,
};
use crate::frontend::error::Result;
use crate::frontend::http_status;
use crate::frontend::lexer::{Token, TokenKind};

use super::types::int_type;
use super::Parser;

/// 宣言文の種類を表す文脈依存キーワード
const DECLARATION_KEYWORDS: [&str; 3] = ["alias", "base", "define"];

impl<'s, I: Iterator<Item = Token>> Parser<'s, I> {
    /// トップレベル文を 1 つ解析する
    pub(crate) fn parse_statement(&mut self) -> Result<Statement> {
        match self.current().kind {
            TokenKind::Const => {
                self.advance();
                self.parse_const().map(Statement::Const)
            }
            TokenKind::Identifier => {
                let word = self.current().value.clone();
                if DECLARATION_KEYWORDS.contains(&word.as_str())
                    && self.peek().kind == TokenKind::Identifier
                {
                    self.parse_declaration(&word)
                } else {
                    self.parse_const().map(Statement::Const)
                }
            }
            TokenKind::Enum => self.parse_enum().map(Statement::Enum),
            TokenKind::Message => self.parse_message().map(Statement::Message),
            TokenKind::Service => self.parse_service().map(Statement::Service),
            TokenKind::CustomError => self.parse_custom_error().map(Statement::CustomError),
            _ => Err(self.unexpected("a top-level statement")),
        }
    }

    /// `name [= value]`（`const` キーワードは呼び出し側で消費済み）
    fn parse_const(&mut self) -> Result<Const> {
        let name = self.expect(TokenKind::Identifier, "constant name")?;
        let value = if self.check(TokenKind::Assign) {
            self.advance();
            self.parse_value()?
        } else {
            Value::implicit_true()
        };
        Ok(Const {
            name: name.value,
            value,
        })
    }

    /// `enum Name inttype { A [= n] ... }`
    fn parse_enum(&mut self) -> Result<Enum> {
        self.advance();
        let name = self.expect(TokenKind::Identifier, "enum name")?;
        let int_type = match int_type(self.current().kind) {
            Some(ty) => {
                self.advance();
                ty
            }
            None => return Err(self.unexpected("enum integer type")),
        };
        self.expect(TokenKind::OpenCurly, "'{' after enum type")?;

        let mut constants = Vec::new();
        while !self.check(TokenKind::CloseCurly) {
            let constant = self.expect(TokenKind::Identifier, "enum constant name or '}'")?;
            let value = if self.check(TokenKind::Assign) {
                self.advance();
                Some(self.parse_int("enum constant value")?)
            } else {
                None
            };
            constants.push(EnumConstant {
                name: constant.value,
                value,
            });
        }
        self.advance();

        Ok(Enum {
            name: name.value,
            int_type,
            constants,
        })
    }

    /// `message|model Name { ...Base field: type {opts} }`
    fn parse_message(&mut self) -> Result<Message> {
        let comments = self.take_comments();
        let keyword = match self.advance().value.as_str() {
            "model" => MessageKeyword::Model,
            _ => MessageKeyword::Message,
        };
        let name = self.expect_pascal_case("message name")?;
        self.expect(TokenKind::OpenCurly, "'{' after message name")?;

        let mut extends = Vec::new();
        let mut fields = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::CloseCurly => break,
                TokenKind::Extend => {
                    self.advance();
                    let base = self.expect_pascal_case("extended message name")?;
                    extends.push(base.value);
                }
                TokenKind::Identifier => fields.push(self.parse_field()?),
                _ => return Err(self.unexpected("field, '...' or '}'")),
            }
        }
        self.advance();

        let comment = if comments.is_empty() {
            None
        } else {
            let lines: Vec<&str> = comments.iter().map(|c| c.value.as_str()).collect();
            Some(lines.join("\n"))
        };

        Ok(Message {
            keyword,
            name: name.value,
            extends,
            fields,
            comment,
        })
    }

    /// `name: type [{ options }]`
    fn parse_field(&mut self) -> Result<Field> {
        let name = self.advance();
        self.expect(TokenKind::Colon, "':' after field name")?;
        let ty = self.parse_type()?;
        let options = self.parse_options()?;
        Ok(Field {
            name: name.value,
            ty,
            options,
        })
    }

    /// `service Name { method* }`
    fn parse_service(&mut self) -> Result<Service> {
        self.advance();
        let name = self.expect(TokenKind::Identifier, "service name")?;
        self.expect(TokenKind::OpenCurly, "'{' after service name")?;

        let mut methods = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::CloseCurly => break,
                TokenKind::Http | TokenKind::Rpc => methods.push(self.parse_method()?),
                _ => return Err(self.unexpected("'http', 'rpc' or '}'")),
            }
        }
        self.advance();

        Ok(Service {
            name: name.value,
            methods,
        })
    }

    /// `http|rpc Name(args) [=> (returns)] [{ options }]`
    fn parse_method(&mut self) -> Result<Method> {
        let transport = match self.advance().kind {
            TokenKind::Http => Transport::Http,
            _ => Transport::Rpc,
        };
        let name = self.expect(TokenKind::Identifier, "method name")?;

        self.expect(TokenKind::OpenParen, "'(' after method name")?;
        let mut args = Vec::new();
        while !self.check(TokenKind::CloseParen) {
            let arg = self.expect(TokenKind::Identifier, "argument name or ')'")?;
            self.expect(TokenKind::Colon, "':' after argument name")?;
            let ty = self.parse_type()?;
            args.push(Arg {
                name: arg.value,
                ty,
            });
            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(TokenKind::CloseParen, "',' or ')' after argument")?;

        let mut returns = Vec::new();
        if self.check(TokenKind::Return) {
            self.advance();
            self.expect(TokenKind::OpenParen, "'(' after '=>'")?;
            while !self.check(TokenKind::CloseParen) {
                let stream = self.check(TokenKind::Stream);
                if stream {
                    self.advance();
                }
                let ret = self.expect(TokenKind::Identifier, "return name or ')'")?;
                self.expect(TokenKind::Colon, "':' after return name")?;
                let ty = self.parse_type()?;
                returns.push(Return {
                    name: ret.value,
                    ty,
                    stream,
                });
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect(TokenKind::CloseParen, "',' or ')' after return value")?;
        }

        let options = self.parse_options()?;
        Ok(Method {
            transport,
            name: name.value,
            args,
            returns,
            options,
        })
    }

    /// `error Name { Code = n HttpStatus = Name Msg = "..." }`
    fn parse_custom_error(&mut self) -> Result<CustomError> {
        self.advance();
        let name = self.expect_pascal_case("error name")?;
        self.expect(TokenKind::OpenCurly, "'{' after error name")?;

        let mut code: Option<i64> = None;
        let mut status: Option<u16> = None;
        let mut message: Option<StringValue> = None;

        while !self.check(TokenKind::CloseCurly) {
            let key = self.expect(TokenKind::Identifier, "Code, HttpStatus, Msg or '}'")?;
            let already = match key.value.as_str() {
                "Code" => code.is_some(),
                "HttpStatus" => status.is_some(),
                "Msg" => message.is_some(),
                other => {
                    return Err(self.error_at(
                        &key,
                        format!("unexpected field '{}' in error {}, expected Code, HttpStatus or Msg", other, name.value),
                    ));
                }
            };
            if already {
                return Err(self.error_at(
                    &key,
                    format!("{} is defined multiple times in error {}", key.value, name.value),
                ));
            }
            self.expect(TokenKind::Assign, "'=' after error field")?;
            match key.value.as_str() {
                "Code" => code = Some(self.parse_i64("error code")?),
                "HttpStatus" => status = Some(self.parse_http_status()?),
                _ => message = Some(self.parse_string("error message string")?),
            }
        }
        let close = self.advance();

        let http_status = status.ok_or_else(|| {
            self.error_at(&close, format!("error {} is missing HttpStatus", name.value))
        })?;
        let message = message
            .ok_or_else(|| self.error_at(&close, format!("error {} is missing Msg", name.value)))?;

        Ok(CustomError {
            name: name.value,
            code,
            http_status,
            message,
        })
    }

    /// `NotFound` のような名前、または `404` のような数値
    fn parse_http_status(&mut self) -> Result<u16> {
        let token = self.current().clone();
        let code = match token.kind {
            TokenKind::Identifier => http_status::status_code(&token.value),
            TokenKind::ConstInt => token
                .value
                .parse::<u16>()
                .ok()
                .filter(|code| http_status::status_name(*code).is_some()),
            _ => return Err(self.unexpected("http status name")),
        };
        match code {
            Some(code) => {
                self.advance();
                Ok(code)
            }
            None => Err(self.error_at(&token, format!("unknown http status {}", token.value))),
        }
    }

    /// `alias|base|define Name: type [{ options }]`
    fn parse_declaration(&mut self, keyword: &str) -> Result<Statement> {
        self.advance();
        let name = self.expect_pascal_case("declaration name")?;
        self.expect(TokenKind::Colon, "':' after declaration name")?;
        let ty = self.parse_type()?;
        let options = self.parse_options()?;
        let declaration = Declaration {
            name: name.value,
            ty,
            options,
        };
        Ok(match keyword {
            "alias" => Statement::Alias(declaration),
            "base" => Statement::Base(declaration),
            _ => Statement::Define(declaration),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::frontend::ast::{MessageKeyword, Quote, Statement, Transport, Type, Value};
    use crate::frontend::error::ErrorKind;
    use crate::frontend::parser::parse;

    #[test]
    fn test_const_forms() {
        let program = parse("const a = 1\nconst b\nc = 'x'\nd").unwrap();
        let consts: Vec<_> = program.consts().collect();
        assert_eq!(consts.len(), 4);
        assert_eq!(consts[0].value, Value::Int(1));
        assert!(consts[1].value.is_implicit());
        assert_eq!(consts[2].value.as_str(), Some("x"));
        assert!(consts[3].value.is_implicit());
    }

    #[test]
    fn test_explicit_true_is_not_implicit() {
        let program = parse("const a = true").unwrap();
        let a = program.find_const("a").unwrap();
        assert_eq!(a.value, Value::bool(true));
        assert!(!a.value.is_implicit());
    }

    #[test]
    fn test_enum() {
        let program = parse("enum foo int8 { a = 1 b c }").unwrap();
        let e = program.find_enum("foo").unwrap();
        assert_eq!(e.constants.len(), 3);
        assert_eq!(e.constants[0].value, Some(Value::Int(1)));
        assert_eq!(e.constants[1].value, None);
    }

    #[test]
    fn test_enum_requires_integer_type() {
        let err = parse("enum Foo string { A }").unwrap_err();
        assert_eq!(err.message, "expected enum integer type, got 'string'");
    }

    #[test]
    fn test_message_with_comment_and_extends() {
        let source = "# A user\n# of the system\nmodel User {\n    ...Base\n    Name: string { required max = 10 }  # trailing\n}";
        let program = parse(source).unwrap();
        let user = program.find_message("User").unwrap();
        assert_eq!(user.keyword, MessageKeyword::Model);
        assert_eq!(user.comment.as_deref(), Some("# A user\n# of the system"));
        assert_eq!(user.extends, vec!["Base".to_string()]);
        let name = user.field("Name").unwrap();
        assert_eq!(name.ty, Type::String);
        assert!(name.option("required").unwrap().is_implicit());
        assert_eq!(name.option("max"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_message_name_must_be_pascal_case() {
        let err = parse("message user {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "message name 'user' must be in PascalCase");
    }

    #[test]
    fn test_service() {
        let source = "service Foo {\n    http Upload(upload: file, name: string) => (id: int64) { method = \"POST\" max_upload_size = 10mb }\n    rpc Watch() => (stream event: Event,)\n}";
        let program = parse(source).unwrap();
        let foo = program.find_service("Foo").unwrap();
        let upload = foo.method("Upload").unwrap();
        assert_eq!(upload.transport, Transport::Http);
        assert_eq!(upload.args.len(), 2);
        assert_eq!(upload.http_method(), Some("POST"));
        assert_eq!(upload.max_upload_size(), Some(10 * 1024 * 1024));
        let watch = foo.method("Watch").unwrap();
        assert_eq!(watch.transport, Transport::Rpc);
        assert!(watch.is_streaming());
        assert!(watch.args.is_empty());
    }

    #[test]
    fn test_custom_error() {
        let source = "error UserNotFound {\n    Code = 1001\n    HttpStatus = NotFound\n    Msg = 'user not found'\n}";
        let program = parse(source).unwrap();
        let err = program.custom_errors().next().unwrap();
        assert_eq!(err.code, Some(1001));
        assert_eq!(err.http_status, 404);
        assert_eq!(err.message.value, "user not found");
        assert_eq!(err.message.quote, Quote::Single);
    }

    #[test]
    fn test_custom_error_requires_status_and_message() {
        let err = parse("error Oops { Msg = 'x' }").unwrap_err();
        assert_eq!(err.message, "error Oops is missing HttpStatus");
        let err = parse("error Oops { HttpStatus = BadRequest }").unwrap_err();
        assert_eq!(err.message, "error Oops is missing Msg");
        let err = parse("error Oops { Msg = 'a' Msg = 'b' }").unwrap_err();
        assert_eq!(err.message, "Msg is defined multiple times in error Oops");
        let err = parse("error Oops { HttpStatus = Nope }").unwrap_err();
        assert_eq!(err.message, "unknown http status Nope");
    }

    #[test]
    fn test_declarations_are_contextual() {
        let program = parse("alias Id: string { max = 36 }\nbase = 3\ndefine Flags: []byte").unwrap();
        assert!(matches!(program.statements[0], Statement::Alias(_)));
        assert!(matches!(program.statements[1], Statement::Const(_)));
        assert!(matches!(program.statements[2], Statement::Define(_)));
        assert_eq!(program.declarations().count(), 2);
    }

    #[test]
    fn test_unexpected_top_level_token() {
        let err = parse("}").unwrap_err();
        assert_eq!(err.message, "expected a top-level statement, got '}'");
    }
}
