//! 値とオプションの解析
//!
//! リテラルトークンを [`Value`] に変換します。`_` 区切りは取り除き、
//! 時間単位とバイトサイズはそれぞれナノ秒とバイトに換算した整数になります。

use crate::frontend::ast::{OptionDef, Quote, StringValue, Value};
use crate::frontend::error::Result;
use crate::frontend::lexer::number::{byte_scale, duration_scale, BYTE_UNITS, DURATION_UNITS};
use crate::frontend::lexer::{Token, TokenKind};

use super::Parser;

impl<'s, I: Iterator<Item = Token>> Parser<'s, I> {
    /// 値を解析する
    pub(crate) fn parse_value(&mut self) -> Result<Value> {
        let token = self.current().clone();
        let value = match token.kind {
            TokenKind::ConstInt => parse_int_literal(&token.value),
            TokenKind::ConstFloat => parse_float_literal(&token.value),
            TokenKind::ConstBytes => parse_scaled_literal(&token.value, &BYTE_UNITS, byte_scale),
            TokenKind::ConstDuration => {
                parse_scaled_literal(&token.value, &DURATION_UNITS, duration_scale)
            }
            TokenKind::ConstString => parse_string_literal(&token.value).map(Value::String),
            TokenKind::ConstBool => Ok(Value::bool(token.value == "true")),
            TokenKind::ConstNull => Ok(Value::Null),
            TokenKind::Identifier => Ok(Value::Variable(token.value.clone())),
            _ => return Err(self.unexpected("a value")),
        };
        let value = value.map_err(|message| self.error_at(&token, message))?;
        self.advance();
        Ok(value)
    }

    /// 整数リテラルを解析する（`i64` を超える正の値は [`Value::Uint`]）
    pub(crate) fn parse_int(&mut self, what: &str) -> Result<Value> {
        let token = self.expect(TokenKind::ConstInt, what)?;
        parse_int_literal(&token.value).map_err(|message| self.error_at(&token, message))
    }

    /// 整数リテラルを `i64` として解析する
    pub(crate) fn parse_i64(&mut self, what: &str) -> Result<i64> {
        let token = self.expect(TokenKind::ConstInt, what)?;
        match parse_int_literal(&token.value) {
            Ok(Value::Int(v)) => Ok(v),
            Ok(_) => Err(self.error_at(&token, format!("{} overflows int64", token.value))),
            Err(message) => Err(self.error_at(&token, message)),
        }
    }

    /// 文字列リテラルを解析する
    pub(crate) fn parse_string(&mut self, what: &str) -> Result<StringValue> {
        let token = self.expect(TokenKind::ConstString, what)?;
        parse_string_literal(&token.value).map_err(|message| self.error_at(&token, message))
    }

    /// `{ name [= value] ... }` 形式のオプションブロックを解析する
    ///
    /// `{` がなければ空のリストを返します。
    pub(crate) fn parse_options(&mut self) -> Result<Vec<OptionDef>> {
        let mut options = Vec::new();
        if !self.check(TokenKind::OpenCurly) {
            return Ok(options);
        }
        self.advance();
        while !self.check(TokenKind::CloseCurly) {
            let name = self.expect(TokenKind::Identifier, "option name or '}'")?;
            let value = if self.check(TokenKind::Assign) {
                self.advance();
                self.parse_value()?
            } else {
                Value::implicit_true()
            };
            options.push(OptionDef::new(name.value, value));
        }
        self.advance();
        Ok(options)
    }
}

/// 符号と 16 進接頭辞を取り除いた絶対値を返す
fn parse_magnitude(text: &str) -> std::result::Result<(bool, u64), String> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let magnitude = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => unsigned.parse::<u64>(),
    }
    .map_err(|_| format!("integer {} is out of range", text))?;
    Ok((negative, magnitude))
}

/// 整数リテラルを値に変換する
///
/// `i64` に収まる値は [`Value::Int`]、収まらない正の値は [`Value::Uint`] になります。
pub fn parse_int_literal(text: &str) -> std::result::Result<Value, String> {
    let (negative, magnitude) = parse_magnitude(text)?;
    integer_value(negative, i128::from(magnitude), text)
}

fn integer_value(negative: bool, magnitude: i128, text: &str) -> std::result::Result<Value, String> {
    let signed = if negative { -magnitude } else { magnitude };
    if let Ok(v) = i64::try_from(signed) {
        Ok(Value::Int(v))
    } else if let Ok(v) = u64::try_from(signed) {
        Ok(Value::Uint(v))
    } else {
        Err(format!("integer {} is out of range", text))
    }
}

/// 浮動小数点リテラルを値に変換する
pub fn parse_float_literal(text: &str) -> std::result::Result<Value, String> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Value::Float(v)),
        _ => Err(format!("float {} is out of range", text)),
    }
}

/// 接尾辞付きリテラルを基本単位の整数に換算する
///
/// 単位は `units` のうち末尾に一致する最長のものです（16 進の `0xAkb` は `0xA` と `kb`）。
fn parse_scaled_literal(
    text: &str,
    units: &[&str],
    scale: fn(&str) -> Option<i64>,
) -> std::result::Result<Value, String> {
    let (number, unit) = units
        .iter()
        .filter_map(|unit| text.strip_suffix(unit).map(|number| (number, *unit)))
        .filter(|(number, _)| !number.is_empty())
        .max_by_key(|(_, unit)| unit.len())
        .ok_or_else(|| format!("invalid number suffix in '{}'", text))?;
    let factor = scale(unit).ok_or_else(|| format!("invalid number suffix '{}'", unit))?;
    let (negative, magnitude) = parse_magnitude(number)?;
    let scaled = i128::from(magnitude)
        .checked_mul(i128::from(factor))
        .ok_or_else(|| format!("integer {} is out of range", text))?;
    integer_value(negative, scaled, text)
}

/// 引用符を外して文字列値にする（エスケープはそのまま保持）
pub fn parse_string_literal(text: &str) -> std::result::Result<StringValue, String> {
    let mut chars = text.chars();
    let quote = chars
        .next()
        .and_then(Quote::from_char)
        .ok_or_else(|| format!("malformed string literal {}", text))?;
    let q = quote.as_char();
    let inner = text
        .strip_prefix(q)
        .and_then(|rest| rest.strip_suffix(q))
        .ok_or_else(|| format!("malformed string literal {}", text))?;
    Ok(StringValue::new(inner, quote))
}
