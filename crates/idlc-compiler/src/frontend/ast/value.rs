//! 値ノードとオプション
//!
//! 定数やオプションの値を表します。文字列はどの引用符で書かれたかを保持し、
//! 真偽値はユーザーが明示的に書いたかどうかを保持します（再出力を冪等にするため）。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 文字列リテラルの引用符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    /// `'...'`
    Single,
    /// `"..."`
    Double,
    /// `` `...` ``（複数行可）
    Backtick,
}

impl Quote {
    /// 引用符の文字
    pub fn as_char(&self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
            Quote::Backtick => '`',
        }
    }

    /// 文字から引用符を判定
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            '`' => Some(Quote::Backtick),
            _ => None,
        }
    }
}

/// 文字列リテラル（内容はエスケープを含めて書かれたまま保持）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringValue {
    pub value: String,
    pub quote: Quote,
}

impl StringValue {
    pub fn new(value: impl Into<String>, quote: Quote) -> Self {
        Self {
            value: value.into(),
            quote,
        }
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.quote.as_char();
        write!(f, "{}{}{}", q, self.value, q)
    }
}

/// 値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// 符号付き整数
    Int(i64),
    /// `i64` に収まらない符号なし整数
    Uint(u64),
    /// 浮動小数点数
    Float(f64),
    /// 文字列
    String(StringValue),
    /// 真偽値（`defined` は `= true` が明示されたかどうか）
    Bool { value: bool, defined: bool },
    /// null
    Null,
    /// 他の定数への参照
    Variable(String),
}

/// 値の種類（マージ時の型比較に使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Float,
    String,
    Bool,
    Null,
    Variable,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Null => "null",
            ValueKind::Variable => "variable",
        };
        f.write_str(name)
    }
}

impl Value {
    /// 省略された値（フラグ形式のオプション）を表す暗黙の `true`
    pub fn implicit_true() -> Self {
        Value::Bool {
            value: true,
            defined: false,
        }
    }

    /// 明示的な真偽値
    pub fn bool(value: bool) -> Self {
        Value::Bool {
            value,
            defined: true,
        }
    }

    /// 値の種類
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) | Value::Uint(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Bool { .. } => ValueKind::Bool,
            Value::Null => ValueKind::Null,
            Value::Variable(_) => ValueKind::Variable,
        }
    }

    /// 暗黙の `true` かどうか
    pub fn is_implicit(&self) -> bool {
        matches!(self, Value::Bool { defined: false, .. })
    }

    /// 整数値として取り出す
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(i128::from(*v)),
            Value::Uint(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// 文字列の内容を取り出す
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&s.value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Uint(v) => write!(f, "{}", v),
            // Debug 表記は整数値でも小数点を残すので、再解析しても浮動小数点のまま
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool { value, .. } => write!(f, "{}", value),
            Value::Null => f.write_str("null"),
            Value::Variable(name) => f.write_str(name),
        }
    }
}

/// `name = value` 形式のオプション
///
/// 値を省略した場合は暗黙の `true` になります。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    pub name: String,
    pub value: Value,
}

impl OptionDef {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_implicit() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} = {}", self.name, self.value)
        }
    }
}

/// オプション列を ` { a b = 1 }` の形で出力する（空なら何も出さない）
pub(crate) fn write_options(f: &mut fmt::Formatter<'_>, options: &[OptionDef]) -> fmt::Result {
    if options.is_empty() {
        return Ok(());
    }
    f.write_str(" {")?;
    for option in options {
        write!(f, " {}", option)?;
    }
    f.write_str(" }")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::String(StringValue::new("hi", Quote::Single)).to_string(), "'hi'");
        assert_eq!(Value::Variable("Max".to_string()).to_string(), "Max");
    }

    #[test]
    fn test_option_display() {
        assert_eq!(OptionDef::new("required", Value::implicit_true()).to_string(), "required");
        assert_eq!(OptionDef::new("required", Value::bool(true)).to_string(), "required = true");
    }
}
