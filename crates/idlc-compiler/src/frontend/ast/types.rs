//! 型ノード
//!
//! フィールド・引数・戻り値・宣言が参照する型を表します。
//! 型の集合は閉じており、利用箇所ではすべて網羅的にマッチします。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 整数型（enum の基底型としても使われる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntType {
    /// 符号付きかどうか
    pub fn is_signed(&self) -> bool {
        matches!(self, IntType::Int8 | IntType::Int16 | IntType::Int32 | IntType::Int64)
    }

    /// ビット幅
    pub fn bits(&self) -> u32 {
        match self {
            IntType::Int8 | IntType::Uint8 => 8,
            IntType::Int16 | IntType::Uint16 => 16,
            IntType::Int32 | IntType::Uint32 => 32,
            IntType::Int64 | IntType::Uint64 => 64,
        }
    }

    /// 表現できる最小値
    pub fn min_value(&self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.bits() - 1))
        } else {
            0
        }
    }

    /// 表現できる最大値
    pub fn max_value(&self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.bits() - 1)) - 1
        } else {
            (1i128 << self.bits()) - 1
        }
    }

    /// キーワード
    pub fn as_str(&self) -> &'static str {
        match self {
            IntType::Int8 => "int8",
            IntType::Int16 => "int16",
            IntType::Int32 => "int32",
            IntType::Int64 => "int64",
            IntType::Uint8 => "uint8",
            IntType::Uint16 => "uint16",
            IntType::Uint32 => "uint32",
            IntType::Uint64 => "uint64",
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 浮動小数点型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatType {
    Float32,
    Float64,
}

impl fmt::Display for FloatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatType::Float32 => f.write_str("float32"),
            FloatType::Float64 => f.write_str("float64"),
        }
    }
}

/// 型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Byte,
    Bool,
    Int(IntType),
    Float(FloatType),
    String,
    Timestamp,
    Any,
    File,
    /// `[]T`
    Array(Box<Type>),
    /// `map<K, V>`
    Map { key: Box<Type>, value: Box<Type> },
    /// 未解決の名前（enum またはメッセージ）
    Custom(String),
}

impl Type {
    /// マップのキーとして使える型かどうか
    pub fn is_comparable(&self) -> bool {
        matches!(self, Type::Byte | Type::Int(_) | Type::String)
    }

    /// 組み込みのスカラー型かどうか
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Type::Array(_) | Type::Map { .. } | Type::Custom(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Byte => f.write_str("byte"),
            Type::Bool => f.write_str("bool"),
            Type::Int(int) => write!(f, "{}", int),
            Type::Float(float) => write!(f, "{}", float),
            Type::String => f.write_str("string"),
            Type::Timestamp => f.write_str("timestamp"),
            Type::Any => f.write_str("any"),
            Type::File => f.write_str("file"),
            Type::Array(inner) => write!(f, "[]{}", inner),
            Type::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            Type::Custom(name) => f.write_str(name),
        }
    }
}
