//! # トークン定義
//!
//! スキャナーが生成するトークンの定義を提供します。
//! トークンは種類・リテラル文字列・バイトオフセットのみを持つ純粋なデータです。

use std::fmt;

use serde::{Deserialize, Serialize};

/// トークンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // 制御
    /// 字句解析エラー（値にメッセージを持つ）
    Error,
    /// 入力の終端
    Eof,

    // 識別子とリテラル
    /// 識別子
    Identifier,
    /// 整数リテラル
    ConstInt,
    /// 浮動小数点リテラル
    ConstFloat,
    /// バイトサイズ付きリテラル（`1mb` など）
    ConstBytes,
    /// 時間単位付きリテラル（`100h` など）
    ConstDuration,
    /// 文字列リテラル（引用符を含む）
    ConstString,
    /// 真偽値リテラル
    ConstBool,
    /// null リテラル
    ConstNull,

    // 区切り記号
    /// `=`
    Assign,
    /// `=>`
    Return,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `{`
    OpenCurly,
    /// `}`
    CloseCurly,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `<`
    OpenAngle,
    /// `>`
    CloseAngle,
    /// `...`
    Extend,
    /// `[]`
    Array,

    // コメント
    /// 行頭から始まるコメント
    Comment,
    /// 他のトークンと同じ行に続くコメント
    TrailingComment,

    // キーワード
    Const,
    Enum,
    /// `message` と `model` の両方
    Message,
    Http,
    Rpc,
    Service,
    /// `error` キーワード
    CustomError,
    Stream,
    Map,

    // 組み込み型
    Byte,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Timestamp,
    String,
    Any,
    File,
}

impl TokenKind {
    /// 組み込み型のキーワードかどうか
    pub fn is_primitive_type(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Byte | Bool
                | Int8 | Int16 | Int32 | Int64
                | Uint8 | Uint16 | Uint32 | Uint64
                | Float32 | Float64
                | Timestamp | String | Any | File
        )
    }

    /// 整数型のキーワードかどうか
    pub fn is_integer_type(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Int8 | Int16 | Int32 | Int64 | Uint8 | Uint16 | Uint32 | Uint64
        )
    }

    /// マップのキーとして使える型かどうか
    pub fn is_comparable_type(&self) -> bool {
        self.is_integer_type() || matches!(self, TokenKind::Byte | TokenKind::String)
    }

    /// コメントトークンかどうか
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::TrailingComment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let text = match self {
            Error => "error token",
            Eof => "end of file",
            Identifier => "identifier",
            ConstInt => "integer",
            ConstFloat => "float",
            ConstBytes => "byte size",
            ConstDuration => "duration",
            ConstString => "string",
            ConstBool => "bool",
            ConstNull => "null",
            Assign => "'='",
            Return => "'=>'",
            Colon => "':'",
            Comma => "','",
            OpenCurly => "'{'",
            CloseCurly => "'}'",
            OpenParen => "'('",
            CloseParen => "')'",
            OpenAngle => "'<'",
            CloseAngle => "'>'",
            Extend => "'...'",
            Array => "'[]'",
            Comment | TrailingComment => "comment",
            Const => "'const'",
            Enum => "'enum'",
            Message => "'message'",
            Http => "'http'",
            Rpc => "'rpc'",
            Service => "'service'",
            CustomError => "'error'",
            Stream => "'stream'",
            Map => "'map'",
            Byte => "'byte'",
            Bool => "'bool'",
            Int8 => "'int8'",
            Int16 => "'int16'",
            Int32 => "'int32'",
            Int64 => "'int64'",
            Uint8 => "'uint8'",
            Uint16 => "'uint16'",
            Uint32 => "'uint32'",
            Uint64 => "'uint64'",
            Float32 => "'float32'",
            Float64 => "'float64'",
            Timestamp => "'timestamp'",
            String => "'string'",
            Any => "'any'",
            File => "'file'",
        };
        f.write_str(text)
    }
}

/// トークン
///
/// `start`/`end` は元のソース文字列へのバイトオフセットです。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// トークンの種類
    pub kind: TokenKind,
    /// リテラル文字列（エラートークンではメッセージ）
    pub value: String,
    /// 開始位置
    pub start: usize,
    /// 終了位置
    pub end: usize,
}

impl Token {
    /// 新しいトークンを作成
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            end,
        }
    }

    /// トークンが指定した種類かどうかを判定
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Error => write!(f, "error: {}", self.value),
            _ => write!(f, "'{}'", self.value),
        }
    }
}

/// キーワードの文字列から TokenKind への変換
///
/// 予約語でなければ `None` を返します。
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "const" => TokenKind::Const,
        "enum" => TokenKind::Enum,
        "message" | "model" => TokenKind::Message,
        "http" => TokenKind::Http,
        "rpc" => TokenKind::Rpc,
        "service" => TokenKind::Service,
        "error" => TokenKind::CustomError,
        "stream" => TokenKind::Stream,
        "map" => TokenKind::Map,
        "byte" => TokenKind::Byte,
        "bool" => TokenKind::Bool,
        "int8" => TokenKind::Int8,
        "int16" => TokenKind::Int16,
        "int32" => TokenKind::Int32,
        "int64" => TokenKind::Int64,
        "uint8" => TokenKind::Uint8,
        "uint16" => TokenKind::Uint16,
        "uint32" => TokenKind::Uint32,
        "uint64" => TokenKind::Uint64,
        "float32" => TokenKind::Float32,
        "float64" => TokenKind::Float64,
        "timestamp" => TokenKind::Timestamp,
        "string" => TokenKind::String,
        "any" => TokenKind::Any,
        "file" => TokenKind::File,
        "true" | "false" => TokenKind::ConstBool,
        "null" => TokenKind::ConstNull,
        _ => return None,
    };
    Some(kind)
}
