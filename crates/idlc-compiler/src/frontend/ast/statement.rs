//! トップレベル文のノード
//!
//! 各ノードは `Display` でソースに戻せます（正規形での出力）。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{IntType, Type};
use super::value::{write_options, OptionDef, StringValue, Value};
use crate::frontend::http_status;

const INDENT: &str = "    ";

/// 定数 `const name = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Const {
    pub name: String,
    pub value: Value,
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_implicit() {
            write!(f, "const {}", self.name)
        } else {
            write!(f, "const {} = {}", self.name, self.value)
        }
    }
}

/// enum の定数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    /// 省略時は `None`。検証後は必ず `Some`
    pub value: Option<Value>,
}

/// 列挙型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub int_type: IntType,
    pub constants: Vec<EnumConstant>,
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enum {} {} {{", self.name, self.int_type)?;
        if self.constants.is_empty() {
            return f.write_str("}");
        }
        f.write_str("\n")?;
        for constant in &self.constants {
            match &constant.value {
                Some(value) => writeln!(f, "{}{} = {}", INDENT, constant.name, value)?,
                None => writeln!(f, "{}{}", INDENT, constant.name)?,
            }
        }
        f.write_str("}")
    }
}

/// メッセージのキーワード（再出力のために保持）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKeyword {
    Message,
    Model,
}

impl fmt::Display for MessageKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKeyword::Message => f.write_str("message"),
            MessageKeyword::Model => f.write_str("model"),
        }
    }
}

/// フィールド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub options: Vec<OptionDef>,
}

impl Field {
    /// 名前でオプションを探す
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.iter().find(|o| o.name == name).map(|o| &o.value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)?;
        write_options(f, &self.options)
    }
}

/// メッセージ（モデル）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub keyword: MessageKeyword,
    pub name: String,
    /// `...Base` で継承するメッセージ名
    pub extends: Vec<String>,
    pub fields: Vec<Field>,
    /// 直前の行に書かれたコメント（`#` を含む行をそのまま改行で連結）
    pub comment: Option<String>,
}

impl Message {
    /// 名前でフィールドを探す
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = &self.comment {
            writeln!(f, "{}", comment)?;
        }
        write!(f, "{} {} {{", self.keyword, self.name)?;
        if self.extends.is_empty() && self.fields.is_empty() {
            return f.write_str("}");
        }
        f.write_str("\n")?;
        for base in &self.extends {
            writeln!(f, "{}...{}", INDENT, base)?;
        }
        for field in &self.fields {
            writeln!(f, "{}{}", INDENT, field)?;
        }
        f.write_str("}")
    }
}

/// メソッドの転送方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Http,
    Rpc,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Http => f.write_str("http"),
            Transport::Rpc => f.write_str("rpc"),
        }
    }
}

/// メソッドの引数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// メソッドの戻り値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub stream: bool,
}

impl fmt::Display for Return {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stream {
            f.write_str("stream ")?;
        }
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// サービスのメソッド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub transport: Transport,
    pub name: String,
    pub args: Vec<Arg>,
    pub returns: Vec<Return>,
    pub options: Vec<OptionDef>,
}

impl Method {
    /// 名前でオプションを探す（値の解釈は生成器に任せる）
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    /// HTTP メソッド（`method = "GET"` など）
    pub fn http_method(&self) -> Option<&str> {
        self.option("method").and_then(Value::as_str)
    }

    /// コンテンツタイプ
    pub fn content_type(&self) -> Option<&str> {
        self.option("content_type").and_then(Value::as_str)
    }

    /// アップロードの最大サイズ（バイト）
    pub fn max_upload_size(&self) -> Option<i128> {
        self.option("max_upload_size").and_then(Value::as_i128)
    }

    /// ストリームを返すかどうか
    pub fn is_streaming(&self) -> bool {
        self.returns.iter().any(|r| r.stream)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.transport, self.name)?;
        write_joined(f, &self.args)?;
        f.write_str(")")?;
        if !self.returns.is_empty() {
            f.write_str(" => (")?;
            write_joined(f, &self.returns)?;
            f.write_str(")")?;
        }
        write_options(f, &self.options)
    }
}

/// サービス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
}

impl Service {
    /// 名前でメソッドを探す
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service {} {{", self.name)?;
        if self.methods.is_empty() {
            return f.write_str("}");
        }
        f.write_str("\n")?;
        for method in &self.methods {
            writeln!(f, "{}{}", INDENT, method)?;
        }
        f.write_str("}")
    }
}

/// カスタムエラー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomError {
    pub name: String,
    /// 省略時は検証で連番が振られる
    pub code: Option<i64>,
    pub http_status: u16,
    pub message: StringValue,
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error {} {{", self.name)?;
        if let Some(code) = self.code {
            writeln!(f, "{}Code = {}", INDENT, code)?;
        }
        match http_status::status_name(self.http_status) {
            Some(name) => writeln!(f, "{}HttpStatus = {}", INDENT, name)?,
            None => writeln!(f, "{}HttpStatus = {}", INDENT, self.http_status)?,
        }
        writeln!(f, "{}Msg = {}", INDENT, self.message)?;
        f.write_str("}")
    }
}

/// `alias` / `base` / `define` 宣言（同じ形を共有する）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub options: Vec<OptionDef>,
}

impl Declaration {
    fn write(&self, f: &mut fmt::Formatter<'_>, keyword: &str) -> fmt::Result {
        write!(f, "{} {}: {}", keyword, self.name, self.ty)?;
        write_options(f, &self.options)
    }
}

/// トップレベル文
///
/// 交換形式では `{"type": <種類>, "data": {...}}` として表現されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Statement {
    Const(Const),
    Enum(Enum),
    Message(Message),
    Service(Service),
    #[serde(rename = "error")]
    CustomError(CustomError),
    Alias(Declaration),
    Base(Declaration),
    Define(Declaration),
}

impl Statement {
    /// 文が宣言する名前
    pub fn name(&self) -> &str {
        match self {
            Statement::Const(c) => &c.name,
            Statement::Enum(e) => &e.name,
            Statement::Message(m) => &m.name,
            Statement::Service(s) => &s.name,
            Statement::CustomError(e) => &e.name,
            Statement::Alias(d) | Statement::Base(d) | Statement::Define(d) => &d.name,
        }
    }

    /// 文の種類を表すキーワード
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Const(_) => "const",
            Statement::Enum(_) => "enum",
            Statement::Message(_) => "message",
            Statement::Service(_) => "service",
            Statement::CustomError(_) => "error",
            Statement::Alias(_) => "alias",
            Statement::Base(_) => "base",
            Statement::Define(_) => "define",
        }
    }

    /// 宣言文（alias/base/define）ならその中身
    pub fn as_declaration(&self) -> Option<&Declaration> {
        match self {
            Statement::Alias(d) | Statement::Base(d) | Statement::Define(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Const(c) => write!(f, "{}", c),
            Statement::Enum(e) => write!(f, "{}", e),
            Statement::Message(m) => write!(f, "{}", m),
            Statement::Service(s) => write!(f, "{}", s),
            Statement::CustomError(e) => write!(f, "{}", e),
            Statement::Alias(d) => d.write(f, "alias"),
            Statement::Base(d) => d.write(f, "base"),
            Statement::Define(d) => d.write(f, "define"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
