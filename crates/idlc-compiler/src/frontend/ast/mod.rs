//! # 抽象構文木（AST）
//!
//! スキーマのソースコードを表現する抽象構文木の定義です。
//! パーサーが生成し、検証器がその場で内容を書き換え、最終的に
//! コード生成器が読み取り専用で参照します。
//!
//! プログラムはトップレベル文のフラットな列で、宣言順を保持します。

use serde::{Deserialize, Serialize};

use crate::frontend::error::{CompilerError, Result};

pub mod interchange;
pub mod printer;
pub mod statement;
pub mod types;
pub mod value;

pub use self::statement::{
    Arg, Const, CustomError, Declaration, Enum, EnumConstant, Field, Message, MessageKeyword,
    Method, Return, Service, Statement, Transport,
};
pub use self::types::{FloatType, IntType, Type};
pub use self::value::{OptionDef, Quote, StringValue, Value, ValueKind};

/// プログラム全体を表すルートノード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    /// トップレベル文のリスト（宣言順）
    pub statements: Vec<Statement>,
}

impl Program {
    /// 新しいプログラムを作成
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// 文を追加
    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// すべての定数
    pub fn consts(&self) -> impl Iterator<Item = &Const> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Const(c) => Some(c),
            _ => None,
        })
    }

    /// すべての列挙型
    pub fn enums(&self) -> impl Iterator<Item = &Enum> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Enum(e) => Some(e),
            _ => None,
        })
    }

    /// すべてのメッセージ
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Message(m) => Some(m),
            _ => None,
        })
    }

    /// すべてのサービス
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Service(s) => Some(s),
            _ => None,
        })
    }

    /// すべてのカスタムエラー
    pub fn custom_errors(&self) -> impl Iterator<Item = &CustomError> {
        self.statements.iter().filter_map(|s| match s {
            Statement::CustomError(e) => Some(e),
            _ => None,
        })
    }

    /// すべての alias/base/define 宣言
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.statements.iter().filter_map(Statement::as_declaration)
    }

    /// 名前で定数を探す
    pub fn find_const(&self, name: &str) -> Option<&Const> {
        self.consts().find(|c| c.name == name)
    }

    /// 名前でメッセージを探す
    pub fn find_message(&self, name: &str) -> Option<&Message> {
        self.messages().find(|m| m.name == name)
    }

    /// 名前で列挙型を探す
    pub fn find_enum(&self, name: &str) -> Option<&Enum> {
        self.enums().find(|e| e.name == name)
    }

    /// 名前でサービスを探す
    pub fn find_service(&self, name: &str) -> Option<&Service> {
        self.services().find(|s| s.name == name)
    }

    /// 名前がメッセージを指すか
    pub fn is_message(&self, name: &str) -> bool {
        self.find_message(name).is_some()
    }

    /// 名前が列挙型を指すか
    pub fn is_enum(&self, name: &str) -> bool {
        self.find_enum(name).is_some()
    }

    /// 定数参照をたどって最終的な値を返す
    ///
    /// 参照でない値はそのまま返します。存在しない定数や循環参照はエラーです。
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        let mut seen: Vec<&str> = Vec::new();
        let mut current = value;
        while let Value::Variable(name) = current {
            if seen.contains(&name.as_str()) {
                return Err(CompilerError::semantic_error(format!(
                    "constant {} has a circular reference",
                    name
                )));
            }
            seen.push(name);
            let constant = self.find_const(name).ok_or_else(|| {
                CompilerError::semantic_error(format!("constant {} is not defined", name))
            })?;
            current = &constant.value;
        }
        Ok(current.clone())
    }
}
