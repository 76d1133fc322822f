//! # シンボルテーブル
//!
//! トップレベルの名前とその定義を管理します。
//! スキーマの名前空間はフラットで、文の種類が違っても同じ名前は定義できません。

use std::collections::HashMap;
use std::fmt;

use crate::frontend::ast::{Program, Statement, Type};
use crate::frontend::error::{CompilerError, Result};

/// シンボルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Constant,
    Enum,
    Message,
    Service,
    CustomError,
    Alias,
    Base,
    Define,
}

impl SymbolKind {
    fn of(statement: &Statement) -> Self {
        match statement {
            Statement::Const(_) => SymbolKind::Constant,
            Statement::Enum(_) => SymbolKind::Enum,
            Statement::Message(_) => SymbolKind::Message,
            Statement::Service(_) => SymbolKind::Service,
            Statement::CustomError(_) => SymbolKind::CustomError,
            Statement::Alias(_) => SymbolKind::Alias,
            Statement::Base(_) => SymbolKind::Base,
            Statement::Define(_) => SymbolKind::Define,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Constant => write!(f, "constant"),
            SymbolKind::Enum => write!(f, "enum"),
            SymbolKind::Message => write!(f, "message"),
            SymbolKind::Service => write!(f, "service"),
            SymbolKind::CustomError => write!(f, "error"),
            SymbolKind::Alias => write!(f, "alias"),
            SymbolKind::Base => write!(f, "base"),
            SymbolKind::Define => write!(f, "define"),
        }
    }
}

/// シンボル定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// シンボル名
    pub name: String,
    /// シンボルの種類
    pub kind: SymbolKind,
    /// プログラム内の文の位置
    pub index: usize,
}

/// シンボルテーブル
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// 新しいシンボルテーブルを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プログラムのトップレベル文をすべて登録する
    ///
    /// 2 回目に現れた名前でエラーになります。
    pub fn build(program: &Program) -> Result<Self> {
        let mut table = Self::new();
        for (index, statement) in program.statements.iter().enumerate() {
            table.add_symbol(Symbol {
                name: statement.name().to_string(),
                kind: SymbolKind::of(statement),
                index,
            })?;
        }
        Ok(table)
    }

    /// シンボルを追加
    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<()> {
        if self.symbols.contains_key(&symbol.name) {
            return Err(CompilerError::semantic_error(format!(
                "{} is defined multiple times",
                symbol.name
            )));
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// 名前からシンボルを検索
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// 名前が指定した種類のシンボルか
    pub fn is(&self, name: &str, kind: SymbolKind) -> bool {
        self.lookup(name).is_some_and(|s| s.kind == kind)
    }

    /// フィールドや引数の型として参照できる名前か（列挙型かメッセージ）
    pub fn is_type(&self, name: &str) -> bool {
        self.is(name, SymbolKind::Enum) || self.is(name, SymbolKind::Message)
    }

    /// 登録されているシンボルの数
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// シンボルが 1 つもないか
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// 型の参照がすべて解決できることを確認する
    ///
    /// マップのキーは比較可能な組み込み型に限ります。`owner` はエラーメッセージで
    /// 問題の要素を示すのに使います（例: `field id in message User`）。
    pub fn check_type(&self, ty: &Type, owner: &str) -> Result<()> {
        match ty {
            Type::Custom(name) if !self.is_type(name) => Err(CompilerError::semantic_error(
                format!("{} has unknown type {}", owner, name),
            )),
            Type::Array(element) => self.check_type(element, owner),
            Type::Map { key, value } => {
                if !key.is_comparable() {
                    return Err(CompilerError::semantic_error(
                        "expected map key type to be comparable",
                    ));
                }
                self.check_type(value, owner)
            }
            _ => Ok(()),
        }
    }
}
