//! # IDL コンパイラフロントエンド
//!
//! スキーマのソースコードを検証済みのプログラムに変換するまでの全処理を統括します。
//!
//! ## コンパイルフェーズ
//! 1. 字句解析（[`lexer`]）
//! 2. 構文解析（[`parser`]）
//! 3. 意味解析（[`semantic`]）
//!
//! 検証済みの [`ast::Program`] はコード生成器から読み取り専用で参照されます。

pub mod ast;
pub mod error;
pub mod http_status;
pub mod lexer;
pub mod parser;
pub mod semantic;

/// フロントエンドの主要インターフェース
pub use self::{
    ast::Program,
    error::{CompilerError, ErrorKind, Result, SourceLocation},
    lexer::{Lexer, Token, TokenKind, TokenStream},
    parser::Parser,
    semantic::{validate, SymbolTable},
};
