//! # 意味解析モジュール
//!
//! 構文解析で生成されたプログラムに対して、決まった順序で検証パスを実行します。
//! 各パスは最初に見つけた違反を返し、後のパスは前のパスの成功を前提とします。
//! 暗黙の値（列挙型の値、エラーコード、統合後のフィールド）はプログラムに直接書き込みます。
//!
//! 検証が失敗したプログラムは途中まで書き換えられているので、再利用せずに解析し直してください。

use log::debug;

use crate::frontend::ast::Program;
use crate::frontend::error::Result;

pub mod constants;
pub mod custom_errors;
pub mod declarations;
pub mod enums;
pub mod inheritance;
pub mod services;
pub mod symbol_table;

pub use self::symbol_table::{Symbol, SymbolKind, SymbolTable};

/// すべての検証パスを実行する
pub fn validate(program: &mut Program) -> Result<()> {
    let symbols = SymbolTable::build(program)?;
    debug!("uniqueness: {} top-level names", symbols.len());

    constants::check_constants(program)?;
    constants::resolve_declaration_options(program)?;
    debug!("constants resolved");

    declarations::check_declaration_types(program, &symbols)?;
    debug!("declaration types checked");

    inheritance::validate_messages(program, &symbols)?;
    debug!("messages validated");

    services::validate_services(program, &symbols)?;
    debug!("services validated");

    enums::resolve_enums(program)?;
    debug!("enum values resolved");

    custom_errors::assign_error_codes(program)?;
    debug!("custom error codes assigned");

    Ok(())
}
