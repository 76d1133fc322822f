//! 宣言文（alias/base/define）の型の確認

use crate::frontend::ast::Program;
use crate::frontend::error::Result;

use super::SymbolTable;

/// 宣言文の型がすべて既知の列挙型・メッセージ・プリミティブ型で構成されていることを確認する
pub fn check_declaration_types(program: &Program, symbols: &SymbolTable) -> Result<()> {
    for statement in &program.statements {
        if let Some(declaration) = statement.as_declaration() {
            let owner = format!("{} {}", statement.kind_name(), declaration.name);
            symbols.check_type(&declaration.ty, &owner)?;
        }
    }
    Ok(())
}
