//! 定数参照の解決
//!
//! 定数の値が他の定数を参照している場合、その参照先が存在し、
//! 参照の連鎖が循環しないことを確認します。
//! `alias`/`base`/`define` のオプション値は解決後の値に置き換えます。

use log::debug;

use crate::frontend::ast::{Program, Statement, Value};
use crate::frontend::error::Result;

/// すべての定数の参照が解決できることを確認する
pub fn check_constants(program: &Program) -> Result<()> {
    for constant in program.consts() {
        if matches!(constant.value, Value::Variable(_)) {
            // 定数自身から辿り始めると、循環のエラーがこの定数を指す
            program.resolve_value(&Value::Variable(constant.name.clone()))?;
        }
    }
    Ok(())
}

/// 宣言文のオプションに含まれる定数参照をその値に置き換える
pub fn resolve_declaration_options(program: &mut Program) -> Result<()> {
    // 解決は読み取りだけで済むので、先に置き換え内容を集めてから書き込む
    let mut replacements = Vec::new();
    for (index, statement) in program.statements.iter().enumerate() {
        let Some(declaration) = statement.as_declaration() else {
            continue;
        };
        for (position, option) in declaration.options.iter().enumerate() {
            if matches!(option.value, Value::Variable(_)) {
                let resolved = program.resolve_value(&option.value)?;
                replacements.push((index, position, resolved));
            }
        }
    }

    debug!("resolved {} declaration option references", replacements.len());
    for (index, position, value) in replacements {
        if let Statement::Alias(d) | Statement::Base(d) | Statement::Define(d) =
            &mut program.statements[index]
        {
            d.options[position].value = value;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;

    #[test]
    fn test_declaration_options_are_resolved() {
        let mut program = parse("const Max = 36\nconst Limit = Max\nalias Id: string { max = Limit }").unwrap();
        check_constants(&program).unwrap();
        resolve_declaration_options(&mut program).unwrap();
        let id = program.declarations().next().unwrap();
        assert_eq!(id.options[0].value, Value::Int(36));
        // 定数自体は書き換えない
        assert_eq!(
            program.find_const("Limit").unwrap().value,
            Value::Variable("Max".to_string())
        );
    }

    #[test]
    fn test_missing_reference() {
        let program = parse("const a = b").unwrap();
        let err = check_constants(&program).unwrap_err();
        assert_eq!(err.message, "constant b is not defined");

        let mut program = parse("base Name: string { max = Nope }").unwrap();
        let err = resolve_declaration_options(&mut program).unwrap_err();
        assert_eq!(err.message, "constant Nope is not defined");
    }

    #[test]
    fn test_circular_reference() {
        let program = parse("a = b\nb = a").unwrap();
        let err = check_constants(&program).unwrap_err();
        assert_eq!(err.message, "constant a has a circular reference");
    }
}
