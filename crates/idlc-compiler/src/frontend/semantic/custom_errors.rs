//! カスタムエラーのコード採番
//!
//! `Code` が省略されたエラーには、名前順に連番を振ります。
//! 連番は明示されたコードの最大値 + 1 から始まり、明示されたコードがなければ
//! [`FIRST_ERROR_CODE`] から始まります。同じソースからは常に同じ番号になります。

use std::collections::HashMap;

use log::debug;

use crate::frontend::ast::{Program, Statement};
use crate::frontend::error::{CompilerError, Result};

/// 明示されたコードがないときの最初のコード
pub const FIRST_ERROR_CODE: i64 = 1000;

/// コードが省略されたカスタムエラーに番号を振る
pub fn assign_error_codes(program: &mut Program) -> Result<()> {
    let mut next = {
        let mut explicit: HashMap<i64, &str> = HashMap::new();
        for error in program.custom_errors() {
            let Some(code) = error.code else { continue };
            if let Some(previous) = explicit.insert(code, &error.name) {
                return Err(CompilerError::semantic_error(format!(
                    "error code {} is used by both {} and {}",
                    code, previous, error.name
                )));
            }
        }
        let max = explicit.keys().max().copied();
        match max {
            Some(max) => max.checked_add(1),
            None => Some(FIRST_ERROR_CODE),
        }
    };

    let mut missing: Vec<usize> = program
        .statements
        .iter()
        .enumerate()
        .filter_map(|(index, statement)| match statement {
            Statement::CustomError(e) if e.code.is_none() => Some(index),
            _ => None,
        })
        .collect();
    missing.sort_by(|a, b| program.statements[*a].name().cmp(program.statements[*b].name()));

    debug!("assigning {} error codes starting at {:?}", missing.len(), next);
    for index in missing {
        if let Statement::CustomError(e) = &mut program.statements[index] {
            let code = next.ok_or_else(|| {
                CompilerError::semantic_error(format!(
                    "no error code left for {} after {}",
                    e.name,
                    i64::MAX
                ))
            })?;
            e.code = Some(code);
            next = code.checked_add(1);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;

    fn codes(program: &Program) -> Vec<(&str, Option<i64>)> {
        program
            .custom_errors()
            .map(|e| (e.name.as_str(), e.code))
            .collect()
    }

    #[test]
    fn test_codes_follow_name_order() {
        let mut program = parse(
            "error Zeta { HttpStatus = BadRequest Msg = 'z' }\nerror Alpha { HttpStatus = NotFound Msg = 'a' }",
        )
        .unwrap();
        assign_error_codes(&mut program).unwrap();
        assert_eq!(codes(&program), vec![("Zeta", Some(1001)), ("Alpha", Some(1000))]);
    }

    #[test]
    fn test_codes_continue_after_explicit() {
        let mut program = parse(
            "error B { HttpStatus = 400 Msg = 'b' }\nerror A { Code = 42 HttpStatus = 500 Msg = 'a' }",
        )
        .unwrap();
        assign_error_codes(&mut program).unwrap();
        assert_eq!(codes(&program), vec![("B", Some(43)), ("A", Some(42))]);
    }

    #[test]
    fn test_duplicate_code() {
        let mut program = parse(
            "error A { Code = 1 HttpStatus = 400 Msg = 'a' }\nerror B { Code = 1 HttpStatus = 400 Msg = 'b' }",
        )
        .unwrap();
        let err = assign_error_codes(&mut program).unwrap_err();
        assert_eq!(err.message, "error code 1 is used by both A and B");
    }

    #[test]
    fn test_codes_near_int64_max() {
        let mut program = parse(
            "error A { Code = 9223372036854775806 HttpStatus = 400 Msg = 'a' }\nerror B { HttpStatus = 400 Msg = 'b' }",
        )
        .unwrap();
        assign_error_codes(&mut program).unwrap();
        assert_eq!(codes(&program)[1], ("B", Some(i64::MAX)));

        let mut program = parse(
            "error A { Code = 9223372036854775806 HttpStatus = 400 Msg = 'a' }\nerror B { HttpStatus = 400 Msg = 'b' }\nerror C { HttpStatus = 400 Msg = 'c' }",
        )
        .unwrap();
        let err = assign_error_codes(&mut program).unwrap_err();
        assert_eq!(
            err.message,
            "no error code left for C after 9223372036854775807"
        );

        // 採番が不要なら最大値のコードも使える
        let mut program =
            parse("error A { Code = 9223372036854775807 HttpStatus = 400 Msg = 'a' }").unwrap();
        assert!(assign_error_codes(&mut program).is_ok());
    }
}
