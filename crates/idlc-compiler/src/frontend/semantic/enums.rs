//! 列挙型の定数値の解決
//!
//! 宣言順に定数をたどり、値が省略されたものには直前の値 + 1 を割り当てます。
//! 最初の定数の値を省略すると 0 になります。明示された値はカウンタをその値に戻します。

use crate::frontend::ast::{Enum, IntType, Program, Statement, Value};
use crate::frontend::error::{CompilerError, Result};

/// すべての列挙型の定数値を確定させる
pub fn resolve_enums(program: &mut Program) -> Result<()> {
    for statement in &mut program.statements {
        if let Statement::Enum(e) = statement {
            resolve_enum(e)?;
        }
    }
    Ok(())
}

/// 1 つの列挙型の定数値を確定させ、名前と値の重複を確認する
pub fn resolve_enum(e: &mut Enum) -> Result<()> {
    let mut counter: i128 = -1;
    let mut values: Vec<i128> = Vec::with_capacity(e.constants.len());

    for constant in &mut e.constants {
        let value = match constant.value.as_ref().and_then(Value::as_i128) {
            Some(explicit) => explicit,
            None => counter + 1,
        };
        counter = value;

        let typed = typed_value(e.int_type, value).ok_or_else(|| {
            CompilerError::semantic_error(format!(
                "value {} of {}.{} is out of range for {}",
                value, e.name, constant.name, e.int_type
            ))
        })?;
        constant.value = Some(typed);
        values.push(value);
    }

    for (i, constant) in e.constants.iter().enumerate() {
        if values[..i].contains(&values[i]) {
            return Err(CompilerError::semantic_error(format!(
                "value {} is defined multiple times in enum {}",
                values[i], e.name
            )));
        }
        if constant.name != "_" && e.constants[..i].iter().any(|c| c.name == constant.name) {
            return Err(CompilerError::semantic_error(format!(
                "{} is defined multiple times in enum {}",
                constant.name, e.name
            )));
        }
    }
    Ok(())
}

/// 値が列挙型の範囲に収まれば、符号に合わせた値にする
fn typed_value(int_type: IntType, value: i128) -> Option<Value> {
    if value < int_type.min_value() || value > int_type.max_value() {
        return None;
    }
    if int_type.is_signed() {
        i64::try_from(value).ok().map(Value::Int)
    } else {
        u64::try_from(value).ok().map(Value::Uint)
    }
}
