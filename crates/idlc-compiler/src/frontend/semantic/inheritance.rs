//! # メッセージの継承
//!
//! メッセージの `...Base` による継承を検証し、フィールドを統合します。
//!
//! 1. 継承関係の循環を反復的な深さ優先探索で検出する
//! 2. 同じ継承先を 2 回書いていないか確認する
//! 3. 継承元のフィールドを先頭に連結し、名前で重複を除いてから名前順に並べる
//!
//! 統合は継承元から順に行うので、継承元のフィールドは常に統合済みです。

use log::debug;

use crate::frontend::ast::{Field, OptionDef, Program, Statement};
use crate::frontend::error::{CompilerError, Result};

use super::symbol_table::SymbolTable;

/// 探索中の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// 探索スタック上にある
    Active,
    /// 探索済み
    Done,
}

/// メッセージの検証と統合を行う
pub fn validate_messages(program: &mut Program, symbols: &SymbolTable) -> Result<()> {
    let order = detect_cycles(program)?;
    check_unique_extends(program)?;
    for index in order {
        merge_fields(program, symbols, index)?;
    }
    Ok(())
}

/// 継承の循環を検出し、継承元が先に来る順序で文の位置を返す
pub fn detect_cycles(program: &Program) -> Result<Vec<usize>> {
    let messages: Vec<(usize, &str, &[String])> = program
        .statements
        .iter()
        .enumerate()
        .filter_map(|(index, statement)| match statement {
            Statement::Message(m) => Some((index, m.name.as_str(), m.extends.as_slice())),
            _ => None,
        })
        .collect();

    // 未知の継承先はここでは無視し、統合のときにエラーにする
    let edges: Vec<Vec<usize>> = messages
        .iter()
        .map(|(_, _, extends)| {
            extends
                .iter()
                .filter_map(|base| messages.iter().position(|(_, name, _)| name == base))
                .collect()
        })
        .collect();

    let mut state: Vec<Option<Visit>> = vec![None; messages.len()];
    let mut order = Vec::with_capacity(messages.len());

    for start in 0..messages.len() {
        if state[start].is_some() {
            continue;
        }
        state[start] = Some(Visit::Active);
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            match edges[node].get(frame.1) {
                Some(&target) => {
                    frame.1 += 1;
                    match state[target] {
                        Some(Visit::Active) => {
                            return Err(CompilerError::semantic_error(format!(
                                "message {} is part of a cycle",
                                messages[target].1
                            )));
                        }
                        Some(Visit::Done) => {}
                        None => {
                            state[target] = Some(Visit::Active);
                            stack.push((target, 0));
                        }
                    }
                }
                None => {
                    stack.pop();
                    state[node] = Some(Visit::Done);
                    order.push(messages[node].0);
                }
            }
        }
    }

    debug!("inheritance graph of {} messages is acyclic", messages.len());
    Ok(order)
}

/// 同じ継承先が 2 回書かれていないか
pub fn check_unique_extends(program: &Program) -> Result<()> {
    for message in program.messages() {
        for (i, base) in message.extends.iter().enumerate() {
            if message.extends[..i].contains(base) {
                return Err(CompilerError::semantic_error(format!(
                    "message {} extends {} more than once",
                    message.name, base
                )));
            }
        }
    }
    Ok(())
}

/// 1 つのメッセージのフィールドを継承元と統合する
fn merge_fields(program: &mut Program, symbols: &SymbolTable, index: usize) -> Result<()> {
    let merged = {
        let Statement::Message(message) = &program.statements[index] else {
            return Ok(());
        };

        let mut candidates: Vec<Field> = Vec::new();
        for base in &message.extends {
            let base_message = program.find_message(base).ok_or_else(|| {
                CompilerError::semantic_error(format!(
                    "message {} extends unknown message {}",
                    message.name, base
                ))
            })?;
            candidates.extend(base_message.fields.iter().cloned());
        }
        candidates.extend(message.fields.iter().cloned());

        let mut merged: Vec<Field> = Vec::with_capacity(candidates.len());
        for field in candidates {
            let owner = format!("field {} in message {}", field.name, message.name);
            symbols.check_type(&field.ty, &owner)?;
            for option in &field.options {
                program.resolve_value(&option.value)?;
            }

            match merged.iter_mut().find(|f| f.name == field.name) {
                None => merged.push(field),
                Some(existing) => {
                    if existing.ty != field.ty {
                        return Err(CompilerError::semantic_error(format!(
                            "{} has a different type",
                            owner
                        )));
                    }
                    merge_options(program, &mut existing.options, field.options, &owner)?;
                }
            }
        }

        merged.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("message {} has {} fields after merge", message.name, merged.len());
        merged
    };

    if let Statement::Message(message) = &mut program.statements[index] {
        message.fields = merged;
    }
    Ok(())
}

/// 後から来たオプションで上書きする（値の種類が違えばエラー）
fn merge_options(
    program: &Program,
    options: &mut Vec<OptionDef>,
    incoming: Vec<OptionDef>,
    owner: &str,
) -> Result<()> {
    for option in incoming {
        match options.iter_mut().find(|o| o.name == option.name) {
            None => options.push(option),
            Some(existing) => {
                let before = program.resolve_value(&existing.value)?.kind();
                let after = program.resolve_value(&option.value)?.kind();
                if before != after {
                    return Err(CompilerError::semantic_error(format!(
                        "option {} of {} has a different kind ({} and {})",
                        option.name, owner, before, after
                    )));
                }
                existing.value = option.value;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Type, Value};
    use crate::frontend::parser::parse;

    fn run(source: &str) -> Result<Program> {
        let mut program = parse(source)?;
        let symbols = SymbolTable::build(&program)?;
        validate_messages(&mut program, &symbols)?;
        Ok(program)
    }

    #[test]
    fn test_cycle() {
        let err = run("message A { ...B }\nmessage B { ...A }").unwrap_err();
        assert_eq!(err.message, "message A is part of a cycle");
        let err = run("message A { ...A }").unwrap_err();
        assert_eq!(err.message, "message A is part of a cycle");
    }

    #[test]
    fn test_topological_order() {
        let program = parse("message C { ...B }\nmessage B { ...A }\nmessage A {}").unwrap();
        assert_eq!(detect_cycles(&program).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_transitive_merge() {
        let program = run(
            "message C {\n    ...B\n    c: string\n}\nmessage B {\n    ...A\n    b: string\n}\nmessage A {\n    a: string\n}",
        )
        .unwrap();
        let c = program.find_message("C").unwrap();
        let names: Vec<&str> = c.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_extends() {
        let err = run("message A {}\nmessage B { ...A ...A }").unwrap_err();
        assert_eq!(err.message, "message B extends A more than once");
    }

    #[test]
    fn test_unknown_base() {
        let err = run("message B { ...A }").unwrap_err();
        assert_eq!(err.message, "message B extends unknown message A");
    }

    #[test]
    fn test_field_type_conflict() {
        let err = run("message Base { x: string }\nmessage M {\n    ...Base\n    x: int32\n}").unwrap_err();
        assert_eq!(err.message, "field x in message M has a different type");
    }

    #[test]
    fn test_option_override() {
        let program = run(
            "const Limit = 20\nmessage Base { x: string { max = 10 required } }\nmessage M {\n    ...Base\n    x: string { max = Limit }\n}",
        )
        .unwrap();
        let x = program.find_message("M").unwrap().field("x").unwrap();
        assert_eq!(x.ty, Type::String);
        assert_eq!(x.options.len(), 2);
        assert_eq!(x.option("max"), Some(&Value::Variable("Limit".to_string())));
        assert!(x.option("required").is_some());
    }

    #[test]
    fn test_option_kind_conflict() {
        let err = run("message Base { x: string { max = 10 } }\nmessage M {\n    ...Base\n    x: string { max = 'ten' }\n}")
            .unwrap_err();
        assert_eq!(
            err.message,
            "option max of field x in message M has a different kind (int and string)"
        );
    }

    #[test]
    fn test_unknown_field_type() {
        let err = run("message M { group: Group }").unwrap_err();
        assert_eq!(err.message, "field group in message M has unknown type Group");
    }
}
