//! 交換形式（JSON）への保存と読み込み
//!
//! プログラムは `[{"type": "message", "data": {...}}, ...]` のような
//! 順序を保った配列として表現されます。

use log::debug;

use super::Program;
use crate::frontend::error::Result;

impl Program {
    /// JSON 文字列に変換する
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        debug!("serialized {} statements to json", self.statements.len());
        Ok(json)
    }

    /// JSON 値に変換する
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// JSON 文字列から読み込む
    pub fn from_json(json: &str) -> Result<Self> {
        let program: Program = serde_json::from_str(json)?;
        debug!("deserialized {} statements from json", program.statements.len());
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use crate::frontend::ast::{Const, Program, Statement, Value};
    use crate::frontend::error::ErrorKind;

    #[test]
    fn test_statement_is_tagged() {
        let program = Program::new(vec![Statement::Const(Const {
            name: "Max".to_string(),
            value: Value::Int(10),
        })]);
        let json = program.to_json_value().unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "type": "const", "data": { "name": "Max", "value": { "int": 10 } } }
            ])
        );
    }

    #[test]
    fn test_invalid_json_is_interchange_error() {
        let err = Program::from_json("{").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Interchange);
    }
}
