//! プログラム全体の正規形出力
//!
//! 文と文の間は空行で区切ります。ただし同じ種類の文が連続する場合は
//! 空行を入れずに隣接させます（定数の並びなど）。

use std::fmt;

use super::Program;

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&'static str> = None;
        for statement in &self.statements {
            let kind = statement.kind_name();
            match previous {
                Some(prev) if prev == kind => f.write_str("\n")?,
                Some(_) => f.write_str("\n\n")?,
                None => {}
            }
            write!(f, "{}", statement)?;
            previous = Some(kind);
        }
        if previous.is_some() {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// ソースを解析して正規形で出力し直す（ファイル整形ツール向け）
pub fn format_source(source: &str) -> crate::frontend::error::Result<String> {
    let program = crate::frontend::parser::parse(source)?;
    Ok(program.to_string())
}
