//! # エラー処理モジュール
//!
//! コンパイラのエラー処理を担当するモジュールです。
//! どの段階も最初に見つかった問題だけを返します（フェイルファスト）。
//! 構文エラーには、問題のトークン周辺のソース行を添えます。

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::frontend::lexer::Token;

/// エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 字句解析エラー
    Lexical,
    /// 構文解析エラー
    Syntax,
    /// 意味解析エラー
    Semantic,
    /// I/Oエラー
    IO,
    /// 設定エラー
    Config,
    /// 交換形式（JSON）の読み書きエラー
    Interchange,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Semantic => "semantic error",
            ErrorKind::IO => "io error",
            ErrorKind::Config => "config error",
            ErrorKind::Interchange => "interchange error",
        };
        write!(f, "{}", message)
    }
}

/// ソースコード内の位置情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// 行番号（1から始まる）
    pub line: usize,
    /// 列番号（1から始まる、文字単位）
    pub column: usize,
    /// 位置のバイトオフセット
    pub offset: usize,
    /// 範囲の長さ（バイト単位）
    pub length: usize,
}

impl SourceLocation {
    /// 新しい位置情報を作成
    pub fn new(line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// バイト範囲から行・列を計算して位置情報を作成
    pub fn from_span(source: &str, start: usize, end: usize) -> Self {
        let start = clamp_to_boundary(source, start);
        let end = clamp_to_boundary(source, end.max(start));
        let before = &source[..start];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = source[line_start..start].chars().count() + 1;
        Self::new(line, column, start, end - start)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// コンパイラエラー
///
/// `Display` はメッセージのみを出力します。位置やスニペットを含めた表示は
/// [`CompilerError::render`] を使います。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompilerError {
    /// エラーの種類
    pub kind: ErrorKind,
    /// エラーメッセージ
    pub message: String,
    /// エラーの位置
    pub location: Option<SourceLocation>,
    /// 問題箇所周辺のソースコード
    pub source_snippet: Option<String>,
    /// ソースファイル（ディレクトリ）のパス
    pub file_path: Option<PathBuf>,
}

/// コンパイラ全体で使う Result 型
pub type Result<T> = std::result::Result<T, CompilerError>;

impl CompilerError {
    /// 新しいエラーを作成
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            source_snippet: None,
            file_path: None,
        }
    }

    /// 字句解析エラーを作成
    pub fn lexical_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Lexical, message, Some(location))
    }

    /// 構文解析エラーを作成
    pub fn syntax_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Syntax, message, Some(location))
    }

    /// 意味解析エラーを作成
    pub fn semantic_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, message, None)
    }

    /// 設定エラーを作成
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message, None)
    }

    /// トークンを起点とするエラーを作成し、周辺のソース行を添える
    ///
    /// エラートークンは字句解析エラー、それ以外は構文解析エラーになります。
    pub fn at_token(message: impl Into<String>, token: &Token, source: &str, context_lines: usize) -> Self {
        let location = SourceLocation::from_span(source, token.start, token.end);
        let error = if token.kind == crate::frontend::lexer::TokenKind::Error {
            Self::lexical_error(message, location)
        } else {
            Self::syntax_error(message, location)
        };
        error.with_source_snippet(render_snippet(source, &location, context_lines))
    }

    /// ファイルパスを設定
    pub fn with_file_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// ソースコードスニペットを設定
    pub fn with_source_snippet<S: Into<String>>(mut self, snippet: S) -> Self {
        self.source_snippet = Some(snippet.into());
        self
    }

    /// 人が読むための整形済みメッセージ
    pub fn render(&self) -> String {
        let mut result = format!("{}: {}", self.kind, self.message);
        match (&self.file_path, &self.location) {
            (Some(path), Some(loc)) => result.push_str(&format!("\n  --> {}:{}", path.display(), loc)),
            (Some(path), None) => result.push_str(&format!("\n  --> {}", path.display())),
            (None, Some(loc)) => result.push_str(&format!("\n  --> {}", loc)),
            (None, None) => {}
        }
        if let Some(snippet) = &self.source_snippet {
            result.push('\n');
            result.push_str(snippet);
        }
        result
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorKind::IO, error.to_string(), None)
    }
}

impl From<serde_json::Error> for CompilerError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorKind::Interchange, error.to_string(), None)
    }
}

impl From<toml::de::Error> for CompilerError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_error(error.to_string())
    }
}

/// 位置の周辺 `context_lines` 行を行番号付きで描画する
///
/// 問題の行が中央に来るように前後の行を選び、その行の下にキャレットを置きます。
pub fn render_snippet(source: &str, location: &SourceLocation, context_lines: usize) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let target = location.line.saturating_sub(1).min(lines.len().saturating_sub(1));
    let context_lines = context_lines.max(1);
    let before = (context_lines - 1) / 2;
    let first = target.saturating_sub(before);
    let last = (first + context_lines).min(lines.len());
    let width = last.to_string().len();

    let mut out = String::new();
    for (index, line) in lines.iter().enumerate().take(last).skip(first) {
        let line = line.trim_end_matches('\r');
        out.push_str(&format!("{:>width$} | {}\n", index + 1, line, width = width));
        if index == target {
            let caret_len = source[location.offset..location.offset + location.length]
                .chars()
                .count()
                .max(1);
            out.push_str(&format!(
                "{:>width$} | {}{}\n",
                "",
                " ".repeat(location.column - 1),
                "^".repeat(caret_len),
                width = width
            ));
        }
    }
    out
}

fn clamp_to_boundary(source: &str, mut index: usize) -> usize {
    index = index.min(source.len());
    while !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}
