//! コンパイラ設定モジュール
//!
//! スキーマの読み込み方や字句解析の実行方法など、コンパイラの動作を設定します。

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::frontend::error::{CompilerError, Result};

/// 字句解析の実行方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// パーサーが必要なときにトークンを取り出す
    #[default]
    Inline,
    /// 別スレッドのスキャナーが有界キュー経由でトークンを送る
    Threaded,
}

impl FromStr for ScanMode {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(ScanMode::Inline),
            "threaded" => Ok(ScanMode::Threaded),
            _ => Err(CompilerError::config_error(format!("invalid scan_mode: {}", s))),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Inline => write!(f, "inline"),
            ScanMode::Threaded => write!(f, "threaded"),
        }
    }
}

/// コンパイラの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// スキーマを構成するファイルの拡張子（`.` なし）
    pub file_extension: String,

    /// 字句解析の実行方法
    pub scan_mode: ScanMode,

    /// スレッド実行時のトークンキューの容量
    pub token_queue_capacity: usize,

    /// 構文エラーで表示するソースの行数
    pub snippet_lines: usize,

    /// `compile_*` で検証パスを実行するか
    pub validate: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            file_extension: "idl".to_string(),
            scan_mode: ScanMode::Inline,
            token_queue_capacity: 2,
            snippet_lines: 5,
            validate: true,
        }
    }
}

impl CompilerConfig {
    /// 新しいコンパイラ設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定ファイルから読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CompilerError::config_error(format!("failed to read config file: {}", e))
                .with_file_path(path)
        })?;
        Self::from_toml_str(&content).map_err(|e| e.with_file_path(path))
    }

    /// TOML 文字列から読み込み
    pub fn from_toml_str(s: &str) -> Result<Self> {
        s.parse()
    }

    /// ファイル拡張子を設定
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// 字句解析の実行方法を設定
    pub fn with_scan_mode(mut self, mode: ScanMode) -> Self {
        self.scan_mode = mode;
        self
    }

    /// 検証の有無を設定
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

fn expect_str<'a>(key: &str, value: &'a toml::Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| CompilerError::config_error(format!("{} must be a string", key)))
}

fn expect_bool(key: &str, value: &toml::Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| CompilerError::config_error(format!("{} must be a boolean", key)))
}

fn expect_count(key: &str, value: &toml::Value) -> Result<usize> {
    value
        .as_integer()
        .and_then(|v| usize::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| CompilerError::config_error(format!("{} must be a positive integer", key)))
}

impl FromStr for CompilerConfig {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        let toml_value: toml::Value = toml::from_str(s)?;

        let toml_table = match toml_value {
            toml::Value::Table(table) => table,
            _ => return Err(CompilerError::config_error("config must be a TOML table")),
        };

        let mut config = CompilerConfig::default();

        // ファイル拡張子（先頭の `.` は取り除く）
        if let Some(value) = toml_table.get("file_extension") {
            let extension = expect_str("file_extension", value)?;
            config.file_extension = extension.trim_start_matches('.').to_string();
        }

        // 字句解析の実行方法
        if let Some(value) = toml_table.get("scan_mode") {
            config.scan_mode = expect_str("scan_mode", value)?.parse()?;
        }

        // トークンキューの容量
        if let Some(value) = toml_table.get("token_queue_capacity") {
            config.token_queue_capacity = expect_count("token_queue_capacity", value)?;
        }

        // エラー表示の行数
        if let Some(value) = toml_table.get("snippet_lines") {
            config.snippet_lines = expect_count("snippet_lines", value)?;
        }

        // 検証の有無
        if let Some(value) = toml_table.get("validate") {
            config.validate = expect_bool("validate", value)?;
        }

        Ok(config)
    }
}
