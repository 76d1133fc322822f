//! # IDL Compiler
//!
//! インターフェース定義言語（IDL）のコンパイラフロントエンドです。
//! 定数・列挙型・メッセージ・サービス・カスタムエラーを宣言したスキーマを
//! 字句解析・構文解析して抽象構文木を作り、意味検証を行います。
//!
//! 検証済みの [`Program`] は各言語向けのコード生成器に渡されます。
//! コード生成器、CLI、テンプレート処理はこのクレートの範囲外です。

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

pub mod config;
pub mod frontend;

// 再エクスポート
pub use self::config::{CompilerConfig, ScanMode};
pub use self::frontend::ast;
pub use self::frontend::ast::Program;
pub use self::frontend::error::{CompilerError, ErrorKind, Result};
pub use self::frontend::lexer;
pub use self::frontend::parser;
pub use self::frontend::semantic::validate;

use self::frontend::parser::Parser;

/// コンパイラのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ソースコードを解析する
///
/// 設定の [`ScanMode`] に従って、同じスレッドまたは別スレッドで字句解析を行います。
pub fn parse_source(source: &str, config: &CompilerConfig) -> Result<Program> {
    debug!("parsing {} bytes ({} scanner)", source.len(), config.scan_mode);
    match config.scan_mode {
        ScanMode::Inline => Parser::from_source(source)
            .with_context_lines(config.snippet_lines)
            .parse_program(),
        ScanMode::Threaded => {
            let tokens = lexer::spawn(source.to_string(), config.token_queue_capacity);
            Parser::new(source, tokens)
                .with_context_lines(config.snippet_lines)
                .parse_program()
        }
    }
}

/// ソースコードを解析し、設定で有効なら検証まで行う
pub fn compile_source(source: &str, config: &CompilerConfig) -> Result<Program> {
    let mut program = parse_source(source, config)?;
    if config.validate {
        validate(&mut program)?;
    }
    Ok(program)
}

/// ファイルを 1 つ解析する
pub fn parse_file<P: AsRef<Path>>(path: P, config: &CompilerConfig) -> Result<Program> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| CompilerError::from(e).with_file_path(path))?;
    parse_source(&source, config).map_err(|e| e.with_file_path(path))
}

/// ディレクトリ内のスキーマファイルを 1 つのソースに連結する
///
/// 設定の拡張子を持つファイルをファイル名順に読み込み、それぞれの末尾に改行を付けて
/// 連結します（ファイルの境界で文がつながらないように）。
pub fn load_dir<P: AsRef<Path>>(dir: P, config: &CompilerConfig) -> Result<String> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| CompilerError::from(e).with_file_path(dir))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CompilerError::from(e).with_file_path(dir))?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext == config.file_extension.as_str());
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        warn!(
            "no .{} files found in {}",
            config.file_extension,
            dir.display()
        );
    }

    let mut source = String::new();
    for path in &files {
        let content =
            fs::read_to_string(path).map_err(|e| CompilerError::from(e).with_file_path(path))?;
        source.push_str(&content);
        source.push('\n');
    }

    info!(
        "loaded {} schema files ({} bytes) from {}",
        files.len(),
        source.len(),
        dir.display()
    );
    Ok(source)
}

/// ディレクトリ内のスキーマを読み込んでコンパイルする
pub fn compile_dir<P: AsRef<Path>>(dir: P, config: &CompilerConfig) -> Result<Program> {
    let dir = dir.as_ref();
    let source = load_dir(dir, config)?;
    compile_source(&source, config).map_err(|e| e.with_file_path(dir))
}
