//! # 構文解析器
//!
//! 字句解析器からのトークン列を受け取り、文法に基づいて
//! 抽象構文木（AST）を構築します。
//!
//! 再帰下降型で、現在のトークンと 1 トークンの先読みだけを使います。
//! 最初のエラーで即座に失敗し、回復は行いません。

use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;

use crate::frontend::ast::Program;
use crate::frontend::error::{CompilerError, Result};
use crate::frontend::lexer::{Lexer, Token, TokenKind};

pub mod statement;
pub mod types;
pub mod value;

/// エラー表示で問題のトークンの周りに表示する行数
pub const DEFAULT_CONTEXT_LINES: usize = 5;

static PASCAL_CASE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").ok());

/// 名前が PascalCase かどうか
pub fn is_pascal_case(name: &str) -> bool {
    PASCAL_CASE.as_ref().is_some_and(|re| re.is_match(name))
}

/// 先読みバッファの要素（トークンと、その直前の行頭コメント）
type Lookahead = (Token, Vec<Token>);

/// パーサー
///
/// トークン源は `Iterator<Item = Token>` であれば何でもよく、同じスレッドの
/// [`Lexer`] でも、別スレッドのスキャナーから受け取る
/// [`TokenStream`](crate::frontend::lexer::TokenStream) でも構いません。
pub struct Parser<'s, I: Iterator<Item = Token>> {
    /// 元のソース（エラー表示用）
    source: &'s str,
    /// トークン源
    tokens: I,
    /// 現在のトークン
    current: Token,
    /// 現在のトークンの直前にある行頭コメント
    current_comments: Vec<Token>,
    /// 1 トークンの先読み
    peeked: Option<Lookahead>,
    /// エラー表示の行数
    context_lines: usize,
}

impl<'s> Parser<'s, Lexer<'s>> {
    /// 同じスレッドで字句解析するパーサーを作成
    pub fn from_source(source: &'s str) -> Self {
        Self::new(source, Lexer::new(source))
    }
}

impl<'s, I: Iterator<Item = Token>> Parser<'s, I> {
    /// 新しいパーサーを作成
    pub fn new(source: &'s str, tokens: I) -> Self {
        let mut parser = Self {
            source,
            tokens,
            current: Token::new(TokenKind::Eof, "", 0, 0),
            current_comments: Vec::new(),
            peeked: None,
            context_lines: DEFAULT_CONTEXT_LINES,
        };
        let (token, comments) = parser.fetch();
        parser.current = token;
        parser.current_comments = comments;
        parser
    }

    /// エラー表示の行数を設定
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// プログラム全体を解析する
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut program = Program::default();
        while !self.check(TokenKind::Eof) {
            let statement = self.parse_statement()?;
            debug!("parsed {} {}", statement.kind_name(), statement.name());
            program.add_statement(statement);
        }
        debug!("parsed {} statements", program.statements.len());
        Ok(program)
    }

    /// トークン源から次の意味のあるトークンを取り出す
    ///
    /// 行頭コメントは次のトークンに付けて返し、行末コメントは捨てます。
    fn fetch(&mut self) -> Lookahead {
        let mut comments = Vec::new();
        loop {
            match self.tokens.next() {
                Some(token) if token.kind == TokenKind::Comment => comments.push(token),
                Some(token) if token.kind == TokenKind::TrailingComment => {}
                Some(token) => {
                    trace!("parser sees {:?} {:?}", token.kind, token.value);
                    return (token, comments);
                }
                None => {
                    let end = self.source.len();
                    return (Token::new(TokenKind::Eof, "", end, end), comments);
                }
            }
        }
    }

    /// 現在のトークン
    pub(crate) fn current(&self) -> &Token {
        &self.current
    }

    /// 先読みトークン
    pub(crate) fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            let next = self.fetch();
            self.peeked = Some(next);
        }
        match &self.peeked {
            Some((token, _)) => token,
            None => &self.current,
        }
    }

    /// 1 トークン進め、それまでの現在のトークンを返す
    pub(crate) fn advance(&mut self) -> Token {
        // Eof / Error の先へは進まない
        if matches!(self.current.kind, TokenKind::Eof | TokenKind::Error) {
            return self.current.clone();
        }
        let (next, comments) = match self.peeked.take() {
            Some(lookahead) => lookahead,
            None => self.fetch(),
        };
        self.current_comments = comments;
        std::mem::replace(&mut self.current, next)
    }

    /// 現在のトークンの直前にあった行頭コメントを取り出す
    pub(crate) fn take_comments(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.current_comments)
    }

    /// 現在のトークンが指定した種類か
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// 指定した種類なら消費して返し、違えばエラー
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// 識別子を期待し、PascalCase であることも確認する
    pub(crate) fn expect_pascal_case(&mut self, what: &str) -> Result<Token> {
        let token = self.expect(TokenKind::Identifier, what)?;
        if !is_pascal_case(&token.value) {
            return Err(self.error_at(&token, format!("{} '{}' must be in PascalCase", what, token.value)));
        }
        Ok(token)
    }

    /// 現在のトークンが期待と違うことを示すエラー
    ///
    /// 現在のトークンが字句解析エラーなら、そのメッセージを優先します。
    pub(crate) fn unexpected(&self, what: &str) -> CompilerError {
        let token = &self.current;
        if token.kind == TokenKind::Error {
            return self.error_at(token, token.value.clone());
        }
        self.error_at(token, format!("expected {}, got {}", what, token))
    }

    /// トークン位置のエラーを作成
    pub(crate) fn error_at(&self, token: &Token, message: impl Into<String>) -> CompilerError {
        CompilerError::at_token(message, token, self.source, self.context_lines)
    }
}

/// ソースコードを解析してプログラムを返す
pub fn parse(source: &str) -> Result<Program> {
    Parser::from_source(source).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::error::ErrorKind;

    #[test]
    fn test_pascal_case() {
        assert!(is_pascal_case("User"));
        assert!(is_pascal_case("HttpUser2"));
        assert!(!is_pascal_case("user"));
        assert!(!is_pascal_case("User_Name"));
        assert!(!is_pascal_case(""));
    }

    #[test]
    fn test_lexical_error_surfaces_as_parse_error() {
        let err = parse("const a = 1_0_0_").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.message, "expected digit after each underscore");
    }

    #[test]
    fn test_syntax_error_has_snippet() {
        let err = parse("message User {\n    Id string\n}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "expected ':' after field name, got 'string'");
        let snippet = err.source_snippet.unwrap();
        assert!(snippet.contains("2 |     Id string"));
        assert!(snippet.contains("^^^^^^"));
    }

    #[test]
    fn test_empty_source() {
        let program = parse("  # only a comment\n").unwrap();
        assert!(program.statements.is_empty());
    }
}
