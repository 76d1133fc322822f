//! # レキサー（字句解析器）
//!
//! スキーマのソースコードを字句解析し、トークン列に変換するモジュールです。
//!
//! 状態関数方式のスキャナーを、明示的な状態 ID とトランポリンループで実装しています。
//! 各状態は次の状態を返し、`None` を返すとスキャンが終了します（EOF またはエラー）。
//! 再帰呼び出しは行わないため、異常な入力でもスタックは伸びません。

use std::collections::VecDeque;
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use log::trace;

pub mod number;
pub mod token;

pub use self::token::{lookup_keyword, Token, TokenKind};

/// スキャナーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// トップレベル（次の文字で分岐する）
    Root,
    /// 文字列リテラル（開き引用符を保持）
    String(char),
    /// `#` から行末までのコメント
    Comment,
    /// 数値リテラルまたは単語
    NumberOrWord,
}

/// レキサー
///
/// `Iterator<Item = Token>` として振る舞い、最後に必ず `Eof` か `Error` を一つ返します。
pub struct Lexer<'a> {
    /// ソースコード
    source: &'a str,
    /// 現在のトークンの開始位置
    start: usize,
    /// 読み取り位置
    pos: usize,
    /// 次に実行する状態
    state: Option<State>,
    /// 送出待ちのトークン
    pending: VecDeque<Token>,
    /// 現在の行でコメント以外のトークンを送出済みか
    line_has_token: bool,
}

impl<'a> Lexer<'a> {
    /// 新しいレキサーを作成
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            pos: 0,
            state: Some(State::Root),
            pending: VecDeque::with_capacity(2),
            line_has_token: false,
        }
    }

    /// 1 文字進めて、その文字を返す
    pub(crate) fn next_rune(&mut self) -> Option<char> {
        let c = self.source[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// 消費せずに次の文字を返す
    pub(crate) fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// 消費せずに次の `n` 文字を返す（入力が足りなければ残り全部）
    pub(crate) fn peek_n(&self, n: usize) -> &'a str {
        let rest = &self.source[self.pos..];
        match rest.char_indices().nth(n) {
            Some((idx, _)) => &rest[..idx],
            None => rest,
        }
    }

    /// 次の文字が `set` に含まれていれば消費する
    pub(crate) fn accept(&mut self, set: &str) -> bool {
        match self.peek() {
            Some(c) if set.contains(c) => {
                self.next_rune();
                true
            }
            _ => false,
        }
    }

    /// `set` に含まれる文字が続く限り消費する
    pub(crate) fn accept_run(&mut self, set: &str) {
        while self.accept(set) {}
    }

    /// 述語を満たす文字が続く限り消費する
    pub(crate) fn accept_run_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.next_rune();
        }
    }

    /// `set` のいずれかの文字が現れるまで消費する
    pub(crate) fn accept_run_until(&mut self, set: &str) {
        while let Some(c) = self.peek() {
            if set.contains(c) {
                break;
            }
            self.next_rune();
        }
    }

    /// 現在のトークン範囲の文字列
    pub(crate) fn current(&self) -> &'a str {
        &self.source[self.start..self.pos]
    }

    /// 現在の範囲を捨てる
    fn ignore(&mut self) {
        self.start = self.pos;
    }

    /// 現在の範囲をトークンとして送出し、開始位置をリセットする
    fn emit(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.current(), self.start, self.pos);
        trace!("token {:?} {:?} [{}..{}]", token.kind, token.value, token.start, token.end);
        if !kind.is_comment() {
            self.line_has_token = true;
        }
        self.pending.push_back(token);
        self.start = self.pos;
    }

    /// エラートークンを送出してスキャンを終了する
    fn emit_error(&mut self, message: impl Into<String>) -> Option<State> {
        let token = Token::new(TokenKind::Error, message, self.start, self.pos);
        trace!("lexical error {:?} at {}", token.value, token.start);
        self.pending.push_back(token);
        None
    }

    /// 状態を 1 つ実行して次の状態を返す
    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Root => self.lex_root(),
            State::String(quote) => self.lex_string(quote),
            State::Comment => self.lex_comment(),
            State::NumberOrWord => self.lex_number_or_word(),
        }
    }

    fn lex_root(&mut self) -> Option<State> {
        let Some(c) = self.peek() else {
            self.emit(TokenKind::Eof);
            return None;
        };

        if c.is_whitespace() {
            self.next_rune();
            if c == '\n' {
                self.line_has_token = false;
            }
            self.ignore();
            return Some(State::Root);
        }

        let single = match c {
            ':' => Some(TokenKind::Colon),
            ',' => Some(TokenKind::Comma),
            '{' => Some(TokenKind::OpenCurly),
            '}' => Some(TokenKind::CloseCurly),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '<' => Some(TokenKind::OpenAngle),
            '>' => Some(TokenKind::CloseAngle),
            _ => None,
        };
        if let Some(kind) = single {
            self.next_rune();
            self.emit(kind);
            return Some(State::Root);
        }

        match c {
            '=' => {
                self.next_rune();
                if self.accept(">") {
                    self.emit(TokenKind::Return);
                } else {
                    self.emit(TokenKind::Assign);
                }
                Some(State::Root)
            }
            '.' => {
                if self.peek_n(3) == "..." {
                    self.pos += 3;
                    self.emit(TokenKind::Extend);
                    Some(State::Root)
                } else {
                    self.next_rune();
                    self.emit_error("unexpected '.', did you mean '...'")
                }
            }
            '[' => {
                self.next_rune();
                if self.accept("]") {
                    self.emit(TokenKind::Array);
                    Some(State::Root)
                } else {
                    self.emit_error("expected ']' right after '['")
                }
            }
            ']' => {
                self.next_rune();
                self.emit_error("unexpected ']' without '['")
            }
            '"' | '\'' | '`' => Some(State::String(c)),
            '#' => Some(State::Comment),
            _ => Some(State::NumberOrWord),
        }
    }

    fn lex_string(&mut self, quote: char) -> Option<State> {
        // 開き引用符
        self.next_rune();
        loop {
            match self.next_rune() {
                None => return self.emit_error("unterminated string literal"),
                Some('\\') if quote != '`' => {
                    if self.next_rune().is_none() {
                        return self.emit_error("unterminated string literal");
                    }
                }
                Some('\n') if quote != '`' => {
                    return self.emit_error("unterminated string literal");
                }
                Some(c) if c == quote => {
                    self.emit(TokenKind::ConstString);
                    return Some(State::Root);
                }
                Some(_) => {}
            }
        }
    }

    fn lex_comment(&mut self) -> Option<State> {
        self.accept_run_until("\r\n");
        if self.line_has_token {
            self.emit(TokenKind::TrailingComment);
        } else {
            self.emit(TokenKind::Comment);
        }
        Some(State::Root)
    }

    fn lex_number_or_word(&mut self) -> Option<State> {
        if number::starts_number(self.peek_n(2)) {
            return match number::scan_number(self) {
                Ok(kind) => {
                    self.emit(kind);
                    Some(State::Root)
                }
                Err(message) => self.emit_error(message),
            };
        }

        match self.peek() {
            Some(c) if is_word_start(c) => {
                self.accept_run_while(is_word_part);
                let kind = lookup_keyword(self.current()).unwrap_or(TokenKind::Identifier);
                self.emit(kind);
                Some(State::Root)
            }
            Some(c) => {
                self.next_rune();
                self.emit_error(format!("unexpected character {:?}", c))
            }
            None => Some(State::Root),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            let state = self.state?;
            self.state = self.step(state);
        }
    }
}

/// 別スレッドのスキャナーから有界キューでトークンを受け取るストリーム
///
/// キューが満杯になるとスキャナー側がブロックし、空なら受信側がブロックします。
pub struct TokenStream {
    receiver: Receiver<Token>,
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.receiver.recv().ok()
    }
}

/// スキャナーを独立したスレッドで起動する
///
/// `capacity` はキューの容量です（0 は 1 として扱います）。
/// 受信側が途中で破棄されると、送信に失敗した時点でスキャナーも終了します。
pub fn spawn(source: String, capacity: usize) -> TokenStream {
    let (sender, receiver) = bounded(capacity.max(1));
    thread::spawn(move || {
        for token in Lexer::new(&source) {
            if sender.send(token).is_err() {
                break;
            }
        }
    });
    TokenStream { receiver }
}

/// ソースコードをトークン列に変換する（末尾の `Eof` / `Error` を含む）
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// 識別子の先頭になれる文字か
fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// 識別子の 2 文字目以降になれる文字か
fn is_word_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_service() {
        let tokens = tokenize("service Foo { rpc GetFoo() => (value: int64) }");
        let expected = vec![
            (TokenKind::Service, "service", 0, 7),
            (TokenKind::Identifier, "Foo", 8, 11),
            (TokenKind::OpenCurly, "{", 12, 13),
            (TokenKind::Rpc, "rpc", 14, 17),
            (TokenKind::Identifier, "GetFoo", 18, 24),
            (TokenKind::OpenParen, "(", 24, 25),
            (TokenKind::CloseParen, ")", 25, 26),
            (TokenKind::Return, "=>", 27, 29),
            (TokenKind::OpenParen, "(", 30, 31),
            (TokenKind::Identifier, "value", 31, 36),
            (TokenKind::Colon, ":", 36, 37),
            (TokenKind::Int64, "int64", 38, 43),
            (TokenKind::CloseParen, ")", 43, 44),
            (TokenKind::CloseCurly, "}", 45, 46),
            (TokenKind::Eof, "", 46, 46),
        ];
        let actual: Vec<_> = tokens
            .iter()
            .map(|t| (t.kind, t.value.as_str(), t.start, t.end))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_tokenize_punctuation() {
        assert_eq!(
            kinds("...Base map<string, []int8> = =>"),
            vec![
                TokenKind::Extend,
                TokenKind::Identifier,
                TokenKind::Map,
                TokenKind::OpenAngle,
                TokenKind::String,
                TokenKind::Comma,
                TokenKind::Array,
                TokenKind::Int8,
                TokenKind::CloseAngle,
                TokenKind::Assign,
                TokenKind::Return,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords_and_literals() {
        assert_eq!(
            kinds("model message true false null error _ a1"),
            vec![
                TokenKind::Message,
                TokenKind::Message,
                TokenKind::ConstBool,
                TokenKind::ConstBool,
                TokenKind::ConstNull,
                TokenKind::CustomError,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_strings() {
        let tokens = tokenize("'a' \"b\" `c\nd`");
        assert_eq!(tokens[0].value, "'a'");
        assert_eq!(tokens[1].value, "\"b\"");
        assert_eq!(tokens[2].value, "`c\nd`");
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("a = \"abc\nb");
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(last.value, "unterminated string literal");
    }

    #[test]
    fn test_comments_top_and_trailing() {
        let tokens = tokenize("# top\na = 1 # trailing\n  # again\n");
        let comments: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind.is_comment())
            .map(|t| (t.kind, t.value.as_str()))
            .collect();
        assert_eq!(
            comments,
            vec![
                (TokenKind::Comment, "# top"),
                (TokenKind::TrailingComment, "# trailing"),
                (TokenKind::Comment, "# again"),
            ]
        );
    }

    #[test]
    fn test_bad_array_bracket() {
        let tokens = tokenize("a: [int8");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
        let tokens = tokenize("a: ]");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
    }

    #[test]
    fn test_error_terminates_stream() {
        let tokens = tokenize("a = 1_ b = 2");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[2].value, "expected digit after each underscore");
    }

    #[test]
    fn test_spawned_scanner_matches_inline() {
        let source = "enum Color uint8 { Red = 1 Green Blue }";
        let streamed: Vec<Token> = spawn(source.to_string(), 2).collect();
        assert_eq!(streamed, tokenize(source));
    }
}
