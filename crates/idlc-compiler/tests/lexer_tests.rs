use idlc_compiler::lexer::{self, Token, TokenKind};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn single(source: &str) -> Token {
    let tokens = lexer::tokenize(source);
    assert!(
        tokens.len() <= 2,
        "expected a single token for {:?}, got {:?}",
        source,
        tokens
    );
    tokens.into_iter().next().unwrap()
}

#[test]
fn test_lexer_exact_service_tokens() {
    init();
    let source = "service Foo { rpc GetFoo() => (value: int64) }";
    let tokens = lexer::tokenize(source);

    let expected_kinds = vec![
        TokenKind::Service,
        TokenKind::Identifier,
        TokenKind::OpenCurly,
        TokenKind::Rpc,
        TokenKind::Identifier,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::Return,
        TokenKind::OpenParen,
        TokenKind::Identifier,
        TokenKind::Colon,
        TokenKind::Int64,
        TokenKind::CloseParen,
        TokenKind::CloseCurly,
        TokenKind::Eof,
    ];
    let actual_kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(actual_kinds, expected_kinds);

    // オフセットは元のソースの切り出しと一致する
    for token in &tokens {
        assert_eq!(&source[token.start..token.end], token.value);
    }
    assert_eq!(tokens.last().unwrap().start, source.len());
}

#[test]
fn test_lexer_numeric_literals() {
    init();
    let token = single("1_0_0");
    assert_eq!(token.kind, TokenKind::ConstInt);
    assert_eq!(token.value, "1_0_0");

    assert_eq!(single("0x1F").kind, TokenKind::ConstInt);
    assert_eq!(single("-12").kind, TokenKind::ConstInt);
    assert_eq!(single("3.25").kind, TokenKind::ConstFloat);
    assert_eq!(single("6e2").kind, TokenKind::ConstFloat);
    assert_eq!(single("1mb").kind, TokenKind::ConstBytes);
    assert_eq!(single("1eb").kind, TokenKind::ConstBytes);
    assert_eq!(single("100h").kind, TokenKind::ConstDuration);
    assert_eq!(single("250ms").kind, TokenKind::ConstDuration);
}

#[test]
fn test_lexer_numeric_errors() {
    init();
    let cases = [
        ("1_0_0_", "expected digit after each underscore"),
        ("1__0", "expected digit after each underscore"),
        ("1.", "expected digit after decimal point"),
        ("1.5mb", "byte size can't be presented as float"),
        ("0.5s", "duration can't be presented as float"),
        ("10xy", "invalid number suffix 'xy'"),
    ];
    for (source, message) in cases {
        let token = single(source);
        assert_eq!(token.kind, TokenKind::Error, "source {:?}", source);
        assert_eq!(token.value, message, "source {:?}", source);
    }
}

#[test]
fn test_lexer_error_is_last_token() {
    init();
    let tokens = lexer::tokenize("message A {\n    name: string\n    tag: [string\n}");
    let last = tokens.last().unwrap();
    assert_eq!(last.kind, TokenKind::Error);
    assert!(!tokens[..tokens.len() - 1]
        .iter()
        .any(|t| matches!(t.kind, TokenKind::Error | TokenKind::Eof)));
}

#[test]
fn test_lexer_threaded_backpressure() {
    init();
    // 容量 1 のキューでも全トークンが順番通りに届く
    let source = "const a = 1\nconst b = 'two'\nenum E int8 { A B C }\n".repeat(50);
    let streamed: Vec<Token> = lexer::spawn(source.clone(), 1).collect();
    assert_eq!(streamed, lexer::tokenize(&source));
    assert_eq!(streamed.last().unwrap().kind, TokenKind::Eof);
}
