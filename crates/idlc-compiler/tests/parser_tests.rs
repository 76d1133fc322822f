use idlc_compiler::ast::{Quote, Statement, Transport, Type, Value};
use idlc_compiler::{parse_source, CompilerConfig, ErrorKind, ScanMode};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(source: &str) -> idlc_compiler::Result<idlc_compiler::Program> {
    parse_source(source, &CompilerConfig::default())
}

#[test]
fn test_parser_statement_order() {
    init();
    let source = r#"
const Version = "1.0"
enum Status int32 { Active Inactive }
message User { id: int64 }
service Users { rpc Get(id: int64) => (user: User) }
error NotFoundError { HttpStatus = NotFound Msg = "not found" }
alias UserId: int64
"#;
    let program = parse(source).unwrap();
    let kinds: Vec<&str> = program.statements.iter().map(Statement::kind_name).collect();
    assert_eq!(
        kinds,
        vec!["const", "enum", "message", "service", "error", "alias"]
    );
}

#[test]
fn test_parser_scaled_literals() {
    init();
    let program = parse("const size = 1mb\nconst timeout = 100h\nconst small = 1_0_0").unwrap();
    assert_eq!(program.find_const("size").unwrap().value, Value::Int(1_048_576));
    assert_eq!(
        program.find_const("timeout").unwrap().value,
        Value::Int(100 * 3_600 * 1_000_000_000)
    );
    assert_eq!(program.find_const("small").unwrap().value, Value::Int(100));
}

#[test]
fn test_parser_hex_scaled_literals() {
    init();
    let program = parse("const a = 0x1kb\nconst b = 0xAkb\nconst c = 0xFms").unwrap();
    assert_eq!(program.find_const("a").unwrap().value, Value::Int(1024));
    assert_eq!(program.find_const("b").unwrap().value, Value::Int(10 * 1024));
    assert_eq!(program.find_const("c").unwrap().value, Value::Int(15 * 1_000_000));
}

#[test]
fn test_parser_enum_values_beyond_int64() {
    init();
    let program = parse("enum Big uint64 { Max = 18446744073709551615 }").unwrap();
    let big = program.find_enum("Big").unwrap();
    assert_eq!(big.constants[0].value, Some(Value::Uint(u64::MAX)));
}

#[test]
fn test_parser_value_kinds() {
    init();
    let program = parse(
        "a = 1.5\nb = null\nc = `multi\nline`\nd = false\ne = a\nf = 18446744073709551615",
    )
    .unwrap();
    assert_eq!(program.find_const("a").unwrap().value, Value::Float(1.5));
    assert_eq!(program.find_const("b").unwrap().value, Value::Null);
    match &program.find_const("c").unwrap().value {
        Value::String(s) => {
            assert_eq!(s.quote, Quote::Backtick);
            assert_eq!(s.value, "multi\nline");
        }
        other => panic!("unexpected value {:?}", other),
    }
    assert_eq!(program.find_const("d").unwrap().value, Value::bool(false));
    assert_eq!(
        program.find_const("e").unwrap().value,
        Value::Variable("a".to_string())
    );
    assert_eq!(program.find_const("f").unwrap().value, Value::Uint(u64::MAX));
}

#[test]
fn test_parser_map_key_restriction() {
    init();
    let err = parse("message Foo {}\nmessage Bar { m: map<Foo, string> }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.message, "expected map key type to be comparable");

    let program = parse("message Foo {}\nmessage Bar { m: map<string, Foo> }").unwrap();
    let bar = program.find_message("Bar").unwrap();
    assert_eq!(
        bar.fields[0].ty,
        Type::Map {
            key: Box::new(Type::String),
            value: Box::new(Type::Custom("Foo".to_string())),
        }
    );
}

#[test]
fn test_parser_lexical_error_kind() {
    init();
    let err = parse("const a = 1.").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
    assert_eq!(err.message, "expected digit after decimal point");
    assert!(err.location.is_some());
}

#[test]
fn test_parser_error_snippet_shows_five_lines() {
    init();
    let source = "const a = 1\nconst b = 2\nconst c = 3\nmessage M {\n    x string\n}\nconst d = 4\nconst e = 5\nconst f = 6\n";
    let err = parse(source).unwrap_err();
    let location = err.location.unwrap();
    assert_eq!(location.line, 5);
    assert_eq!(location.column, 7);

    let snippet = err.source_snippet.clone().unwrap();
    let numbered: Vec<&str> = snippet
        .lines()
        .filter(|l| l.split(" | ").next().is_some_and(|n| !n.trim().is_empty()))
        .collect();
    assert_eq!(numbered.len(), 5);
    assert!(numbered[0].contains("const c = 3"));
    assert!(numbered[4].contains("const d = 4"));

    let rendered = err.render();
    assert!(rendered.contains("expected ':' after field name, got 'string'"));
    assert!(rendered.contains("x string"));
}

#[test]
fn test_parser_snippet_lines_from_config() {
    init();
    let config = CompilerConfig {
        snippet_lines: 1,
        ..CompilerConfig::default()
    };
    let err = parse_source("const a = 1\nmessage m {}\nconst b = 2", &config).unwrap_err();
    let snippet = err.source_snippet.unwrap();
    let numbered: Vec<&str> = snippet
        .lines()
        .filter(|l| l.split(" | ").next().is_some_and(|n| !n.trim().is_empty()))
        .collect();
    assert_eq!(numbered, vec!["2 | message m {}"]);
}

#[test]
fn test_parser_comment_attachment() {
    init();
    let source = "# Describes a user.\nmessage User {} # trailing\n\nmessage Group {}\n# dangling\nconst a = 1\n";
    let program = parse(source).unwrap();
    assert_eq!(
        program.find_message("User").unwrap().comment.as_deref(),
        Some("# Describes a user.")
    );
    assert_eq!(program.find_message("Group").unwrap().comment, None);
}

#[test]
fn test_parser_methods() {
    init();
    let source = r#"
service Files {
    http Upload(data: file, tags: []string) => (id: string) {
        method = "POST"
        content_type = 'multipart/form-data'
        max_upload_size = 5mb
    }
    rpc Tail(id: string) => (stream line: string)
    rpc Ping()
}
"#;
    let program = parse(source).unwrap();
    let files = program.find_service("Files").unwrap();
    assert_eq!(files.methods.len(), 3);

    let upload = &files.methods[0];
    assert_eq!(upload.transport, Transport::Http);
    assert_eq!(upload.http_method(), Some("POST"));
    assert_eq!(upload.content_type(), Some("multipart/form-data"));
    assert_eq!(upload.max_upload_size(), Some(5 * 1024 * 1024));
    assert_eq!(upload.args[1].ty, Type::Array(Box::new(Type::String)));

    assert!(files.methods[1].is_streaming());
    assert!(files.methods[2].returns.is_empty());
    assert!(files.methods[2].options.is_empty());
}

#[test]
fn test_parser_threaded_mode() {
    init();
    let config = CompilerConfig::default().with_scan_mode(ScanMode::Threaded);
    let program = parse_source("message User { id: int64 }\nconst a", &config).unwrap();
    assert_eq!(program.statements.len(), 2);
    let err = parse_source("message User { id int64 }", &config).unwrap_err();
    assert_eq!(err.message, "expected ':' after field name, got 'int64'");
}
