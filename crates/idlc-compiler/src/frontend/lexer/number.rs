//! 数値リテラルのスキャン
//!
//! 符号、16 進接頭辞、`_` 区切りの数字列、小数部、指数部、
//! 時間単位またはバイトサイズの接尾辞を扱います。

use super::{Lexer, TokenKind};

const DECIMAL_DIGITS: &str = "0123456789";
const HEX_DIGITS: &str = "0123456789abcdefABCDEF";

/// 時間単位の接尾辞
pub const DURATION_UNITS: [&str; 6] = ["ns", "us", "ms", "s", "m", "h"];

/// バイトサイズの接尾辞
pub const BYTE_UNITS: [&str; 7] = ["b", "kb", "mb", "gb", "tb", "pb", "eb"];

const UNDERSCORE_ERROR: &str = "expected digit after each underscore";

/// 先頭 2 文字から数値リテラルが始まるかを判定する
pub(super) fn starts_number(head: &str) -> bool {
    let mut chars = head.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn starts_exponent(head: &str) -> bool {
    let mut chars = head.chars();
    if !matches!(chars.next(), Some('e') | Some('E')) {
        return false;
    }
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// 数値リテラルを読み進め、トークンの種類を返す
///
/// 読み取り位置はリテラルの直後に進みます。エラー時はメッセージを返します。
pub(super) fn scan_number(lexer: &mut Lexer<'_>) -> Result<TokenKind, String> {
    lexer.accept("+-");

    let mut digits = DECIMAL_DIGITS;
    let mut leading_digit = false;
    if lexer.accept("0") {
        if lexer.accept("xX") {
            digits = HEX_DIGITS;
        } else {
            leading_digit = true;
        }
    }
    scan_digits(lexer, digits, leading_digit)?;

    let mut is_float = false;
    if digits == DECIMAL_DIGITS && lexer.peek() == Some('.') && lexer.peek_n(3) != "..." {
        lexer.next_rune();
        if !lexer.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err("expected digit after decimal point".to_string());
        }
        scan_digits(lexer, DECIMAL_DIGITS, false)?;
        is_float = true;
    }

    // `1eb` はバイトサイズなので、数字が続く場合だけ指数として読む
    if digits == DECIMAL_DIGITS && starts_exponent(lexer.peek_n(3)) {
        lexer.next_rune();
        lexer.accept("+-");
        scan_digits(lexer, DECIMAL_DIGITS, false)?;
        is_float = true;
    }

    let before_suffix = lexer.current().len();
    lexer.accept_run_while(|c| c.is_ascii_alphabetic());
    let suffix = &lexer.current()[before_suffix..];

    if suffix.is_empty() {
        return Ok(if is_float {
            TokenKind::ConstFloat
        } else {
            TokenKind::ConstInt
        });
    }
    if BYTE_UNITS.contains(&suffix) {
        if is_float {
            return Err("byte size can't be presented as float".to_string());
        }
        return Ok(TokenKind::ConstBytes);
    }
    if DURATION_UNITS.contains(&suffix) {
        if is_float {
            return Err("duration can't be presented as float".to_string());
        }
        return Ok(TokenKind::ConstDuration);
    }
    Err(format!("invalid number suffix '{}'", suffix))
}

/// `_` 区切りの数字列を読む
///
/// 連続した `_` や末尾の `_` はエラーです。
fn scan_digits(lexer: &mut Lexer<'_>, digits: &str, leading_digit: bool) -> Result<(), String> {
    let mut seen_digit = leading_digit;
    let mut last_underscore = false;
    while let Some(c) = lexer.peek() {
        if c == '_' {
            if last_underscore || !seen_digit {
                return Err(UNDERSCORE_ERROR.to_string());
            }
            last_underscore = true;
        } else if digits.contains(c) {
            seen_digit = true;
            last_underscore = false;
        } else {
            break;
        }
        lexer.next_rune();
    }
    if last_underscore {
        return Err(UNDERSCORE_ERROR.to_string());
    }
    if !seen_digit {
        return Err("expected digit".to_string());
    }
    Ok(())
}

/// 時間単位のナノ秒換算の倍率
pub fn duration_scale(unit: &str) -> Option<i64> {
    let scale = match unit {
        "ns" => 1,
        "us" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(scale)
}

/// バイトサイズ接尾辞の倍率（1024 単位）
pub fn byte_scale(unit: &str) -> Option<i64> {
    let power = BYTE_UNITS.iter().position(|u| *u == unit)?;
    Some(1i64 << (10 * power))
}

#[cfg(test)]
mod tests {
    use crate::frontend::lexer::{tokenize, TokenKind};

    fn single(source: &str) -> (TokenKind, String) {
        let token = tokenize(source).into_iter().next().unwrap();
        (token.kind, token.value)
    }

    #[test]
    fn test_number_kinds() {
        assert_eq!(single("1_0_0"), (TokenKind::ConstInt, "1_0_0".to_string()));
        assert_eq!(single("-42"), (TokenKind::ConstInt, "-42".to_string()));
        assert_eq!(single("0xFF"), (TokenKind::ConstInt, "0xFF".to_string()));
        assert_eq!(single("3.14"), (TokenKind::ConstFloat, "3.14".to_string()));
        assert_eq!(single("1e10"), (TokenKind::ConstFloat, "1e10".to_string()));
        assert_eq!(single("1mb"), (TokenKind::ConstBytes, "1mb".to_string()));
        assert_eq!(single("100h"), (TokenKind::ConstDuration, "100h".to_string()));
        assert_eq!(single("5ms"), (TokenKind::ConstDuration, "5ms".to_string()));
        assert_eq!(single("2eb"), (TokenKind::ConstBytes, "2eb".to_string()));
        assert_eq!(single("1.5e-3"), (TokenKind::ConstFloat, "1.5e-3".to_string()));
        assert_eq!(single("0xAkb"), (TokenKind::ConstBytes, "0xAkb".to_string()));
    }

    #[test]
    fn test_number_errors() {
        let cases = [
            ("1_0_0_", "expected digit after each underscore"),
            ("1__0", "expected digit after each underscore"),
            ("1.", "expected digit after decimal point"),
            ("1.5mb", "byte size can't be presented as float"),
            ("1.5h", "duration can't be presented as float"),
            ("12abc", "invalid number suffix 'abc'"),
        ];
        for (source, message) in cases {
            assert_eq!(single(source), (TokenKind::Error, message.to_string()), "{}", source);
        }
    }

    #[test]
    fn test_scales() {
        assert_eq!(super::byte_scale("b"), Some(1));
        assert_eq!(super::byte_scale("mb"), Some(1024 * 1024));
        assert_eq!(super::duration_scale("h"), Some(3_600_000_000_000));
        assert_eq!(super::duration_scale("x"), None);
    }
}
