//! Purpose: Regression coverage for parse-failure category mapping.
//! Exports: Integration tests only.
//! Role: Verify stable category labels and locations used by parse diagnostics.
//! Invariants: Category mapping remains deterministic for representative errors.
//! Invariants: Tests avoid payload leakage; assertions target category/hint text only.

use cogcfg::api::{ErrorKind, to_exit_code};
use cogcfg::json::{ParseFailureCategory, Parser, from_slice, hint_for_error, parse};

#[test]
fn category_mapping_handles_syntax_and_numeric_errors() {
    let syntax_err = parse(r#"{"a":}"#).unwrap_err();
    assert_eq!(syntax_err.category(), ParseFailureCategory::Syntax);
    assert_eq!(syntax_err.offset(), 5);

    let number_err = parse(r#"{"n":1e400}"#).unwrap_err();
    assert_eq!(number_err.category(), ParseFailureCategory::NumericRange);
}

#[test]
fn category_mapping_handles_utf8_and_depth_errors() {
    let utf8_err = from_slice(&[b'[', 0xff, b']']).unwrap_err();
    assert_eq!(utf8_err.category(), ParseFailureCategory::Utf8);
    assert_eq!(utf8_err.offset(), 1);

    let depth_err = Parser::new("[[[1]]]").with_max_depth(2).parse().unwrap_err();
    assert_eq!(depth_err.category(), ParseFailureCategory::DepthLimit);
}

#[test]
fn category_mapping_handles_eof_escape_and_trailing_errors() {
    assert_eq!(
        parse(r#"{"a":[1,2"#).unwrap_err().category(),
        ParseFailureCategory::UnexpectedEof
    );
    assert_eq!(
        parse(r#""bad \q escape""#).unwrap_err().category(),
        ParseFailureCategory::InvalidEscape
    );
    assert_eq!(
        parse("{} []").unwrap_err().category(),
        ParseFailureCategory::TrailingCharacters
    );
}

#[test]
fn error_location_reports_line_and_column() {
    let err = parse("{\n  \"a\": tru,\n}").unwrap_err();
    assert_eq!(err.line(), 2);
    assert_eq!(err.column(), 8);
    assert!(err.to_string().ends_with("at line 2 column 8"));
}

#[test]
fn hint_contains_category_and_context() {
    let err = parse(r#"{"n":1e400}"#).unwrap_err();
    let hint = hint_for_error(&err, "test.context");
    assert!(hint.contains("parse category: numeric-range"));
    assert!(hint.contains("context: test.context"));
}

#[test]
fn into_error_maps_to_parse_kind() {
    let err = parse("[1,]").unwrap_err().into_error("argument");
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(to_exit_code(err.kind()), 4);
    assert_eq!(err.offset(), Some(3));
    assert!(err.message().unwrap_or_default().starts_with("invalid JSON:"));
    assert!(err.hint().unwrap_or_default().contains("context: argument"));
}
