//! Purpose: Decode JSON text into the owned `Value` tree.
//! Exports: `parse`, `from_slice`, `from_slice_with_max_depth`, `Parser`, `ParseError`, `ParseFailureCategory`, `hint_for_error`.
//! Role: Recursive-descent parser over a single forward byte cursor.
//! Invariants: Nesting depth is bounded (`DEFAULT_MAX_DEPTH` unless overridden).
//! Invariants: Escapes decode to the characters they denote; serializing re-escapes them.
//! Invariants: Every failure is located (byte offset, 1-based line/column) and categorized.
//! Notes: Duplicate object keys keep the last value.

use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::json::value::{Map, Value};

pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    UnexpectedEof,
    InvalidEscape,
    NumericRange,
    DepthLimit,
    TrailingCharacters,
    Utf8,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::UnexpectedEof => "unexpected-eof",
            ParseFailureCategory::InvalidEscape => "invalid-escape",
            ParseFailureCategory::NumericRange => "numeric-range",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::TrailingCharacters => "trailing-characters",
            ParseFailureCategory::Utf8 => "utf8",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    category: ParseFailureCategory,
    message: String,
    offset: usize,
    line: usize,
    column: usize,
}

impl ParseError {
    fn at(input: &[u8], offset: usize, category: ParseFailureCategory, message: String) -> Self {
        let offset = offset.min(input.len());
        let before = &input[..offset];
        let line_start = before
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let line = before.iter().filter(|b| **b == b'\n').count() + 1;
        // Count chars, not bytes: skip UTF-8 continuation bytes.
        let column = before[line_start..]
            .iter()
            .filter(|b| (**b & 0xC0) != 0x80)
            .count()
            + 1;
        Self {
            category,
            message,
            offset,
            line,
            column,
        }
    }

    pub fn category(&self) -> ParseFailureCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Maps into the crate error, keeping the location and a categorized hint.
    pub fn into_error(self, context: &str) -> Error {
        let hint = hint_for_error(&self, context);
        let offset = self.offset as u64;
        Error::new(ErrorKind::Parse)
            .with_message(format!("invalid JSON: {}", self.message))
            .with_hint(hint)
            .with_offset(offset)
            .with_source(self)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {} column {}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

pub fn hint_for_error(err: &ParseError, context: &str) -> String {
    format!(
        "parse category: {}; line {}, column {}; context: {context}",
        err.category.label(),
        err.line,
        err.column
    )
}

pub fn parse(input: &str) -> Result<Value, ParseError> {
    Parser::new(input).parse()
}

pub fn from_slice(input: &[u8]) -> Result<Value, ParseError> {
    from_slice_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// Like `from_slice`, with a caller-chosen nesting limit.
pub fn from_slice_with_max_depth(input: &[u8], max_depth: usize) -> Result<Value, ParseError> {
    let text = std::str::from_utf8(input).map_err(|err| {
        ParseError::at(
            input,
            err.valid_up_to(),
            ParseFailureCategory::Utf8,
            "input is not valid UTF-8".to_string(),
        )
    })?;
    Parser::new(text).with_max_depth(max_depth).parse()
}

pub struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(mut self) -> Result<Value, ParseError> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(self.error(
                ParseFailureCategory::TrailingCharacters,
                "trailing characters after JSON value",
            ));
        }
        Ok(value)
    }

    fn error(&self, category: ParseFailureCategory, message: impl Into<String>) -> ParseError {
        ParseError::at(self.bytes, self.pos, category, message.into())
    }

    fn error_at(
        &self,
        offset: usize,
        category: ParseFailureCategory,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError::at(self.bytes, offset, category, message.into())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.input[self.pos..].chars().next() {
            Some(found) => self.error(
                ParseFailureCategory::Syntax,
                format!("expected {expected}, found '{}'", found.escape_debug()),
            ),
            None => self.error(
                ParseFailureCategory::UnexpectedEof,
                format!("unexpected end of input, expected {expected}"),
            ),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect_byte(&mut self, expected: u8, what: &str) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.error(
                ParseFailureCategory::DepthLimit,
                format!("nesting exceeds maximum depth of {}", self.max_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b't') => self.parse_keyword("true", Value::Boolean(true)),
            Some(b'f') => self.parse_keyword("false", Value::Boolean(false)),
            Some(b'n') => self.parse_keyword("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            _ => Err(self.unexpected("a JSON value")),
        }
    }

    fn parse_keyword(&mut self, word: &str, value: Value) -> Result<Value, ParseError> {
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(value)
        } else if word.as_bytes().starts_with(&self.bytes[self.pos..]) {
            self.pos = self.bytes.len();
            Err(self.error(
                ParseFailureCategory::UnexpectedEof,
                format!("unexpected end of input inside `{word}`"),
            ))
        } else {
            Err(self.error(
                ParseFailureCategory::Syntax,
                format!("invalid literal, expected `{word}`"),
            ))
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        self.pos += 1;
        let mut map = Map::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.unexpected("a string key"));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect_byte(b':', "':' after object key")?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or '}' after object member")),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        self.pos += 1;
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or ']' after array element")),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let mut out = String::new();
        let mut run = self.pos;

        loop {
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        open,
                        ParseFailureCategory::UnexpectedEof,
                        "unterminated string",
                    ));
                }
                Some(b'"') => {
                    out.push_str(&self.input[run..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.input[run..self.pos]);
                    let ch = self.parse_escape()?;
                    out.push(ch);
                    run = self.pos;
                }
                Some(byte) if byte < 0x20 => {
                    return Err(self.error(
                        ParseFailureCategory::Syntax,
                        "unescaped control character in string",
                    ));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let Some(byte) = self.peek() else {
            return Err(self.error(
                ParseFailureCategory::UnexpectedEof,
                "unexpected end of input inside escape sequence",
            ));
        };
        self.pos += 1;
        let ch = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.parse_unicode_escape(start),
            _ => {
                return Err(self.error_at(
                    start,
                    ParseFailureCategory::InvalidEscape,
                    format!("invalid escape sequence '\\{}'", char::from(byte).escape_debug()),
                ));
            }
        };
        Ok(ch)
    }

    fn parse_unicode_escape(&mut self, start: usize) -> Result<char, ParseError> {
        let high = self.parse_hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.bytes[self.pos..].starts_with(b"\\u") {
                    return Err(self.error_at(
                        start,
                        ParseFailureCategory::InvalidEscape,
                        "unpaired high surrogate in \\u escape",
                    ));
                }
                self.pos += 2;
                let low = self.parse_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error_at(
                        start,
                        ParseFailureCategory::InvalidEscape,
                        "high surrogate not followed by low surrogate",
                    ));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(self.error_at(
                    start,
                    ParseFailureCategory::InvalidEscape,
                    "unpaired low surrogate in \\u escape",
                ));
            }
            other => other,
        };
        char::from_u32(code).ok_or_else(|| {
            self.error_at(
                start,
                ParseFailureCategory::InvalidEscape,
                "\\u escape is not a valid code point",
            )
        })
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(byte) = self.peek() else {
                return Err(self.error(
                    ParseFailureCategory::UnexpectedEof,
                    "unexpected end of input inside \\u escape",
                ));
            };
            let digit = char::from(byte).to_digit(16).ok_or_else(|| {
                self.error(
                    ParseFailureCategory::InvalidEscape,
                    "\\u escape requires four hex digits",
                )
            })?;
            code = code * 16 + digit;
            self.pos += 1;
        }
        Ok(code)
    }

    fn consume_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.consume_digits();
            }
            _ => return Err(self.unexpected("a digit")),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if self.consume_digits() == 0 {
                return Err(self.unexpected("a digit after the decimal point"));
            }
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if self.consume_digits() == 0 {
                return Err(self.unexpected("a digit in the exponent"));
            }
        }

        let text = &self.input[start..self.pos];
        let value: f64 = text.parse().map_err(|_| {
            self.error_at(start, ParseFailureCategory::Syntax, format!("invalid number `{text}`"))
        })?;
        if !value.is_finite() {
            return Err(self.error_at(
                start,
                ParseFailureCategory::NumericRange,
                format!("number `{text}` is out of range"),
            ));
        }
        Ok(Value::Number(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseFailureCategory, Parser, from_slice, from_slice_with_max_depth, parse};
    use crate::json::value::Value;

    #[test]
    fn parses_flat_object() {
        let value = parse(r#"{"key":"value","num":10}"#).unwrap();
        let expected = Value::object().with("key", "value").with("num", 10);
        assert_eq!(value, expected);
    }

    #[test]
    fn parses_empty_containers_and_scalars() {
        assert_eq!(parse("{}").unwrap(), Value::object());
        assert_eq!(parse(" [ ] ").unwrap(), Value::array());
        assert_eq!(parse("true").unwrap(), Value::Boolean(true));
        assert_eq!(parse("false").unwrap(), Value::Boolean(false));
        assert_eq!(parse("null").unwrap(), Value::Null);
        assert_eq!(parse("\"x\"").unwrap(), Value::from("x"));
        assert_eq!(parse("-12.5").unwrap(), Value::from(-12.5));
    }

    #[test]
    fn parses_nested_structures() {
        let value = parse(r#"{"a":[1,{"b":[true,null]},[]],"c":{"d":{}}}"#).unwrap();
        let inner = Value::object().with("b", Value::from(vec![Value::from(true), Value::Null]));
        let expected = Value::object()
            .with(
                "a",
                Value::from(vec![Value::from(1), inner, Value::array()]),
            )
            .with("c", Value::object().with("d", Value::object()));
        assert_eq!(value, expected);
    }

    #[test]
    fn exponent_notation_is_accepted() {
        assert_eq!(parse("1e10").unwrap(), Value::from(1e10));
        assert_eq!(parse("2.5E-3").unwrap(), Value::from(2.5e-3));
        assert_eq!(parse("-1e+2").unwrap(), Value::from(-100.0));
    }

    #[test]
    fn leading_plus_and_leading_zero_are_rejected() {
        let err = parse("+1").unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::Syntax);
        assert_eq!(err.offset(), 0);

        let err = parse("01").unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::TrailingCharacters);

        let err = parse("1.").unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::UnexpectedEof);
    }

    #[test]
    fn escapes_decode_to_their_characters() {
        let value = parse(r#""quote \" slash \\ \/ nl \n tab \t é 😀""#).unwrap();
        assert_eq!(
            value,
            Value::from("quote \" slash \\ / nl \n tab \t \u{e9} \u{1F600}")
        );
    }

    #[test]
    fn raw_utf8_passes_through() {
        assert_eq!(parse("\"h\u{e9}llo\"").unwrap(), Value::from("h\u{e9}llo"));
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let value = parse(r#"{"a":1,"a":2}"#).unwrap();
        assert_eq!(value, Value::object().with("a", 2));
    }

    #[test]
    fn missing_and_trailing_commas_are_errors() {
        for input in [r#"{"a":1 "b":2}"#, r#"{"a":1,}"#, "[1 2]", "[1,]"] {
            let err = parse(input).unwrap_err();
            assert_eq!(err.category(), ParseFailureCategory::Syntax, "input: {input}");
        }
    }

    #[test]
    fn errors_carry_line_and_column() {
        let err = parse("{\n  \"a\": tru,\n}").unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::Syntax);
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), 8);
        assert!(err.to_string().ends_with("at line 2 column 8"));
    }

    #[test]
    fn truncated_input_is_unexpected_eof() {
        for input in ["", "{", "[1,", r#"{"a""#, r#""abc"#, "tr", r#""\u12"#] {
            let err = parse(input).unwrap_err();
            assert_eq!(
                err.category(),
                ParseFailureCategory::UnexpectedEof,
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn invalid_escapes_are_categorized() {
        for input in [r#""\x""#, r#""\ud800""#, r#""\udc00""#, r#""\u12G4""#] {
            let err = parse(input).unwrap_err();
            assert_eq!(
                err.category(),
                ParseFailureCategory::InvalidEscape,
                "input: {input}"
            );
        }
    }

    #[test]
    fn control_characters_must_be_escaped() {
        let err = parse("\"a\nb\"").unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::Syntax);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let err = parse(r#"{"n":1e400}"#).unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::NumericRange);
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn trailing_characters_are_rejected() {
        let err = parse("{} {}").unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::TrailingCharacters);
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let nested = |depth: usize| format!("{}0{}", "[".repeat(depth), "]".repeat(depth));

        assert!(Parser::new(&nested(8)).with_max_depth(8).parse().is_ok());
        let err = Parser::new(&nested(9)).with_max_depth(8).parse().unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::DepthLimit);

        let err = parse(&nested(10_000)).unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::DepthLimit);
    }

    #[test]
    fn byte_input_honors_depth_limit() {
        let err = from_slice_with_max_depth(b"[[[]]]", 2).unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::DepthLimit);
        assert!(from_slice_with_max_depth(b"[[]]", 2).is_ok());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = from_slice(&[b'"', 0xff, b'"']).unwrap_err();
        assert_eq!(err.category(), ParseFailureCategory::Utf8);
        assert_eq!(err.offset(), 1);
        assert_eq!(from_slice(b"[1]").unwrap(), Value::from(vec![Value::from(1)]));
    }
}
