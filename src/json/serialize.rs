//! Purpose: Encode `Value` trees back into JSON text.
//! Exports: `serialize`, `to_string_pretty`, `write_pretty_with`, `TokenRole`, `write_string`, `write_number`.
//! Role: Pure, side-effect-free inverse of the parser.
//! Invariants: Output is compact and canonical (object keys in lexicographic order).
//! Invariants: `parse(serialize(v)) == v` for every parser-produced value.
//! Notes: Control characters are escaped; non-finite numbers encode as `null`.

use std::fmt::{self, Write};

use crate::json::value::{Map, Value};

const INDENT: &str = "  ";

pub fn serialize(value: &Value) -> String {
    let mut out = String::new();
    write_compact(value, &mut out);
    out
}

pub fn to_string_pretty(value: &Value) -> String {
    let mut out = String::new();
    write_pretty_with(value, &mut out, &mut |_: TokenRole, text: &str, out: &mut String| {
        out.push_str(text)
    });
    out
}

/// Lexical role of a token emitted by the pretty writer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TokenRole {
    Key,
    String,
    Number,
    Boolean,
    Null,
    Punct,
}

/// Two-space pretty layout; every token goes through `paint`, whitespace is written directly.
pub fn write_pretty_with<F>(value: &Value, out: &mut String, paint: &mut F)
where
    F: FnMut(TokenRole, &str, &mut String),
{
    write_pretty(value, 0, out, paint);
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

pub fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ch if ch < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(ch));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

/// Shortest text that parses back to the same `f64`; integral values carry no fraction.
pub fn write_number(value: f64, out: &mut String) {
    if value.is_finite() {
        let _ = write!(out, "{value}");
    } else {
        out.push_str("null");
    }
}

fn write_compact(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => write_string(text, out),
        Value::Number(num) => write_number(*num, out),
        Value::Boolean(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_compact(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_compact(item, out);
            }
            out.push(']');
        }
    }
}

fn write_pretty<F>(value: &Value, indent: usize, out: &mut String, paint: &mut F)
where
    F: FnMut(TokenRole, &str, &mut String),
{
    match value {
        Value::Object(map) => write_pretty_object(map, indent, out, paint),
        Value::Array(items) => write_pretty_array(items, indent, out, paint),
        Value::String(text) => {
            let mut encoded = String::new();
            write_string(text, &mut encoded);
            paint(TokenRole::String, &encoded, out);
        }
        Value::Number(num) => {
            let mut encoded = String::new();
            write_number(*num, &mut encoded);
            paint(TokenRole::Number, &encoded, out);
        }
        Value::Boolean(flag) => paint(TokenRole::Boolean, if *flag { "true" } else { "false" }, out),
        Value::Null => paint(TokenRole::Null, "null", out),
    }
}

fn write_pretty_object<F>(map: &Map, indent: usize, out: &mut String, paint: &mut F)
where
    F: FnMut(TokenRole, &str, &mut String),
{
    if map.is_empty() {
        paint(TokenRole::Punct, "{}", out);
        return;
    }
    paint(TokenRole::Punct, "{", out);
    out.push('\n');
    let len = map.len();
    for (idx, (key, item)) in map.iter().enumerate() {
        push_indent(indent + 1, out);
        let mut encoded = String::new();
        write_string(key, &mut encoded);
        paint(TokenRole::Key, &encoded, out);
        paint(TokenRole::Punct, ":", out);
        out.push(' ');
        write_pretty(item, indent + 1, out, paint);
        if idx + 1 < len {
            paint(TokenRole::Punct, ",", out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    paint(TokenRole::Punct, "}", out);
}

fn write_pretty_array<F>(items: &[Value], indent: usize, out: &mut String, paint: &mut F)
where
    F: FnMut(TokenRole, &str, &mut String),
{
    if items.is_empty() {
        paint(TokenRole::Punct, "[]", out);
        return;
    }
    paint(TokenRole::Punct, "[", out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_pretty(item, indent + 1, out, paint);
        if idx + 1 < items.len() {
            paint(TokenRole::Punct, ",", out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    paint(TokenRole::Punct, "]", out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenRole, serialize, to_string_pretty, write_pretty_with};
    use crate::json::parse::parse;
    use crate::json::value::Value;

    #[test]
    fn scalars_use_pinned_formatting() {
        assert_eq!(serialize(&Value::from(100.0)), "100");
        assert_eq!(serialize(&Value::from(10)), "10");
        assert_eq!(serialize(&Value::from(0.1)), "0.1");
        assert_eq!(serialize(&Value::from(-2.5)), "-2.5");
        assert_eq!(serialize(&Value::from(-0.0)), "-0");
        assert_eq!(serialize(&Value::from(1e10)), "10000000000");
        assert_eq!(serialize(&Value::from(true)), "true");
        assert_eq!(serialize(&Value::Null), "null");
        assert_eq!(serialize(&Value::from(f64::NAN)), "null");
        assert_eq!(serialize(&Value::from(f64::INFINITY)), "null");
    }

    #[test]
    fn strings_escape_quotes_backslashes_and_controls() {
        let value = Value::from("say \"hi\" \\ path\nnext\u{1}");
        assert_eq!(
            serialize(&value),
            r#""say \"hi\" \\ path\nnext\u0001""#
        );
        assert_eq!(serialize(&Value::from("h\u{e9}")), "\"h\u{e9}\"");
    }

    #[test]
    fn objects_serialize_in_lexicographic_key_order() {
        let value = Value::object()
            .with("success", false)
            .with("error", Value::object().with("message", "bad").with("code", 400));
        assert_eq!(
            serialize(&value),
            r#"{"error":{"code":400,"message":"bad"},"success":false}"#
        );
    }

    #[test]
    fn display_matches_serialize() {
        let value = Value::from(vec![Value::from(1), Value::Null, Value::object()]);
        assert_eq!(value.to_string(), "[1,null,{}]");
    }

    #[test]
    fn parse_then_serialize_reproduces_canonical_text() {
        let input = r#"{"key":"value","num":10}"#;
        assert_eq!(serialize(&parse(input).unwrap()), input);

        let reordered = r#"{ "num" : 10 , "key" : "value" }"#;
        assert_eq!(serialize(&parse(reordered).unwrap()), input);
    }

    #[test]
    fn round_trip_preserves_structure() {
        let corpus = [
            r#"{"a":[1,2.5,-3e-7,{"b":null}],"c":"x\"y\\z\n","d":{},"e":[]}"#,
            r#"[true,false,null,"\u0000\u001f☃😀"]"#,
            r#""top-level string""#,
            "-0",
            "1.7976931348623157e308",
            "5e-324",
            r#"{"deep":[[[[{"x":[[]]}]]]]}"#,
        ];
        for input in corpus {
            let value = parse(input).unwrap();
            let text = serialize(&value);
            assert_eq!(parse(&text).unwrap(), value, "input: {input}");
        }
    }

    #[test]
    fn pretty_output_indents_two_spaces() {
        let value = Value::object()
            .with("arr", Value::from(vec![Value::from(1), Value::from(true)]))
            .with("empty", Value::object())
            .with("nested", Value::object().with("x", "y"));
        let expected = "{\n  \"arr\": [\n    1,\n    true\n  ],\n  \"empty\": {},\n  \"nested\": {\n    \"x\": \"y\"\n  }\n}";
        assert_eq!(to_string_pretty(&value), expected);
        assert_eq!(parse(&to_string_pretty(&value)).unwrap(), value);
    }

    #[test]
    fn pretty_writer_reports_token_roles() {
        let value = Value::object()
            .with("k", Value::from(vec![Value::from(2), Value::Null]))
            .with("t", true);
        let mut roles = Vec::new();
        let mut out = String::new();
        write_pretty_with(&value, &mut out, &mut |role: TokenRole, text: &str, out: &mut String| {
            roles.push((role, text.to_string()));
            out.push_str(text);
        });
        assert_eq!(out, to_string_pretty(&value));
        assert!(roles.contains(&(TokenRole::Key, "\"k\"".to_string())));
        assert!(roles.contains(&(TokenRole::Number, "2".to_string())));
        assert!(roles.contains(&(TokenRole::Null, "null".to_string())));
        assert!(roles.contains(&(TokenRole::Boolean, "true".to_string())));
        assert!(roles.iter().all(|(_, text)| !text.contains('\n')));
    }
}
