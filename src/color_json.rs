//! Purpose: ANSI highlighting for pretty JSON written to a terminal.
//! Exports: colorize_json.
//! Role: Supplies a painter to `serialize::write_pretty_with`; layout stays in the library.
//! Invariants: With color disabled, output is byte-identical to `json::to_string_pretty`.
use cogcfg::json::Value;
use cogcfg::json::serialize::{TokenRole, write_pretty_with};

// 8/16-color codes.
fn role_color(role: TokenRole) -> &'static str {
    match role {
        TokenRole::Key => "36",
        TokenRole::String => "32",
        TokenRole::Number => "33",
        TokenRole::Boolean => "35",
        TokenRole::Null | TokenRole::Punct => "39",
    }
}

pub fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_pretty_with(value, &mut out, &mut |role: TokenRole, text: &str, out: &mut String| {
        if use_color {
            out.push_str(&format!("\u{1b}[{}m{text}\u{1b}[0m", role_color(role)));
        } else {
            out.push_str(text);
        }
    });
    out
}
