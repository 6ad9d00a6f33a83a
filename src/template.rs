//! Purpose: Resolve `${KIND:key}` placeholders against environment, config and input contexts.
//! Exports: `Resolver`, `resolve`, `extract_placeholders`, `is_template`, `Placeholder`, `TemplateError`.
//! Role: Free-standing resolver that reads `Value` trees by reference; never mutates them.
//! Invariants: Scanning only moves forward; substituted text is never rescanned.
//! Invariants: Each `${` occurrence yields at most one substitution, so resolution terminates.
//! Invariants: Placeholders without `:` are left verbatim.
//! Notes: Kinds other than ENV/CONFIG/INPUT pass through unless the resolver is strict.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::json::value::Value;

pub type Context = BTreeMap<String, String>;

const SUPPORTED_KINDS: &str = "ENV, CONFIG, INPUT";

/// Source of `${ENV:...}` values.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for Context {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UnknownKindPolicy {
    #[default]
    PassThrough,
    Reject,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placeholder {
    pub kind: String,
    pub key: String,
    /// Byte range of the full `${...}` token in the template.
    pub start: usize,
    pub end: usize,
}

impl Placeholder {
    /// Splits `key|default` at the first `|`.
    pub fn key_and_default(&self) -> (&str, Option<&str>) {
        match self.key.split_once('|') {
            Some((key, default)) => (key, Some(default)),
            None => (self.key.as_str(), None),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemplateError {
    UnsupportedKind {
        kind: String,
        placeholder: String,
        offset: usize,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnsupportedKind {
                kind,
                placeholder,
                offset,
            } => write!(
                f,
                "unsupported placeholder kind `{kind}` in `{placeholder}` at offset {offset}"
            ),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<TemplateError> for Error {
    fn from(err: TemplateError) -> Self {
        let TemplateError::UnsupportedKind { offset, .. } = &err;
        let offset = *offset as u64;
        Error::new(ErrorKind::Template)
            .with_message(err.to_string())
            .with_hint(format!("Supported placeholder kinds: {SUPPORTED_KINDS}."))
            .with_offset(offset)
    }
}

enum Token<'t> {
    Placeholder(Placeholder),
    Malformed { start: usize, end: usize, text: &'t str },
}

/// Finds the next `${...}` token at or after `from`. `${}` is not a token.
fn next_token(template: &str, from: usize) -> Option<Token<'_>> {
    let mut search = from;
    loop {
        let start = search + template[search..].find("${")?;
        let inner_start = start + 2;
        let close = inner_start + template[inner_start..].find('}')?;
        if close == inner_start {
            search = inner_start;
            continue;
        }
        let end = close + 1;
        let inner = &template[inner_start..close];
        return Some(match inner.split_once(':') {
            Some((kind, key)) => Token::Placeholder(Placeholder {
                kind: kind.to_string(),
                key: key.to_string(),
                start,
                end,
            }),
            None => Token::Malformed {
                start,
                end,
                text: &template[start..end],
            },
        });
    }
}

pub fn extract_placeholders(template: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(token) = next_token(template, cursor) {
        match token {
            Token::Placeholder(placeholder) => {
                cursor = placeholder.end;
                found.push(placeholder);
            }
            Token::Malformed { end, .. } => cursor = end,
        }
    }
    found
}

pub fn is_template(text: &str) -> bool {
    !extract_placeholders(text).is_empty()
}

/// Resolves `template` using `context` for both CONFIG and INPUT lookups.
pub fn resolve(template: &str, context: &Context) -> String {
    Resolver::new(context).resolve(template)
}

pub struct Resolver<'a> {
    config: &'a Context,
    input: &'a Context,
    env: &'a dyn Environment,
    policy: UnknownKindPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            config: context,
            input: context,
            env: &ProcessEnv,
            policy: UnknownKindPolicy::PassThrough,
        }
    }

    pub fn with_input(mut self, input: &'a Context) -> Self {
        self.input = input;
        self
    }

    pub fn with_environment(mut self, env: &'a dyn Environment) -> Self {
        self.env = env;
        self
    }

    pub fn with_policy(mut self, policy: UnknownKindPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves with pass-through semantics for unknown kinds, whatever the policy.
    pub fn resolve(&self, template: &str) -> String {
        match self.expand(template, UnknownKindPolicy::PassThrough) {
            Ok(text) => text,
            Err(_) => template.to_string(),
        }
    }

    pub fn try_resolve(&self, template: &str) -> Result<String, TemplateError> {
        self.expand(template, self.policy)
    }

    /// Resolves every string leaf of `value`. Object keys are left untouched.
    pub fn resolve_value(&self, value: &Value) -> Result<Value, TemplateError> {
        Ok(match value {
            Value::String(text) => Value::String(self.try_resolve(text)?),
            Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (key, item) in map {
                    out.insert(key.clone(), self.resolve_value(item)?);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_value(item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            scalar => scalar.clone(),
        })
    }

    fn expand(&self, template: &str, policy: UnknownKindPolicy) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut cursor = 0;

        while let Some(token) = next_token(template, cursor) {
            match token {
                Token::Placeholder(placeholder) => {
                    out.push_str(&template[cursor..placeholder.start]);
                    match self.lookup(&placeholder) {
                        Some(replacement) => out.push_str(&replacement),
                        None => {
                            let text = &template[placeholder.start..placeholder.end];
                            if policy == UnknownKindPolicy::Reject {
                                return Err(TemplateError::UnsupportedKind {
                                    kind: placeholder.kind,
                                    placeholder: text.to_string(),
                                    offset: placeholder.start,
                                });
                            }
                            tracing::debug!(kind = %placeholder.kind, "leaving unsupported placeholder unresolved");
                            out.push_str(text);
                        }
                    }
                    cursor = placeholder.end;
                }
                Token::Malformed { start, end, text } => {
                    tracing::trace!(placeholder = text, "placeholder without kind separator");
                    out.push_str(&template[cursor..start]);
                    out.push_str(text);
                    cursor = end;
                }
            }
        }

        out.push_str(&template[cursor..]);
        Ok(out)
    }

    /// `None` means the kind has no substitution rule.
    fn lookup(&self, placeholder: &Placeholder) -> Option<String> {
        match placeholder.kind.as_str() {
            "ENV" => Some(self.env.var(&placeholder.key).unwrap_or_default()),
            "CONFIG" => {
                let (key, default) = placeholder.key_and_default();
                Some(
                    self.config
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| default.unwrap_or_default().to_string()),
                )
            }
            "INPUT" => Some(self.input.get(&placeholder.key).cloned().unwrap_or_default()),
            _ => None,
        }
    }
}
