//! Purpose: JSON value model plus its parser and serializer.
//! Exports: `Value`, `ValueKind`, `Map`, `parse`, `serialize`, and parse error types.
//! Role: Single seam for JSON decode/encode so callsites avoid ad hoc text handling.
//! Invariants: Parsing and serialization are pure; no hidden global state.
//! Invariants: Decode failures surface as located `ParseError`s, never panics.

mod interop;
pub mod parse;
pub mod serialize;
pub mod value;

pub use parse::{
    DEFAULT_MAX_DEPTH, ParseError, ParseFailureCategory, Parser, from_slice,
    from_slice_with_max_depth, hint_for_error, parse,
};
pub use serialize::{serialize, to_string_pretty};
pub use value::{Map, Value, ValueKind};
