//! Purpose: Library crate backing the `cogcfg` CLI and its tests.
//! Exports: `json` (value model, parser, serializer), `template`, `api`, `core`.
//! Role: Synchronous, pure JSON processing stack; no I/O outside `api::store`.
//! Invariants: Values are owned trees; callers never observe shared mutable state.
//! Invariants: Failures surface as typed errors, never panics on user input.
pub mod api;
pub mod core;
pub mod json;
pub mod template;
