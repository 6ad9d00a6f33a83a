//! Purpose: Define the public request-handling API boundary.
//! Exports: Validator, response builder, request handler, request config, and file store.
//! Role: Public, additive-only surface used by the CLI and library callers.
//! Invariants: Every operation returns envelopes or typed errors; none panic on input.

mod handler;
mod request;
mod response;
mod store;
mod validation;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use handler::{handle_named_request, handle_request};
pub use request::{ApiConfig, DEFAULT_MODEL, build_request, simulate_api_call};
pub use response::{
    BAD_REQUEST, bad_request, error_response, success_response, validation_error_response,
};
pub use store::{load_from_file, load_from_file_with_max_depth, save_to_file};
pub use validation::{
    BROAD_SEARCH_ENDPOINTS, VALIDATION_ERROR_CODE, ValidationError, is_broad_search, validate,
};
