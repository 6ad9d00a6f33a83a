//! Purpose: Turn a request object into a standard response envelope.
//! Exports: `handle_request`, `handle_named_request`.
//! Role: Canonical request entrypoint combining validation and response building.
//! Invariants: Field access is checked; malformed requests yield error envelopes, never panics.

use crate::api::response::{bad_request, success_response, validation_error_response};
use crate::api::validation::validate;
use crate::json::value::Value;

pub fn handle_request(endpoint: &str, request: &Value) -> Value {
    match validate(endpoint, request.get("parameters")) {
        Ok(()) => success_response(format!(
            "Request processed successfully for endpoint: {endpoint}"
        )),
        Err(err) => validation_error_response(&err),
    }
}

/// Reads the endpoint from the request's `"name"` member, then delegates to `handle_request`.
pub fn handle_named_request(request: &Value) -> Value {
    match request.get("name").and_then(Value::as_str) {
        Some(name) => handle_request(name, request),
        None => bad_request("Request must be a JSON object with a 'name' field."),
    }
}
