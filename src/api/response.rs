//! Purpose: Build the standard success/error response envelopes.
//! Exports: `error_response`, `bad_request`, `success_response`, `validation_error_response`.
//! Role: Shared contract for API callers and the CLI.
//! Invariants: Error shape is `{"error":{"code":..,"message":..},"success":false}`.
//! Invariants: Success shape always carries `"message"` alongside `"success":true`.

use crate::api::validation::ValidationError;
use crate::json::value::Value;

pub const BAD_REQUEST: i32 = 400;

pub fn error_response(message: impl Into<String>, code: i32) -> Value {
    let error = Value::object()
        .with("code", code)
        .with("message", message.into());
    Value::object().with("error", error).with("success", false)
}

pub fn bad_request(message: impl Into<String>) -> Value {
    error_response(message, BAD_REQUEST)
}

pub fn success_response(message: impl Into<String>) -> Value {
    Value::object()
        .with("success", true)
        .with("message", message.into())
}

pub fn validation_error_response(err: &ValidationError) -> Value {
    error_response(err.to_string(), err.code())
}
