//! Purpose: Model-call request configuration and the simulated call.
//! Exports: `ApiConfig`, `build_request`, `simulate_api_call`.
//! Role: Produces the request/response documents persisted by the CLI.
//! Invariants: Request documents always carry all six config members.
//! Invariants: Simulation checks the `prompt` member instead of assuming it exists.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind};
use crate::json::value::{Value, ValueKind};

pub const DEFAULT_MODEL: &str = "./models/llama-2-13b-chat.Q4_K_M.gguf";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub repeat_penalty: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: String::new(),
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 0.9,
            repeat_penalty: 1.1,
        }
    }
}

impl ApiConfig {
    /// Decodes a config document. Missing members keep their defaults.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        if value.kind() != ValueKind::Object {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("config must be a JSON object, got {}", value.kind()))
                .with_hint("Example: {\"model\":\"./model.gguf\",\"temperature\":0.2}"));
        }
        serde_json::from_value(serde_json::Value::from(value)).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid config: {err}"))
                .with_source(err)
        })
    }
}

pub fn build_request(cfg: &ApiConfig) -> Value {
    Value::object()
        .with("model", cfg.model.as_str())
        .with("prompt", cfg.prompt.as_str())
        .with("temperature", cfg.temperature)
        .with("max_tokens", cfg.max_tokens)
        .with("top_p", cfg.top_p)
        .with("repeat_penalty", cfg.repeat_penalty)
}

pub fn simulate_api_call(request: &Value) -> Result<Value, Error> {
    let prompt = match request.get("prompt") {
        Some(Value::String(prompt)) => prompt,
        Some(other) => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("request 'prompt' must be a string, got {}", other.kind())));
        }
        None => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("request is missing a 'prompt' member")
                .with_hint("Build the request with `cogcfg build-request --prompt ...`."));
        }
    };
    tracing::info!(prompt_len = prompt.len(), "simulating api call");
    Ok(Value::object().with("success", true).with(
        "response",
        format!("[SIMULATED RESPONSE] Based on prompt: {prompt}"),
    ))
}
