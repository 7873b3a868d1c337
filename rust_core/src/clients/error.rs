//! Typed failures for market API requests

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a market API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, body decode)
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered, but with an `error` object instead of data
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
}

impl ApiError {
    /// Detect an API-level error embedded in a response payload.
    ///
    /// Accepts `{"error": {"code": 2, "error": "Incorrect key"}}`,
    /// `{"error": {"message": ...}}` and `{"error": "text"}`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let error = payload.get("error")?;
        match error {
            Value::Null => None,
            Value::Object(obj) => {
                let code = obj.get("code").and_then(Value::as_i64).unwrap_or(-1);
                let message = obj
                    .get("error")
                    .or_else(|| obj.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                Some(Self::Api { code, message })
            }
            Value::String(message) => Some(Self::Api {
                code: -1,
                message: message.clone(),
            }),
            other => Some(Self::Api {
                code: -1,
                message: other.to_string(),
            }),
        }
    }
}
