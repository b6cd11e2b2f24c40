//! Response builders for the Lambda proxy integration.

use serde_json::{Value, json};

use crate::errors::RelayError;

/// Returns a proxy response with a plain-text body.
#[must_use]
pub fn text_response(status_code: u16, body: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "text/plain; charset=utf-8" },
        "body": body
    })
}

/// Returns the 200 `ok` response sent after every chunk was delivered.
#[must_use]
pub fn ok_response() -> Value {
    text_response(200, "ok")
}

/// Returns the error's status code with its message as the body.
#[must_use]
pub fn err_response(error: &RelayError) -> Value {
    text_response(error.status_code(), &error.to_string())
}
