use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::parsing::field_text;
use crate::core::models::{DecodedBody, Headers};
use crate::errors::RelayError;

pub const TOKEN_HEADER: &str = "x-webhook-token";

/// Finds the caller-supplied token: the `x-webhook-token` header, then the `token` or
/// `secret` field of a structured body, then a `token:`/`secret:` first line of a text body.
#[must_use]
pub fn resolve_token(body: &DecodedBody, headers: &Headers) -> Option<String> {
    if let Some(token) = headers
        .get(TOKEN_HEADER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    match body {
        DecodedBody::Structured(map) => ["token", "secret"]
            .into_iter()
            .filter_map(|key| field_text(map, key))
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty()),
        DecodedBody::Text(text) => first_line_token(text),
    }
}

fn first_line_token(text: &str) -> Option<String> {
    static PREFIX_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^(?:token|secret):(.*)$").expect("static regex compile"));

    let first_line = text.lines().next()?.trim();
    PREFIX_RE
        .captures(first_line)
        .map(|cap| cap[1].trim().to_string())
}

/// Checks the caller token against the configured secret. With no secret configured
/// every request passes.
///
/// # Errors
///
/// Returns `RelayError::Unauthorized` if a secret is configured and the resolved token is
/// missing or differs from it.
pub fn validate_secret(
    secret: Option<&str>,
    body: &DecodedBody,
    headers: &Headers,
) -> Result<(), RelayError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    match resolve_token(body, headers) {
        Some(token) if token == secret => Ok(()),
        Some(_) => {
            warn!("Webhook token mismatch");
            Err(RelayError::Unauthorized)
        }
        None => {
            warn!("Webhook token missing");
            Err(RelayError::Unauthorized)
        }
    }
}
