use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::models::{DecodedBody, IncomingRequest};
use crate::errors::RelayError;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes the raw request body and, for JSON content types, parses it into a mapping.
///
/// A JSON body that fails to parse, or parses to something other than an object, falls
/// back to plain text rather than failing the request.
///
/// # Errors
///
/// Returns `RelayError::Decode` if the body is flagged as base64 but is not valid base64.
/// Whitespace and missing padding are tolerated.
pub fn decode_body(request: &IncomingRequest) -> Result<DecodedBody, RelayError> {
    let text = if request.is_base64_encoded {
        let compact: String = request
            .body
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = LENIENT_BASE64
            .decode(compact)
            .map_err(|e| RelayError::Decode(format!("invalid base64 body: {}", e)))?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        request.body.clone()
    };

    let is_json = request
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if !is_json {
        return Ok(DecodedBody::Text(text));
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(DecodedBody::Structured(map)),
        Ok(_) => {
            debug!("JSON body is not an object, treating as plain text");
            Ok(DecodedBody::Text(text))
        }
        Err(e) => {
            debug!("JSON body failed to parse, treating as plain text: {}", e);
            Ok(DecodedBody::Text(text))
        }
    }
}

/// Pulls the text to forward: `message`, then `text` for structured bodies, the whole
/// body otherwise. The result is trimmed.
///
/// # Errors
///
/// Returns `RelayError::EmptyMessage` when nothing but whitespace remains.
pub fn extract_message(body: &DecodedBody) -> Result<String, RelayError> {
    let message = match body {
        DecodedBody::Structured(map) => field_text(map, "message")
            .filter(|m| !m.trim().is_empty())
            .or_else(|| field_text(map, "text"))
            .unwrap_or_default(),
        DecodedBody::Text(text) => text.clone(),
    };

    let message = message.trim();
    if message.is_empty() {
        return Err(RelayError::EmptyMessage);
    }
    Ok(message.to_string())
}

/// Renders a top-level field as text. Strings are taken verbatim, `null` counts as absent,
/// anything else is rendered as JSON.
pub(crate) fn field_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
