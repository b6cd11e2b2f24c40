use std::collections::HashMap;

use serde_json::{Map, Value};

/// Header map with lowercase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    /// Case-insensitive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Collects the string-valued entries of a JSON header object.
    #[must_use]
    pub fn from_json(headers: Option<&Value>) -> Self {
        let mut out = Self::default();
        if let Some(map) = headers.and_then(Value::as_object) {
            for (name, value) in map {
                if let Some(v) = value.as_str() {
                    out.insert(name, v);
                }
            }
        }
        out
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::default();
        for (name, value) in iter {
            out.insert(name.as_ref(), value);
        }
        out
    }
}

/// One inbound webhook call, as handed over by the Lambda proxy integration.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub body: String,
    pub is_base64_encoded: bool,
    pub headers: Headers,
}

impl IncomingRequest {
    /// Reads `body`, `isBase64Encoded` and `headers` from a proxy event payload.
    /// A missing body is treated as empty.
    #[must_use]
    pub fn from_event(payload: &Value) -> Self {
        Self {
            body: payload
                .get("body")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_base64_encoded: payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            headers: Headers::from_json(payload.get("headers")),
        }
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    Structured(Map<String, Value>),
    Text(String),
}

impl DecodedBody {
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, DecodedBody::Structured(_))
    }
}
