//! Decoded response bodies

use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Response payload, decoded according to the declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(t) => Some(t),
            ResponseBody::Json(_) => None,
        }
    }

    /// JSON view of the body. Text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            ResponseBody::Json(v) => v,
            ResponseBody::Text(t) => Value::String(t),
        }
    }

    /// Deserialize the body into a typed value.
    pub fn deserialize<T: DeserializeOwned>(self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_value(self.into_json())
    }

    /// Human-readable message carried by an error body, if any.
    ///
    /// Looks at the `message`, `detail` and `error` string fields, which is
    /// where the API puts its error text.
    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(Value::Object(map)) => ["message", "detail", "error"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str)),
            ResponseBody::Text(t) if !t.trim().is_empty() => Some(t.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(v) => write!(f, "{v}"),
            ResponseBody::Text(t) => f.write_str(t),
        }
    }
}

/// Decode a raw body.
///
/// Declared JSON is parsed; an empty JSON body decodes as `null`. A JSON
/// parse failure is an error only on 2xx: error responses fall back to text
/// so the status still reaches the caller.
pub(crate) fn decode(status: StatusCode, is_json: bool, text: String) -> Result<ResponseBody> {
    if !is_json {
        return Ok(ResponseBody::Text(text));
    }
    if text.trim().is_empty() {
        return Ok(ResponseBody::Json(Value::Null));
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(ResponseBody::Json(value)),
        Err(e) if status.is_success() => Err(Error::Parse {
            status: status.as_u16(),
            message: e.to_string(),
            raw: text,
        }),
        Err(_) => Ok(ResponseBody::Text(text)),
    }
}

/// Whether a content-type header value declares JSON.
pub(crate) fn is_json_content_type(value: &str) -> bool {
    value.to_ascii_lowercase().contains("application/json")
}
