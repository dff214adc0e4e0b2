//! Error types for the authenticated HTTP client

use crate::response::ResponseBody;

/// Errors surfaced by `HttpClient::request`.
///
/// A failed token recovery is not a variant of its own: it surfaces as the
/// original `Http { status: 401, .. }` so callers see one unauthorized signal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response was received (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response declared JSON but its body did not decode.
    #[error("failed to parse response (status {status}): {message}")]
    Parse {
        status: u16,
        message: String,
        raw: String,
    },

    /// Non-2xx response that the refresh path did not resolve.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: ResponseBody },

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("client configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status attached to the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::Parse { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Server-provided message for display, falling back to the error text.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http { body, .. } => body
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| self.to_string()),
            other => other.to_string(),
        }
    }
}

impl From<common::Error> for Error {
    fn from(e: common::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_error_exposes_status_and_body() {
        let err = Error::Http {
            status: 401,
            body: ResponseBody::Json(json!({"detail": "token expired"})),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), r#"HTTP 401: {"detail":"token expired"}"#);
        assert_eq!(err.user_message(), "token expired");
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = Error::Transport("connection refused".into());
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
        assert_eq!(err.user_message(), "transport error: connection refused");
    }

    #[test]
    fn config_error_converts_from_common() {
        let err: Error = common::Error::Config("timeout_secs must be greater than 0".into()).into();
        assert!(matches!(err, Error::Config(_)));
    }
}
