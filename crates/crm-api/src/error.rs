//! Error types for the resource wrappers

/// Errors from CRM API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] crm_client::Error),

    #[error(transparent)]
    Session(#[from] crm_auth::Error),

    /// A 2xx response whose body does not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Client(e) => e.status(),
            _ => None,
        }
    }
}

/// Result alias for CRM API calls.
pub type Result<T> = std::result::Result<T, Error>;
