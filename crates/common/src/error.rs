//! Errors raised while loading client settings
//!
//! Produced by `crm_client::Config::load` and `ApiConfig::validate`; the
//! client crate folds them into its own `Error::Config`.

use thiserror::Error;

/// Settings file and validation failures
#[derive(Error, Debug)]
pub enum Error {
    /// A setting is present but unusable (bad URL scheme, zero timeout, ...)
    #[error("invalid client settings: {0}")]
    Config(String),

    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
