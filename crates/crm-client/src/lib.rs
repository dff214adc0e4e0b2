//! Authenticated HTTP client for the CRM API
//!
//! - `HttpClient` attaches the stored bearer token to every request and
//!   recovers once from a 401 by refreshing the token pair
//! - `Request` / `Body` describe one call; `ResponseBody` is the decoded reply
//! - `Config` loads TOML settings with environment overrides
//! - dev mode logs each outgoing request as a curl command

pub mod client;
pub mod config;
pub mod curl;
pub mod error;
pub mod metrics;
mod refresh;
pub mod request;
pub mod response;

pub use client::HttpClient;
pub use config::{ApiConfig, Config, StorageConfig};
pub use curl::to_curl;
pub use error::{Error, Result};
pub use request::{Body, FormPart, FormPayload, Request};
pub use response::ResponseBody;

pub use crm_auth::{FileStore, KeyValueStore, MemoryStore, Session, TokenPair, TokenRefresher};
