//! Session storage and token refresh for the CRM API
//!
//! Provides the persistent key-value store the HTTP client reads bearer
//! tokens from, the session key layout shared with the mobile app, and the
//! refresh endpoint client. This crate has no dependency on the HTTP client
//! itself and can be tested on its own.
//!
//! Session lifecycle:
//! 1. Login returns a `TokenPair`, stored via `Session::set_tokens()`
//! 2. Every request reads `Session::access_token()`
//! 3. On a 401 the client calls `TokenRefresher::refresh()` with
//!    `Session::refresh_token()` and stores the new pair
//! 4. Logout or a failed refresh calls `Session::clear_auth()`

pub mod constants;
pub mod error;
pub mod session;
pub mod store;
pub mod token;

pub use constants::*;
pub use error::{Error, Result};
pub use session::Session;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreFuture};
pub use token::{HttpTokenRefresher, TokenPair, TokenRefresher, TokenResponse, refresh_token};
