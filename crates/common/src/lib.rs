//! Common types for the CRM client crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
