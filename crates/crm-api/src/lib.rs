//! Typed wrappers over the CRM REST API
//!
//! Every call goes through the authenticated `HttpClient`, so bearer tokens
//! and the refresh-on-401 cycle apply uniformly. Resource payloads are kept
//! as `serde_json::Value`; only the auth flows look inside them.

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod leads;
pub mod notifications;

pub use auth::{Auth, LoginRequest, LoginResponse, StoredSession};
pub use customers::Customers;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use leads::Leads;
pub use notifications::Notifications;

use crm_client::HttpClient;

/// Entry point grouping the resource wrappers over one client.
pub struct CrmApi {
    client: HttpClient,
}

impl CrmApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(&self.client)
    }

    pub fn customers(&self) -> Customers<'_> {
        Customers::new(&self.client)
    }

    pub fn leads(&self) -> Leads<'_> {
        Leads::new(&self.client)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(&self.client)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(&self.client)
    }
}
