//! In-app notifications

use serde_json::Value;

use crm_client::{HttpClient, Request};

use crate::endpoints;
use crate::error::Result;

pub struct Notifications<'a> {
    client: &'a HttpClient,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &[(&str, &str)]) -> Result<Value> {
        let request =
            Request::get(endpoints::NOTIFICATIONS).with_query_pairs(params.iter().copied());
        Ok(self.client.request(request).await?.into_json())
    }

    pub async fn mark_read(&self, id: &str) -> Result<Value> {
        let request = Request::patch(endpoints::notification_read(id));
        Ok(self.client.request(request).await?.into_json())
    }

    pub async fn mark_all_read(&self) -> Result<Value> {
        let request = Request::patch(endpoints::NOTIFICATIONS_MARK_ALL_READ);
        Ok(self.client.request(request).await?.into_json())
    }
}
