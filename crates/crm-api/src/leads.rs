//! Lead resource

use serde_json::Value;

use crm_client::{HttpClient, Request};

use crate::endpoints;
use crate::error::Result;

pub struct Leads<'a> {
    client: &'a HttpClient,
}

impl<'a> Leads<'a> {
    pub(crate) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &[(&str, &str)]) -> Result<Value> {
        let request = Request::get(endpoints::LEADS).with_query_pairs(params.iter().copied());
        Ok(self.client.request(request).await?.into_json())
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        Ok(self.client.get(&endpoints::lead(id)).await?.into_json())
    }

    pub async fn create(&self, lead: Value) -> Result<Value> {
        Ok(self.client.post(endpoints::LEADS, lead).await?.into_json())
    }

    pub async fn update(&self, id: &str, lead: Value) -> Result<Value> {
        Ok(self
            .client
            .put(&endpoints::lead(id), lead)
            .await?
            .into_json())
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        Ok(self.client.delete(&endpoints::lead(id)).await?.into_json())
    }

    /// Convert a lead into a customer. Returns whatever the server reports.
    pub async fn convert(&self, id: &str) -> Result<Value> {
        let request = Request::post(endpoints::lead_convert(id));
        Ok(self.client.request(request).await?.into_json())
    }
}
