//! Customer resource

use serde_json::Value;

use crm_client::{HttpClient, Request};

use crate::endpoints;
use crate::error::Result;

pub struct Customers<'a> {
    client: &'a HttpClient,
}

impl<'a> Customers<'a> {
    pub(crate) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// List customers; `params` are passed through as query parameters.
    pub async fn list(&self, params: &[(&str, &str)]) -> Result<Value> {
        let request = Request::get(endpoints::CUSTOMERS).with_query_pairs(params.iter().copied());
        Ok(self.client.request(request).await?.into_json())
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        Ok(self.client.get(&endpoints::customer(id)).await?.into_json())
    }

    pub async fn create(&self, customer: Value) -> Result<Value> {
        Ok(self
            .client
            .post(endpoints::CUSTOMERS, customer)
            .await?
            .into_json())
    }

    pub async fn update(&self, id: &str, customer: Value) -> Result<Value> {
        Ok(self
            .client
            .put(&endpoints::customer(id), customer)
            .await?
            .into_json())
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        Ok(self.client.delete(&endpoints::customer(id)).await?.into_json())
    }

    /// Search by free text. `term` is sent as `q`, replacing any `q` in `params`.
    pub async fn search(&self, term: &str, params: &[(&str, &str)]) -> Result<Value> {
        let query = params
            .iter()
            .copied()
            .filter(|(key, _)| *key != "q")
            .chain(std::iter::once(("q", term)));
        let request = Request::get(endpoints::CUSTOMER_SEARCH).with_query_pairs(query);
        Ok(self.client.request(request).await?.into_json())
    }
}
