//! Dashboard summaries

use serde_json::Value;

use crm_client::HttpClient;

use crate::endpoints;
use crate::error::Result;

pub struct Dashboard<'a> {
    client: &'a HttpClient,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<Value> {
        Ok(self.client.get(endpoints::DASHBOARD_STATS).await?.into_json())
    }

    pub async fn recent_activities(&self) -> Result<Value> {
        Ok(self
            .client
            .get(endpoints::DASHBOARD_RECENT_ACTIVITIES)
            .await?
            .into_json())
    }

    pub async fn charts(&self) -> Result<Value> {
        Ok(self.client.get(endpoints::DASHBOARD_CHARTS).await?.into_json())
    }
}
