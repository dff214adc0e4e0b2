//! Session view over a key-value store
//!
//! Maps the logical session (token pair + user profile) onto the three
//! storage keys. The pair is always written with a single `set_many` and
//! cleared with a single `remove_many`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY};
use crate::error::{Error, Result};
use crate::store::KeyValueStore;
use crate::token::TokenPair;

/// Cheaply cloneable handle to the persisted session.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Current access token. Empty strings count as absent.
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.non_empty(ACCESS_TOKEN_KEY).await
    }

    /// Current refresh token. Empty strings count as absent.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.non_empty(REFRESH_TOKEN_KEY).await
    }

    /// Both tokens, if both are stored.
    pub async fn tokens(&self) -> Result<Option<TokenPair>> {
        let access = self.access_token().await?;
        let refresh = self.refresh_token().await?;
        Ok(access.zip(refresh).map(|(access, refresh)| TokenPair { access, refresh }))
    }

    pub async fn set_tokens(&self, pair: &TokenPair) -> Result<()> {
        self.store
            .set_many(vec![
                (ACCESS_TOKEN_KEY.to_owned(), pair.access.clone()),
                (REFRESH_TOKEN_KEY.to_owned(), pair.refresh.clone()),
            ])
            .await?;
        debug!("stored token pair");
        Ok(())
    }

    /// Remove tokens and user profile.
    pub async fn clear_auth(&self) -> Result<()> {
        self.store
            .remove_many(SESSION_KEYS.iter().map(|k| (*k).to_owned()).collect())
            .await?;
        debug!("cleared session");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.access_token().await?.is_some())
    }

    /// Stored user profile. A corrupt blob reads as `None`.
    pub async fn user(&self) -> Result<Option<Value>> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(error = %e, "stored user profile is not valid JSON, ignoring");
                Ok(None)
            }
        }
    }

    pub async fn set_user(&self, user: &Value) -> Result<()> {
        let raw = serde_json::to_string(user)
            .map_err(|e| Error::CredentialParse(format!("serializing user profile: {e}")))?;
        self.store.set(USER_KEY, raw).await
    }

    /// Shallow-merge `partial` into the stored profile and persist the result.
    ///
    /// A missing or non-object profile is treated as `{}`. Non-object
    /// partials replace the profile outright.
    pub async fn update_user(&self, partial: Value) -> Result<Value> {
        let current = self.user().await?;
        let updated = match (current, partial) {
            (Some(Value::Object(mut base)), Value::Object(changes)) => {
                base.extend(changes);
                Value::Object(base)
            }
            (_, partial) => partial,
        };
        self.set_user(&updated).await?;
        Ok(updated)
    }

    async fn non_empty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key).await?.filter(|v| !v.is_empty()))
    }
}
