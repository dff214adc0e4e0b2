//! Account and session flows
//!
//! Login and register persist the returned token pair (and user profile, when
//! the server includes one) into the client's session store, so later calls
//! are authenticated. Logout always clears the local session, whether or not
//! the server call succeeds.
//!
//! Credential submissions are sent marked as retries: a 401 there means bad
//! credentials, not an expired access token, and must not trigger a refresh.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use common::Secret;
use crm_auth::{TokenPair, TokenResponse};
use crm_client::{HttpClient, Request};

use crate::endpoints;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}

/// Body returned by login and register.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    #[serde(default)]
    pub user: Option<Value>,
}

/// Session state read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub tokens: TokenPair,
    pub user: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPassword<'a> {
    token: &'a str,
    new_password: &'a Secret<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePassword<'a> {
    current_password: &'a Secret<String>,
    new_password: &'a Secret<String>,
}

pub struct Auth<'a> {
    client: &'a HttpClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token pair and persist the session.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<StoredSession> {
        let request = Request::post(endpoints::LOGIN)
            .with_json(credentials)?
            .as_retry();
        let session = self.establish(request).await?;
        info!("login succeeded");
        Ok(session)
    }

    /// Create an account. The response has the login shape and is persisted
    /// the same way.
    pub async fn register(&self, registration: Value) -> Result<StoredSession> {
        let request = Request::post(endpoints::REGISTER)
            .with_body(registration)
            .as_retry();
        let session = self.establish(request).await?;
        info!("registration succeeded");
        Ok(session)
    }

    /// Best-effort server logout, then clear the local session.
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self
            .client
            .request(Request::post(endpoints::LOGOUT).as_retry())
            .await
        {
            warn!(error = %e, "server logout failed, clearing local session anyway");
        }
        self.client.session().clear_auth().await?;
        info!("logged out");
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value> {
        let request = Request::post(endpoints::FORGOT_PASSWORD)
            .with_body(json!({ "email": email }))
            .as_retry();
        Ok(self.client.request(request).await?.into_json())
    }

    pub async fn reset_password(&self, token: &str, new_password: &Secret<String>) -> Result<Value> {
        let request = Request::post(endpoints::RESET_PASSWORD)
            .with_json(&ResetPassword {
                token,
                new_password,
            })?
            .as_retry();
        Ok(self.client.request(request).await?.into_json())
    }

    /// Fetch the current user's profile and cache it in the session.
    pub async fn profile(&self) -> Result<Value> {
        let profile = self.client.get(endpoints::USER_PROFILE).await?.into_json();
        if profile.is_object() {
            self.client.session().set_user(&profile).await?;
        }
        Ok(profile)
    }

    /// Update profile fields. The cached user is replaced by the server's
    /// copy when one is returned, otherwise `changes` are merged into it.
    pub async fn update_profile(&self, changes: Value) -> Result<Value> {
        let updated = self
            .client
            .put(endpoints::USER_PROFILE, changes.clone())
            .await?
            .into_json();
        let session = self.client.session();
        if updated.is_object() {
            session.set_user(&updated).await?;
        } else {
            session.update_user(changes).await?;
        }
        Ok(updated)
    }

    pub async fn change_password(
        &self,
        current_password: &Secret<String>,
        new_password: &Secret<String>,
    ) -> Result<Value> {
        let request = Request::post(endpoints::CHANGE_PASSWORD).with_json(&ChangePassword {
            current_password,
            new_password,
        })?;
        Ok(self.client.request(request).await?.into_json())
    }

    /// Session left by a previous run, if both tokens are stored.
    pub async fn restore_session(&self) -> Result<Option<StoredSession>> {
        let session = self.client.session();
        let Some(tokens) = session.tokens().await? else {
            return Ok(None);
        };
        let user = session.user().await?;
        Ok(Some(StoredSession { tokens, user }))
    }

    async fn establish(&self, request: Request) -> Result<StoredSession> {
        let response: LoginResponse = self
            .client
            .request(request)
            .await?
            .deserialize()
            .map_err(|e| Error::UnexpectedResponse(format!("invalid login response: {e}")))?;

        let tokens = response.tokens.into_pair()?;
        let session = self.client.session();
        session.set_tokens(&tokens).await?;
        if let Some(user) = &response.user {
            session.set_user(user).await?;
        }

        Ok(StoredSession {
            tokens,
            user: response.user,
        })
    }
}
