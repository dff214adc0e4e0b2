//! Token pair and refresh endpoint
//!
//! The API issues an access/refresh pair on login and on refresh, both in the
//! `{ "access": ..., "refresh": ... }` shape. Refresh is a JSON POST carrying
//! `{ "refreshToken": ... }`.
//!
//! A response only counts as a successful refresh when it is 2xx AND both
//! tokens are present and non-empty; a half pair is never persisted.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Access/refresh credential pair. Both values are opaque bearer strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Body of a token response. Fields are optional so that a missing token is
/// reported as `IncompleteTokenPair` rather than a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenResponse {
    /// Require both tokens to be present and non-empty.
    pub fn into_pair(self) -> Result<TokenPair> {
        match (self.access, self.refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok(TokenPair { access, refresh })
            }
            (access, refresh) => Err(Error::IncompleteTokenPair(format!(
                "access present: {}, refresh present: {}",
                access.is_some_and(|a| !a.is_empty()),
                refresh.is_some_and(|r| !r.is_empty()),
            ))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Exchange a refresh token for a new pair.
///
/// `url` is the absolute refresh endpoint URL. 401/403 means the refresh
/// token is revoked or invalid and is reported as `InvalidCredentials`.
pub async fn refresh_token(client: &reqwest::Client, url: &str, refresh: &str) -> Result<TokenPair> {
    let response = client
        .post(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&RefreshRequest {
            refresh_token: refresh,
        })
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "refresh token rejected ({status}): {body}"
            )));
        }

        return Err(Error::TokenExchange(format!(
            "token refresh returned {status}: {body}"
        )));
    }

    let token = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid refresh response: {e}")))?;

    debug!(%status, "token refresh response received");
    token.into_pair()
}

/// Something that can turn a refresh token into a fresh pair.
///
/// The HTTP client depends on this trait rather than on the endpoint
/// directly so tests can count or script refresh calls.
pub trait TokenRefresher: Send + Sync {
    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TokenPair>> + Send + 'a>>;
}

/// Refresher backed by the API's refresh endpoint.
#[derive(Clone)]
pub struct HttpTokenRefresher {
    client: reqwest::Client,
    url: String,
}

impl HttpTokenRefresher {
    /// `url` is the absolute refresh endpoint, e.g. `{base}/api/auth/refresh`.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TokenRefresher for HttpTokenRefresher {
    fn refresh<'a>(
        &'a self,
        refresh: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TokenPair>> + Send + 'a>> {
        Box::pin(refresh_token(&self.client, &self.url, refresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::post;
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: axum::Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn token_response_deserializes() {
        let json = r#"{"access":"at_abc","refresh":"rt_def"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let pair = token.into_pair().unwrap();
        assert_eq!(pair, TokenPair::new("at_abc", "rt_def"));
    }

    #[test]
    fn token_response_missing_refresh_is_incomplete() {
        let token: TokenResponse = serde_json::from_str(r#"{"access":"at_abc"}"#).unwrap();
        let err = token.into_pair().unwrap_err();
        assert!(matches!(err, Error::IncompleteTokenPair(_)), "got: {err}");
    }

    #[test]
    fn token_response_empty_access_is_incomplete() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access":"","refresh":"rt"}"#).unwrap();
        assert!(token.into_pair().is_err());
    }

    #[test]
    fn token_pair_debug_is_redacted() {
        let debug = format!("{:?}", TokenPair::new("secret-at", "secret-rt"));
        assert!(!debug.contains("secret-at"));
        assert!(!debug.contains("secret-rt"));
    }

    #[test]
    fn refresh_request_uses_camel_case() {
        let json = serde_json::to_string(&RefreshRequest { refresh_token: "R1" }).unwrap();
        assert_eq!(json, r#"{"refreshToken":"R1"}"#);
    }

    #[tokio::test]
    async fn refresh_posts_token_and_returns_pair() {
        let router = axum::Router::new().route(
            "/api/auth/refresh",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["refreshToken"], "R1");
                Json(serde_json::json!({"access": "A2", "refresh": "R2"}))
            }),
        );
        let base = serve(router).await;

        let refresher = HttpTokenRefresher::new(
            reqwest::Client::new(),
            format!("{base}/api/auth/refresh"),
        );
        let pair = refresher.refresh("R1").await.unwrap();
        assert_eq!(pair, TokenPair::new("A2", "R2"));
    }

    #[tokio::test]
    async fn refresh_400_is_token_exchange_error() {
        let router = axum::Router::new().route(
            "/api/auth/refresh",
            post(|| async { (StatusCode::BAD_REQUEST, "bad refresh token") }),
        );
        let base = serve(router).await;

        let client = reqwest::Client::new();
        let err = refresh_token(&client, &format!("{base}/api/auth/refresh"), "BAD")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)), "got: {err}");
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn refresh_401_is_invalid_credentials() {
        let router = axum::Router::new().route(
            "/api/auth/refresh",
            post(|| async { StatusCode::UNAUTHORIZED }),
        );
        let base = serve(router).await;

        let client = reqwest::Client::new();
        let err = refresh_token(&client, &format!("{base}/api/auth/refresh"), "REVOKED")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials(_)), "got: {err}");
    }

    #[tokio::test]
    async fn refresh_incomplete_body_is_rejected() {
        let router = axum::Router::new().route(
            "/api/auth/refresh",
            post(|| async { Json(serde_json::json!({"access": "A2"})) }),
        );
        let base = serve(router).await;

        let client = reqwest::Client::new();
        let err = refresh_token(&client, &format!("{base}/api/auth/refresh"), "R1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteTokenPair(_)), "got: {err}");
    }

    #[tokio::test]
    async fn refresh_unreachable_endpoint_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let err = refresh_token(&client, &format!("http://{addr}/api/auth/refresh"), "R1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got: {err}");
    }
}
