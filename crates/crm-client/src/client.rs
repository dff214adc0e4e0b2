//! Authenticated HTTP client
//!
//! Every call reads the current access token from the session store, attaches
//! it as a bearer token and sends the request. A 401 on a first attempt
//! triggers exactly one refresh-and-retry; if recovery fails the session is
//! cleared and the original 401 is returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, instrument, warn};

use crm_auth::{FileStore, HttpTokenRefresher, KeyValueStore, Session, TokenRefresher};

use crate::config::{ApiConfig, Config};
use crate::curl::to_curl;
use crate::error::{Error, Result};
use crate::metrics as client_metrics;
use crate::refresh::RefreshGate;
use crate::request::{Body, Request};
use crate::response::{ResponseBody, decode, is_json_content_type};

/// Authenticated client for the CRM API.
pub struct HttpClient {
    http: reqwest::Client,
    config: ApiConfig,
    session: Session,
    refresher: Arc<dyn TokenRefresher>,
    gate: RefreshGate,
}

/// Outcome of one send.
struct Sent {
    /// Access token the request carried.
    token: Option<String>,
    status: StatusCode,
    body: ResponseBody,
}

impl Sent {
    fn into_result(self) -> Result<ResponseBody> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(Error::Http {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }
}

impl HttpClient {
    /// Client refreshing through the API's own refresh endpoint.
    pub fn new(config: ApiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        config.validate()?;
        let http = build_http(&config)?;
        let refresher = Arc::new(HttpTokenRefresher::new(http.clone(), config.refresh_url()));
        Ok(Self::assemble(http, config, store, refresher))
    }

    /// Client with a caller-supplied refresher.
    pub fn with_refresher(
        config: ApiConfig,
        store: Arc<dyn KeyValueStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Result<Self> {
        config.validate()?;
        let http = build_http(&config)?;
        Ok(Self::assemble(http, config, store, refresher))
    }

    /// Client backed by the file store named in `config.storage`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = FileStore::load(config.storage.path.clone())
            .await
            .map_err(|e| Error::Storage(format!("failed to open session store: {e}")))?;
        Self::new(config.api.clone(), Arc::new(store))
    }

    fn assemble(
        http: reqwest::Client,
        config: ApiConfig,
        store: Arc<dyn KeyValueStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let gate = RefreshGate::new(config.single_flight_refresh);
        Self {
            http,
            config,
            session: Session::new(store),
            refresher,
            gate,
        }
    }

    /// Persisted session shared with this client.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub async fn get(&self, path: &str) -> Result<ResponseBody> {
        self.request(Request::get(path)).await
    }

    pub async fn post(&self, path: &str, body: impl Into<Body>) -> Result<ResponseBody> {
        self.request(Request::post(path).with_body(body)).await
    }

    pub async fn put(&self, path: &str, body: impl Into<Body>) -> Result<ResponseBody> {
        self.request(Request::put(path).with_body(body)).await
    }

    pub async fn patch(&self, path: &str, body: impl Into<Body>) -> Result<ResponseBody> {
        self.request(Request::patch(path).with_body(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseBody> {
        self.request(Request::delete(path)).await
    }

    /// Send `request`, recovering once from an expired access token.
    #[instrument(skip_all, fields(method = %request.method(), path = %request.path(), retry = request.is_retry()))]
    pub async fn request(&self, request: Request) -> Result<ResponseBody> {
        let url = self.resolve_url(&request)?;
        let sent = self.send(&request, &url).await?;

        if sent.status != StatusCode::UNAUTHORIZED || request.is_retry() {
            return sent.into_result();
        }

        debug!("received 401, attempting token refresh");
        let recovered = self
            .gate
            .recover(&self.session, self.refresher.as_ref(), sent.token.as_deref())
            .await;
        match recovered {
            Ok(()) => {
                info!("retrying request with refreshed token");
                let retry = request.as_retry();
                self.send(&retry, &url).await?.into_result()
            }
            Err(failure) => {
                warn!(error = %failure, "token recovery failed, clearing session");
                if let Err(e) = self.session.clear_auth().await {
                    warn!(error = %e, "failed to clear session after recovery failure");
                }
                sent.into_result()
            }
        }
    }

    fn resolve_url(&self, request: &Request) -> Result<Url> {
        let path = request.path();
        let raw = if request.is_absolute() {
            path.to_owned()
        } else if path.starts_with('/') {
            format!("{}{path}", self.config.base_url())
        } else {
            format!("{}/{path}", self.config.base_url())
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| Error::InvalidRequest(format!("invalid URL {raw}: {e}")))?;
        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query());
        }
        Ok(url)
    }

    async fn send(&self, request: &Request, url: &Url) -> Result<Sent> {
        let token = self
            .session
            .access_token()
            .await
            .map_err(|e| Error::Storage(format!("failed to read access token: {e}")))?;

        let headers = request.effective_headers(token.as_deref());
        if self.config.dev_mode {
            debug!(
                curl = %to_curl(request.method().as_str(), url.as_str(), &headers, request.body()),
                "outgoing request"
            );
        }

        let mut builder = self
            .http
            .request(request.method().clone(), url.clone())
            .headers(header_map(&headers)?);
        builder = match request.body() {
            Some(Body::Text(text)) => builder.body(text.clone()),
            Some(Body::Json(value)) => builder.body(value.to_string()),
            Some(Body::Form(form)) => builder.multipart(form.to_multipart()?),
            None => builder,
        };

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            client_metrics::record_transport_error(client_metrics::classify(&e));
            Error::Transport(e.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {e}")))?;

        client_metrics::record_request(
            request.method().as_str(),
            status.as_u16(),
            started.elapsed().as_secs_f64(),
        );
        debug!(
            status = status.as_u16(),
            authenticated = token.is_some(),
            "response received"
        );

        let body = decode(status, is_json, text)?;
        Ok(Sent {
            token,
            status,
            body,
        })
    }
}

fn build_http(config: &ApiConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
