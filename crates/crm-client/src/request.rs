//! Request descriptors
//!
//! A `Request` is built per call and never persisted. Header keys are unique
//! and kept exactly as the caller wrote them; when the descriptor is turned
//! into wire headers, caller headers override the defaults case-insensitively.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Default headers sent with every request, in wire order.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [
    ("accept", "application/json"),
    ("Content-Type", "application/json"),
];

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent verbatim.
    Text(String),
    /// Serialized as JSON.
    Json(Value),
    /// Sent as multipart/form-data; the transport picks the boundary.
    Form(FormPayload),
}

impl Body {
    pub fn is_form(&self) -> bool {
        matches!(self, Body::Form(_))
    }

    /// Serialize any value into a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| Error::InvalidRequest(format!("body is not JSON-serializable: {e}")))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_owned())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<FormPayload> for Body {
    fn from(value: FormPayload) -> Self {
        Body::Form(value)
    }
}

/// Binary form payload.
///
/// Kept as plain data rather than a `reqwest::multipart::Form` so the same
/// payload can be sent again on the post-refresh retry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<FormPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.map(str::to_owned),
            bytes,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Build a fresh multipart form for one send.
    pub(crate) fn to_multipart(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut file = reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone());
                    if let Some(ct) = content_type {
                        file = file.mime_str(ct).map_err(|e| {
                            Error::InvalidRequest(format!("invalid content type {ct:?}: {e}"))
                        })?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// One logical API call.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Body>,
    is_retry: bool,
}

impl Request {
    /// `path` is either an absolute `http(s)://` URL or a path relative to
    /// the client's base address.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            is_retry: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a header. A key already present with the exact same spelling is
    /// replaced.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == name) {
            Some(existing) => existing.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self> {
        Ok(self.with_body(Body::json(value)?))
    }

    /// Mark the request as already having been through a refresh cycle.
    /// A 401 on a marked request never triggers another refresh.
    pub fn as_retry(mut self) -> Self {
        self.is_retry = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn is_retry(&self) -> bool {
        self.is_retry
    }

    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }

    /// Headers as they go on the wire, in order.
    ///
    /// 1. defaults
    /// 2. caller headers, replacing defaults with the same name (any case)
    /// 3. content-type dropped for form bodies
    /// 4. `Authorization: Bearer <token>` when a token is present
    pub fn effective_headers(&self, token: Option<&str>) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();

        for (name, value) in &self.headers {
            match headers
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some(existing) => *existing = (name.clone(), value.clone()),
                None => headers.push((name.clone(), value.clone())),
            }
        }

        if self.body.as_ref().is_some_and(Body::is_form) {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
        }

        if let Some(token) = token {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case("authorization"));
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }

        headers
    }
}
