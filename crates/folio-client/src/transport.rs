//! HTTP transport seam.
//!
//! [`HttpTransport`] sends one fully-built request and hands back the raw
//! status and body text. Auth, retries and parsing live in the dispatcher;
//! the transport only moves bytes. [`ReqwestTransport`] is the production
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use folio_common::config::ApiConfig;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::trace;

use crate::error::{FolioError, Result};

/// One file in a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A multipart body that can be rebuilt for a retry.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    fn into_reqwest(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Serialized as JSON; the dispatcher adds the JSON content type.
    Json(Value),
    /// Sent verbatim.
    Text(String),
    /// Pre-built multipart payload; the client sets its own boundary header.
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single HTTP request. Transport failures are returned as errors
/// and are never retried by the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// ─── reqwest ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FolioError::Http)?;
        Ok(Self { client })
    }

    /// Wrap an already-configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        trace!(method = %request.method, url = %request.url, "Sending request");

        let mut req = self.client.request(request.method, &request.url).headers(request.headers);
        req = match request.body {
            Some(RequestBody::Json(value)) => req.body(serde_json::to_vec(&value)?),
            Some(RequestBody::Text(text)) => req.body(text),
            Some(RequestBody::Multipart(form)) => req.multipart(form.into_reqwest()?),
            None => req,
        };

        let resp = req.send().await?;
        let status = resp.status();
        let body = if status == StatusCode::NO_CONTENT {
            String::new()
        } else {
            resp.text().await?
        };
        Ok(HttpResponse { status: status.as_u16(), body })
    }
}
