//! Auth-aware request dispatch.
//!
//! [`ApiClient::send`] performs one logical API call: it attaches the stored
//! bearer token, parses the response, and on a 401 asks the
//! [`RefreshCoordinator`] for new tokens before retrying exactly once.

use std::sync::Arc;

use folio_common::config::AppConfig;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ApiError, FolioError, Result};
use crate::refresh::RefreshCoordinator;
use crate::storage::FileStorage;
use crate::tokens::TokenStore;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, MultipartForm, RequestBody, ReqwestTransport};

/// Description of one logical API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/api/projects/3`.
    pub path: String,
    pub body: Option<RequestBody>,
    /// Extra headers; these override the defaults.
    pub headers: HeaderMap,
    /// Attach the bearer token and refresh on 401. Defaults to `true`.
    pub auth: bool,
    pub cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            auth: true,
            cancel: None,
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

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send without credentials and never refresh.
    pub fn public(mut self) -> Self {
        self.auth = false;
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Default headers for every call: no caching, JSON content type when the
/// body is JSON, bearer credentials when a token is given.
pub(crate) fn request_headers(json_body: bool, bearer: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if json_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Some(token) = bearer {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| FolioError::Other(e.to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Async client for the portfolio API.
///
/// ```rust,no_run
/// use folio_client::{ApiClient, ApiRequest};
///
/// # async fn run(config: &folio_common::config::AppConfig) -> folio_client::Result<()> {
/// let api = ApiClient::from_config(config)?;
/// let page: serde_json::Value = api.send(ApiRequest::get("/api/projects?page=0&size=10")).await?;
/// println!("{page}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    refresher: Arc<RefreshCoordinator>,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>, tokens: TokenStore) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let refresher = Arc::new(RefreshCoordinator::new(Arc::clone(&transport), tokens.clone(), &base_url));
        Self { transport, tokens, refresher, base_url }
    }

    /// Production wiring: reqwest transport, tokens in the configured file.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.api)?;
        let storage = FileStorage::open(&config.storage.path);
        Ok(Self::new(&config.api.base_url, Arc::new(transport), TokenStore::new(Arc::new(storage))))
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Perform the call and deserialize the body.
    ///
    /// A 204 deserializes `T` from JSON `null`, so use `()` or `Option<_>`
    /// for endpoints without content.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let value = self.send_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Perform the call and return the raw JSON body (`null` when empty).
    pub async fn send_value(&self, request: ApiRequest) -> Result<Value> {
        let mut may_retry = request.auth;
        loop {
            let response = self.execute_once(&request).await?;

            if response.status == StatusCode::UNAUTHORIZED.as_u16() && may_retry {
                may_retry = false;
                if self.refresher.refresh().await {
                    debug!(method = %request.method, path = %request.path, "Retrying after token refresh");
                    continue;
                }
                warn!(path = %request.path, "Session expired; clearing stored tokens");
                self.tokens.clear_tokens();
            }

            return parse_response(response);
        }
    }

    async fn execute_once(&self, request: &ApiRequest) -> Result<HttpResponse> {
        let bearer = if request.auth { self.tokens.access_token() } else { None };
        let json_body = request.body.as_ref().is_some_and(RequestBody::is_json);
        let mut headers = request_headers(json_body, bearer.as_deref())?;
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        let http = HttpRequest {
            method: request.method.clone(),
            url: format!("{}{}", self.base_url, request.path),
            headers,
            body: request.body.clone(),
        };

        match &request.cancel {
            Some(cancel) => tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FolioError::Cancelled),
                result = self.transport.execute(http) => result,
            },
            None => self.transport.execute(http).await,
        }
    }

    // ── Shorthands ───────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_value(ApiRequest::delete(path)).await.map(drop)
    }
}

fn parse_response(response: HttpResponse) -> Result<Value> {
    if response.status == StatusCode::NO_CONTENT.as_u16() {
        return Ok(Value::Null);
    }

    let success = response.is_success();
    let parsed = if response.body.trim().is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => Some(value),
            Err(e) if success => return Err(e.into()),
            // Error pages are often plain text or HTML; keep them as the payload.
            Err(_) => Some(Value::String(response.body)),
        }
    };

    if !success {
        return Err(ApiError::from_response(response.status, parsed).into());
    }
    Ok(parsed.unwrap_or(Value::Null))
}
