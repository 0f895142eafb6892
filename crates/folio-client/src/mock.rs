//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

pub const BASE_URL: &str = "http://api.test";

enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// Replies are queued per `(method, path)` and consumed in order.
/// Every request is recorded for later assertions.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: impl Into<String>) -> &Self {
        self.push(method, path, Reply::Respond(HttpResponse::new(status, body)));
        self
    }

    pub fn reply_json(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.reply(method, path, status, body.to_string())
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Reply::Fail(message.to_owned()));
        self
    }

    /// Sleep before answering any request to `path`.
    pub fn delay(&self, path: &str, delay: Duration) -> &Self {
        self.delays.lock().unwrap().insert(path.to_owned(), delay);
        self
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        let url = format!("{BASE_URL}{path}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// `Authorization` header values sent to `path`, in order.
    pub fn bearers(&self, path: &str) -> Vec<Option<String>> {
        let url = format!("{BASE_URL}{path}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .map(|r| {
                r.headers
                    .get(reqwest::header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned)
            })
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let path = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url).to_owned();
        let path_only = path.split('?').next().unwrap_or_default().to_owned();
        let method = request.method.clone();
        self.requests.lock().unwrap().push(request);

        let delay = self.delays.lock().unwrap().get(&path_only).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            replies
                .get_mut(&(method.clone(), path.clone()))
                .and_then(VecDeque::pop_front)
                .or_else(|| {
                    replies.get_mut(&(method.clone(), path_only.clone())).and_then(VecDeque::pop_front)
                })
        };
        match reply {
            Some(Reply::Respond(resp)) => Ok(resp),
            Some(Reply::Fail(message)) => Err(FolioError::Other(message)),
            None => Err(FolioError::Other(format!("no mock reply for {method} {path}"))),
        }
    }
}
