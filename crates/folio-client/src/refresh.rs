//! Single-flight access token refresh.
//!
//! Any number of requests may hit a 401 at the same time. The coordinator
//! makes sure only one `POST /api/auth/refresh` is on the wire; every caller
//! that arrives while it is pending awaits the same boolean outcome.
//!
//! The refresh runs as a spawned task, so it completes for the remaining
//! waiters even if the caller that started it is cancelled. The task itself
//! clears the in-flight slot once the outcome is known; the next 401 after
//! that starts a fresh attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use folio_common::models::{RefreshTokenRequest, TokenResponse};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::dispatcher::request_headers;
use crate::tokens::TokenStore;
use crate::transport::{HttpRequest, HttpTransport, RequestBody};

pub const REFRESH_PATH: &str = "/api/auth/refresh";

type PendingRefresh = Shared<BoxFuture<'static, bool>>;

/// `None` is IDLE, `Some` is IN_FLIGHT. The id guards against a settled
/// task clearing a newer attempt.
type Slot = Arc<Mutex<Option<(u64, PendingRefresh)>>>;

pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    refresh_url: String,
    in_flight: Slot,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: TokenStore, base_url: &str) -> Self {
        Self {
            transport,
            tokens,
            refresh_url: format!("{}{REFRESH_PATH}", base_url.trim_end_matches('/')),
            in_flight: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns `true` once new tokens are stored. On any failure returns
    /// `false` and leaves the stored tokens as they were; evicting them is
    /// up to the caller.
    pub async fn refresh(&self) -> bool {
        let pending = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let existing = slot.as_ref().map(|(_, pending)| pending.clone());
            match existing {
                Some(pending) => {
                    debug!("Joining in-flight token refresh");
                    pending
                }
                None => {
                    let Some(refresh_token) = self.tokens.refresh_token() else {
                        debug!("No refresh token stored; skipping refresh");
                        return false;
                    };
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    debug!(attempt = id, "Starting token refresh");
                    let pending = self.spawn_refresh(id, refresh_token);
                    *slot = Some((id, pending.clone()));
                    pending
                }
            }
        };
        pending.await
    }

    /// `true` while a refresh is on the wire.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn spawn_refresh(&self, id: u64, refresh_token: String) -> PendingRefresh {
        let transport = Arc::clone(&self.transport);
        let tokens = self.tokens.clone();
        let url = self.refresh_url.clone();
        let slot = Arc::clone(&self.in_flight);

        let task = tokio::spawn(async move {
            let outcome = request_new_tokens(transport.as_ref(), &tokens, url, refresh_token).await;
            let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if current.as_ref().is_some_and(|(active, _)| *active == id) {
                *current = None;
            }
            outcome
        });

        task.map(|joined| joined.unwrap_or(false)).boxed().shared()
    }
}

async fn request_new_tokens(
    transport: &dyn HttpTransport,
    tokens: &TokenStore,
    url: String,
    refresh_token: String,
) -> bool {
    let body = match serde_json::to_value(RefreshTokenRequest { refresh_token }) {
        Ok(body) => body,
        Err(e) => {
            warn!("Token refresh failed: {e}");
            return false;
        }
    };
    let headers = match request_headers(true, None) {
        Ok(headers) => headers,
        Err(e) => {
            warn!("Token refresh failed: {e}");
            return false;
        }
    };
    let request = HttpRequest { method: Method::POST, url, headers, body: Some(RequestBody::Json(body)) };

    let response = match transport.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Token refresh request failed: {e}");
            return false;
        }
    };
    if !response.is_success() {
        warn!(status = response.status, "Token refresh rejected");
        return false;
    }

    let pair = serde_json::from_str::<TokenResponse>(&response.body)
        .ok()
        .and_then(TokenResponse::into_tokens);
    match pair {
        Some(pair) => {
            tokens.set_tokens(pair);
            info!("Access token refreshed");
            true
        }
        None => {
            warn!("Token refresh response did not contain both tokens");
            false
        }
    }
}
