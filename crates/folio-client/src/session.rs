//! Session lifecycle: login, signup, logout and the current identity.
//!
//! Login and signup report failures as `false` plus a logged diagnostic;
//! the `try_*` variants return the underlying error for callers that want
//! to show it.

use chrono::{DateTime, Utc};
use folio_common::models::{LoginRequest, RefreshTokenRequest, SessionUser, SignupRequest, TokenResponse};
use tracing::{debug, info, warn};

use crate::claims::{self, IdentityFallback};
use crate::dispatcher::{ApiClient, ApiRequest};
use crate::error::{FolioError, Result};
use crate::tokens::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

pub const USER_KEY: &str = "user";
pub const LOGIN_TIME_KEY: &str = "loginTime";

#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.try_login(email, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "Logged in");
                true
            }
            Err(e) => {
                warn!("Login failed: {e}");
                false
            }
        }
    }

    pub async fn try_login(&self, email: &str, password: &str) -> Result<SessionUser> {
        self.establish(email, password, None).await
    }

    /// Register, then log in with the same credentials.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> bool {
        match self.try_signup(name, email, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "Signed up");
                true
            }
            Err(e) => {
                warn!("Signup failed: {e}");
                false
            }
        }
    }

    pub async fn try_signup(&self, name: &str, email: &str, password: &str) -> Result<SessionUser> {
        let body = SignupRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        self.api.send_value(ApiRequest::post(SIGNUP_PATH).public().json(&body)?).await?;
        self.establish(email, password, Some(name)).await
    }

    async fn establish(&self, email: &str, password: &str, name: Option<&str>) -> Result<SessionUser> {
        let body = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let response: Option<TokenResponse> =
            self.api.send(ApiRequest::post(LOGIN_PATH).public().json(&body)?).await?;
        let tokens = response
            .and_then(TokenResponse::into_tokens)
            .ok_or(FolioError::MissingTokens)?;

        let access_token = tokens.access_token.clone();
        self.api.tokens().set_tokens(tokens);

        let fallback = IdentityFallback {
            id: None,
            email: Some(email.to_owned()),
            name: name.map(str::to_owned),
        };
        let user = match claims::derive_user(&access_token, &fallback) {
            Ok(user) => user,
            Err(e) => {
                self.api.tokens().clear_tokens();
                return Err(e);
            }
        };

        self.api.tokens().storage().set_many(&[
            (USER_KEY, serde_json::to_string(&user)?),
            (LOGIN_TIME_KEY, Utc::now().to_rfc3339()),
        ]);
        Ok(user)
    }

    /// Tell the server (best effort), then forget everything locally.
    ///
    /// Server-side failures are ignored; the local session is always cleared.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.api.tokens().refresh_token() {
            let outcome = match ApiRequest::post(LOGOUT_PATH)
                .public()
                .json(&RefreshTokenRequest { refresh_token })
            {
                Ok(request) => self.api.send_value(request).await.map(drop),
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                debug!("Server-side logout failed, ignoring: {e}");
            }
        }

        self.api
            .tokens()
            .storage()
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, LOGIN_TIME_KEY]);
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.tokens().access_token().is_some()
    }

    /// The persisted user, or one re-derived from the access token.
    /// `None` once the access token is gone.
    pub fn current_user(&self) -> Option<SessionUser> {
        let access_token = self.api.tokens().access_token()?;
        self.api
            .tokens()
            .storage()
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .or_else(|| claims::derive_user(&access_token, &IdentityFallback::default()).ok())
    }

    pub fn login_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.api.tokens().storage().get(LOGIN_TIME_KEY)?;
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
