//! Best-effort claim extraction from compact JWTs.
//!
//! Only the payload segment is read. Signatures and expiry are **not**
//! checked: the result is display data for the dashboard, never an
//! authorization decision. The server remains the only trust boundary.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use folio_common::models::SessionUser;
use serde_json::{Map, Value};

use crate::error::{FolioError, Result};

/// Standard alphabet after the URL-safe characters are mapped back.
/// Padding is optional and non-canonical trailing bits are tolerated.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Identity claims recognized in an access token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub user_id: Option<String>,
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Option<Vec<String>>,
    pub authorities: Option<Vec<String>>,
}

impl Claims {
    /// Pick the recognized keys out of a decoded payload object.
    pub fn from_object(payload: &Map<String, Value>) -> Self {
        Self {
            user_id: payload.get("userId").and_then(coerce_string),
            sub: payload.get("sub").and_then(coerce_string),
            email: payload.get("email").and_then(coerce_string),
            name: payload.get("name").and_then(coerce_string),
            roles: payload.get("roles").and_then(coerce_roles),
            authorities: payload.get("authorities").and_then(coerce_roles),
        }
    }
}

/// Values the caller already knows, used where the token is silent.
#[derive(Debug, Clone, Default)]
pub struct IdentityFallback {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Decode the payload segment of `token`.
///
/// Returns `None` for anything that is not a dot-separated token whose
/// second segment is base64 (URL-safe or standard) JSON object text.
pub fn decode(token: &str) -> Option<Claims> {
    let segment = token.split('.').nth(1)?.replace('-', "+").replace('_', "/");
    let bytes = PAYLOAD_ENGINE.decode(segment).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(payload) => Some(Claims::from_object(&payload)),
        _ => None,
    }
}

/// Merge token claims with fallback values. Never fails; `id` may be empty.
pub fn merge_identity(claims: Option<&Claims>, fallback: &IdentityFallback) -> SessionUser {
    let claims = claims.cloned().unwrap_or_default();

    let id = first_present([claims.user_id, claims.sub, fallback.id.clone(), fallback.email.clone()])
        .unwrap_or_default();
    let email = first_present([claims.email, fallback.email.clone()]).unwrap_or_default();
    let local_part = email
        .split('@')
        .next()
        .filter(|part| !part.is_empty())
        .map(str::to_owned);
    let name = first_present([claims.name, fallback.name.clone(), local_part]).unwrap_or_default();
    let roles = claims.roles.or(claims.authorities);

    SessionUser { id, email, name, roles }
}

/// Derive the session user for `token`, rejecting identities without an id.
pub fn derive_user(token: &str, fallback: &IdentityFallback) -> Result<SessionUser> {
    let user = merge_identity(decode(token).as_ref(), fallback);
    if user.id.is_empty() {
        return Err(FolioError::IncompleteIdentity);
    }
    Ok(user)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts `["ADMIN"]`, `"ADMIN"`, or Spring-style `[{"authority": "ADMIN"}]`.
fn coerce_roles(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => obj.get("authority").and_then(coerce_string),
                    other => coerce_string(other),
                })
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string()),
    )
}
