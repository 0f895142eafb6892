//! Access/refresh token persistence.

use std::sync::Arc;

use folio_common::models::StoredTokens;

use crate::storage::Storage;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Typed view over the two token keys of a [`Storage`].
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Store both tokens in a single storage write.
    pub fn set_tokens(&self, tokens: StoredTokens) {
        self.storage.set_many(&[
            (ACCESS_TOKEN_KEY, tokens.access_token),
            (REFRESH_TOKEN_KEY, tokens.refresh_token),
        ]);
    }

    pub fn clear_tokens(&self) {
        self.storage.remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY]);
    }

    /// The backend shared with the session manager.
    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print token values.
        f.debug_struct("TokenStore")
            .field("available", &self.storage.is_available())
            .field("has_access_token", &self.access_token().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, UnavailableStorage};

    fn pair(access: &str, refresh: &str) -> StoredTokens {
        StoredTokens { access_token: access.into(), refresh_token: refresh.into() }
    }

    #[test]
    fn set_and_clear() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.access_token(), None);

        store.set_tokens(pair("a1", "r1"));
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));

        store.clear_tokens();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);

        // Clearing twice is fine.
        store.clear_tokens();
    }

    #[test]
    fn clones_share_state() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        let other = store.clone();
        store.set_tokens(pair("a2", "r2"));
        assert_eq!(other.refresh_token().as_deref(), Some("r2"));
    }

    #[test]
    fn unavailable_storage_is_a_no_op() {
        let store = TokenStore::new(Arc::new(UnavailableStorage));
        store.set_tokens(pair("a", "r"));
        assert_eq!(store.access_token(), None);
        store.clear_tokens();
    }

    #[test]
    fn debug_output_hides_tokens() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        store.set_tokens(pair("secret-access", "secret-refresh"));
        let printed = format!("{store:?}");
        assert!(!printed.contains("secret"));
    }
}
