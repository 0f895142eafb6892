//! Authenticated client for the Folio portfolio CMS API.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use folio_client::{ApiClient, SessionManager};
//! use folio_common::models::PageRequest;
//!
//! #[tokio::main]
//! async fn main() -> folio_client::Result<()> {
//!     let config = folio_common::config::load().map_err(|e| folio_client::FolioError::Other(e.to_string()))?;
//!     let session = SessionManager::new(ApiClient::from_config(&config)?);
//!
//!     if session.login("me@example.com", "hunter2").await {
//!         let projects = session.api().projects().list(PageRequest::default()).await?;
//!         println!("{} projects", projects.total_elements);
//!     }
//!     Ok(())
//! }
//! ```

pub mod claims;
pub mod dispatcher;
pub mod error;
pub mod refresh;
pub mod resources;
pub mod session;
pub mod storage;
pub mod tokens;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use claims::{Claims, IdentityFallback};
pub use dispatcher::{ApiClient, ApiRequest};
pub use error::{ApiError, FolioError, Result};
pub use refresh::RefreshCoordinator;
pub use session::SessionManager;
pub use storage::{FileStorage, MemoryStorage, Storage, UnavailableStorage};
pub use tokens::TokenStore;
pub use transport::{HttpTransport, ReqwestTransport};
