//! Wire models for the portfolio API.
//!
//! Field names are camelCase on the wire; absent optional fields are
//! skipped when serializing so partial drafts stay partial.

pub mod auth;
pub mod page;
pub mod portfolio;

pub use auth::*;
pub use page::*;
pub use portfolio::*;
