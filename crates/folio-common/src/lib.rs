//! # folio-common
//!
//! Configuration and wire models shared by the Folio client crates.
//! No I/O beyond reading configuration, no business logic.

pub mod config;
pub mod models;
