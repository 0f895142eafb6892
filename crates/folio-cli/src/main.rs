//! # folio
//!
//! Command-line dashboard for the portfolio CMS: log in once, then list,
//! create, update and delete projects, experience, education and resumes.
//! The session (tokens, user, login time) lives in the configured storage
//! file and is refreshed transparently when the access token expires.

mod cli;
mod commands;

use clap::Parser;
use folio_client::{ApiClient, SessionManager};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = folio_common::config::init(cli.config.as_deref())?;

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(base_url = %config.api.base_url, storage = %config.storage.path, "Folio v{}", env!("CARGO_PKG_VERSION"));

    let session = SessionManager::new(ApiClient::from_config(&config)?);
    commands::execute(&session, cli.command).await
}
