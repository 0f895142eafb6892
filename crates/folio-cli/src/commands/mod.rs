//! Command implementations.
//!
//! Results are printed to stdout as pretty JSON; diagnostics go to stderr
//! through `tracing`.

mod auth;
mod resources;

use folio_client::SessionManager;
use serde::Serialize;

use crate::cli::{Commands, ResumeAction};

pub async fn execute(session: &SessionManager, command: Commands) -> anyhow::Result<()> {
    let api = session.api();
    match command {
        Commands::Login(args) => auth::login(session, args).await,
        Commands::Signup(args) => auth::signup(session, args).await,
        Commands::Logout => auth::logout(session).await,
        Commands::Whoami => auth::whoami(session),
        Commands::Refresh => auth::refresh(session).await,
        Commands::Projects(action) => resources::run(api.projects(), action).await,
        Commands::Experiences(action) => resources::run(api.experiences(), action).await,
        Commands::Educations(action) => resources::run(api.educations(), action).await,
        Commands::Resumes(ResumeAction::Common(action)) => resources::run(api.resumes(), action).await,
        Commands::Resumes(ResumeAction::Upload { path }) => resources::upload_resume(api.resumes(), &path).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
