//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Folio: manage your portfolio content from the terminal.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about, propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./folio.toml if present)
    #[arg(short, long, env = "FOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session locally
    Login(LoginArgs),

    /// Create an account, then log in
    Signup(SignupArgs),

    /// End the session (always succeeds locally)
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Exchange the refresh token for a new token pair
    Refresh,

    /// Manage projects
    #[command(subcommand)]
    Projects(ResourceAction),

    /// Manage work experience
    #[command(subcommand)]
    Experiences(ResourceAction),

    /// Manage education entries
    #[command(subcommand)]
    Educations(ResourceAction),

    /// Manage resume files
    #[command(subcommand)]
    Resumes(ResumeAction),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "FOLIO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(short, long)]
    pub name: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "FOLIO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum ResourceAction {
    /// List one page
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        size: u32,
    },

    /// Show one entry
    Get { id: i64 },

    /// Create an entry from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Replace an entry with the contents of a JSON file
    Update {
        id: i64,

        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete an entry
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ResumeAction {
    #[command(flatten)]
    Common(ResourceAction),

    /// Upload a resume file (PDF, DOCX, ...)
    Upload { path: PathBuf },
}
