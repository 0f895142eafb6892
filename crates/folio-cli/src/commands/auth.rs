//! Session commands.

use anyhow::{bail, Context};
use folio_client::SessionManager;
use serde_json::json;

use super::print_json;
use crate::cli::{LoginArgs, SignupArgs};

pub async fn login(session: &SessionManager, args: LoginArgs) -> anyhow::Result<()> {
    let user = session
        .try_login(&args.email, &args.password)
        .await
        .context("login failed")?;
    tracing::info!(user_id = %user.id, "Logged in");
    print_json(&user)
}

pub async fn signup(session: &SessionManager, args: SignupArgs) -> anyhow::Result<()> {
    let user = session
        .try_signup(&args.name, &args.email, &args.password)
        .await
        .context("signup failed")?;
    tracing::info!(user_id = %user.id, "Signed up");
    print_json(&user)
}

pub async fn logout(session: &SessionManager) -> anyhow::Result<()> {
    session.logout().await;
    println!("Logged out");
    Ok(())
}

pub fn whoami(session: &SessionManager) -> anyhow::Result<()> {
    let Some(user) = session.current_user() else {
        bail!("not logged in");
    };
    print_json(&json!({
        "user": user,
        "loginTime": session.login_time().map(|t| t.to_rfc3339()),
    }))
}

pub async fn refresh(session: &SessionManager) -> anyhow::Result<()> {
    if !session.api().refresher().refresh().await {
        bail!("token refresh failed; log in again");
    }
    println!("Tokens refreshed");
    Ok(())
}
