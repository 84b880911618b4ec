//! Refresh command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;

    session
        .credentials()
        .context("Failed to read stored credentials")?
        .context("No active session. Run 'reauth login' first.")?;

    output::progress("Refreshing session...");

    session
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    if let Some(user) = session.current_user() {
        output::identity(&user, Utc::now());
    }

    Ok(())
}
