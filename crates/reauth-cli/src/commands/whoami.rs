//! Whoami command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;

    session
        .credentials()
        .context("Failed to read stored credentials")?
        .context("No active session. Run 'reauth login' first.")?;

    match session.current_user() {
        Some(user) => output::identity(&user, Utc::now()),
        None => output::success("Logged in (access token carries no readable identity)"),
    }

    Ok(())
}
