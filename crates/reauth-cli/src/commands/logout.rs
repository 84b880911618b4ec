//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;

    if session
        .credentials()
        .context("Failed to read stored credentials")?
        .is_none()
    {
        output::success("Not logged in");
        return Ok(());
    }

    session.logout().await;

    output::success("Logged out");
    Ok(())
}
