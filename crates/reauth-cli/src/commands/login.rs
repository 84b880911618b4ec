//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use reauth_core::Credentials;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "REAUTH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;
    let credentials = Credentials::new(&args.email, &args.password);

    output::progress("Logging in...");

    session
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::signed_in(session.current_user().as_ref(), &args.email);

    Ok(())
}
