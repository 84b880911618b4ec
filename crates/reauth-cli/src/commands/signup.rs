//! Signup command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use reauth_core::Signup;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Display name for the new account
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "REAUTH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: SignupArgs, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;
    let signup = Signup::new(&args.email, &args.password, &args.username);

    output::progress("Creating account...");

    session
        .signup(&signup)
        .await
        .context("Failed to create account")?;

    output::success("Account created");
    println!();
    match session.current_user() {
        Some(user) => output::identity(&user, Utc::now()),
        None => output::signed_in(None, &args.email),
    }

    Ok(())
}
