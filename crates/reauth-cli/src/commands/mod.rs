//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod refresh;
pub mod request;
pub mod signup;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Cli, Commands};

pub async fn handle(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::Login(args) => login::run(args, &global).await,
        Commands::Signup(args) => signup::run(args, &global).await,
        Commands::Logout(args) => logout::run(args, &global).await,
        Commands::Whoami(args) => whoami::run(args, &global).await,
        Commands::Refresh(args) => refresh::run(args, &global).await,
        Commands::Request(args) => request::run(args, &global).await,
    }
}
