//! Session construction for CLI commands.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use reauth_core::{ApiUrl, RequestError, Session, SessionObserver};
use reauth_file::FileStore;
use reauth_http::ClientConfig;

use crate::cli::GlobalArgs;
use crate::output;

/// Prints a prompt when the session ends during a command.
struct CliObserver;

impl SessionObserver for CliObserver {
    fn request_failed(&self, error: &RequestError) {
        tracing::debug!(error = %error, "Request failed");
    }

    fn session_ended(&self) {
        output::session_ended();
    }
}

/// Get the default credentials file path.
fn default_store_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "reauth").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("credentials.json"))
}

/// Open the session described by the global options.
///
/// Credentials left by a previous command are picked up from the store.
pub fn open(global: &GlobalArgs) -> Result<Session> {
    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(url) = &global.api_url {
        config.base_url = ApiUrl::new(url).context("Invalid API URL")?;
    }

    let path = match &global.store {
        Some(path) => path.clone(),
        None => default_store_path()?,
    };
    tracing::debug!(store = %path.display(), api = %config.base_url, "Opening session");

    let session = config
        .session_builder(Arc::new(FileStore::new(path)))
        .context("Failed to create HTTP client")?
        .observer(Arc::new(CliObserver))
        .build()
        .context("Failed to read stored credentials")?;

    Ok(session)
}
