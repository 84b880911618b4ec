//! reauth-http - HTTP transport for reauth sessions, built on reqwest.
//!
//! ```no_run
//! use std::sync::Arc;
//! use reauth_core::{MemoryStore, RequestDescriptor};
//! use reauth_http::ClientConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let session = config.session_builder(Arc::new(MemoryStore::new()))?.build()?;
//! let tasks = session.dispatch(&RequestDescriptor::get("/tasks")).await?;
//! println!("{}", String::from_utf8_lossy(tasks.bytes()));
//! # Ok(())
//! # }
//! ```

mod client;
mod config;

pub use client::HttpTransport;
pub use config::{ClientConfig, ConfigError, DEFAULT_API_URL};
