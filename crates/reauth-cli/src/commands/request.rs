//! Request command implementation.

use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use reauth_core::{Method, RequestDescriptor};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the API base URL (e.g., /tasks)
    pub path: String,

    /// JSON request body (use - for stdin)
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Send without credentials
    #[arg(long)]
    pub public: bool,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(args: RequestArgs, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;

    let mut request = RequestDescriptor::new(args.method, &args.path);
    if let Some(data) = &args.data {
        request = request.body(read_body(data)?);
    }
    if args.public {
        request = request.public();
    }
    if let Some(secs) = args.timeout {
        request = request.timeout(Duration::from_secs(secs));
    }

    let reply = session
        .dispatch(&request)
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;

    output::reply(&reply)
}

fn read_body(data: &str) -> Result<Value> {
    if data == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")
    } else {
        serde_json::from_str(data).context("Invalid JSON in --data")
    }
}
