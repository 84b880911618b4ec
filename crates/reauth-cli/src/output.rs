//! Terminal rendering of session state and API replies.
//!
//! Results go to stdout; progress and session notices go to stderr so that
//! `reauth request ... | jq` only ever sees the reply.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::Value;

use reauth_core::{Claims, Reply};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a progress line while a call is outstanding.
pub fn progress(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Tell the user the session is gone and how to get a new one.
pub fn session_ended() {
    eprintln!(
        "{} Your session has ended. Run 'reauth login' to log in again.",
        "!".yellow()
    );
}

/// Print who a freshly issued credential belongs to.
///
/// Falls back to `email` when the access token carries no readable claims.
pub fn signed_in(user: Option<&Claims>, email: &str) {
    match user {
        Some(user) => field("User", user.display_name()),
        None => field("Email", email),
    }
}

/// Print every identity claim of the current access token.
pub fn identity(user: &Claims, now: DateTime<Utc>) {
    field("User ID", &user.sub);
    if let Some(username) = &user.username {
        field("Username", username);
    }
    if let Some(email) = &user.email {
        field("Email", email);
    }
    if let Some(expiry) = expiry_line(user, now) {
        field("Access expires", &expiry);
    }
}

/// Print a reply body: JSON pretty-printed, anything else verbatim.
pub fn reply(reply: &Reply) -> Result<()> {
    if reply.is_no_content() {
        success("No content");
        return Ok(());
    }
    println!("{}", render_body(reply.bytes())?);
    Ok(())
}

fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

fn expiry_line(user: &Claims, now: DateTime<Utc>) -> Option<String> {
    let expires_at = user.expires_at()?.to_rfc3339();
    if user.is_expired_at(now) {
        Some(format!("{expires_at} (expired, will refresh on next request)"))
    } else {
        Some(expires_at)
    }
}

fn render_body(body: &[u8]) -> Result<String> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Ok(serde_json::to_string_pretty(&value)?),
        Err(_) => Ok(String::from_utf8_lossy(body).into_owned()),
    }
}
