//! API-token storage.
//!
//! Tokens live in the operating-system keyring under a configurable
//! service id. When no token is stored yet, `obtain_token` prompts on
//! stdin and stores the answer before continuing.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use keyring::Entry;
use log::warn;

use crate::config::Config;

const TOKEN_USER: &str = "API_TOKEN";

pub fn get_api_token(service: &str) -> Result<Option<String>> {
    let entry = Entry::new(service, TOKEN_USER).context("keyring unavailable")?;
    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e).context("keyring read failed"),
    }
}

pub fn set_api_token(service: &str, token: &str) -> Result<()> {
    let entry = Entry::new(service, TOKEN_USER).context("keyring unavailable")?;
    entry.set_password(token).context("keyring write failed")
}

/// First-run interactive token prompt.
pub fn setup(service: &str) -> Result<()> {
    print!("Please enter your API token: ");
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().lock().read_line(&mut token)?;
    set_api_token(service, token.trim())
}

/// Resolve the API token: the configured environment variable first, then
/// the keyring, prompting until a token is stored.
pub fn obtain_token(config: &Config) -> Result<String> {
    if let Ok(token) = std::env::var(&config.token_env) {
        if !token.is_empty() {
            return Ok(token);
        }
    }
    loop {
        if let Some(token) = get_api_token(&config.service_id)? {
            return Ok(token);
        }
        warn!(
            "Todoist API token not found for {} application.",
            config.service_id
        );
        setup(&config.service_id)?;
    }
}
