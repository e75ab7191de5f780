// src/core/net.rs

// One-shot HTTPS GET (no retry)

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::consts::USER_AGENT;
use crate::error::FetchError;

pub fn client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(FetchError::from)
}

pub fn http_get(url: &str) -> Result<String, FetchError> {
    let resp = client(Duration::from_secs(15))?.get(url).send()?;

    let status = resp.status();
    debug!("GET {} -> {}", url, status);
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }
    Ok(resp.text()?)
}
