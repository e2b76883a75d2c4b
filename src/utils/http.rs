// src/utils/http.rs

//! HTTP client utilities.

use reqwest::Client;

use crate::error::{AppError, Result};

/// Create a configured asynchronous HTTP client.
///
/// Per-request time budgets are applied by the caller.
pub fn create_async_client(user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Pick one non-blank user agent at random.
pub fn pick_user_agent(user_agents: &[String]) -> Result<&str> {
    let usable: Vec<&str> = user_agents
        .iter()
        .map(|ua| ua.trim())
        .filter(|ua| !ua.is_empty())
        .collect();
    if usable.is_empty() {
        return Err(AppError::config("user_agents has no usable entry"));
    }
    Ok(usable[fastrand::usize(..usable.len())])
}
