// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Response;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Append path segments to a base URL, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("base URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Read a JSON body, turning non-success statuses into [`AppError::Status`].
pub async fn read_json(endpoint: &str, response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::status(endpoint, status.as_u16(), body));
    }
    Ok(response.json::<Value>().await?)
}
