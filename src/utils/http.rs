// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Load a page as text.
///
/// Transport errors and non-success statuses are reported as
/// [`AppError::Navigation`], since the document never loaded.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::navigation(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::navigation(url, format!("status {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| AppError::navigation(url, e))
}

/// GET a JSON document, requiring exactly `200 OK`.
///
/// Returns the raw body; decoding is left to the caller.
pub async fn fetch_json_body(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    if response.status() != StatusCode::OK {
        return Err(AppError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    Ok(response.text().await?)
}
