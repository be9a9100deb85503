//! Page fetching over HTTP.
//!
//! This module retrieves the raw HTML for a user-submitted URL. Fetch
//! failures (network errors, timeouts, non-success statuses) are surfaced
//! here, before the extractor ever runs; the extractor only sees documents
//! that arrived intact.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{PostprepError, Result};

/// HTTP client configuration for fetching web pages.
///
/// Controls timeout and user agent settings for page requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Postprep/0.2; +https://github.com/stormlightlabs/postprep)"
                .to_string(),
        }
    }
}

/// Fetches the HTML of a web page.
///
/// Performs an HTTP GET with a browser-like User-Agent, follows redirects,
/// and returns the decoded response body. A response outside the 2xx range
/// is an error ([`PostprepError::FetchStatus`]); callers report it instead
/// of running extraction over an error page.
pub async fn fetch_page(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| PostprepError::InvalidUrl(e.to_string()))?;

    if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
        return Err(PostprepError::InvalidUrl(
            "URL must include a scheme (http:// or https://)".to_string(),
        ));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(PostprepError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PostprepError::Timeout { timeout: config.timeout }
            } else {
                PostprepError::HttpError(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, url, "page fetch returned non-success status");
        return Err(PostprepError::FetchStatus { status: status.as_u16(), url: url.to_string() });
    }

    let content = response.text().await?;

    Ok(content)
}
