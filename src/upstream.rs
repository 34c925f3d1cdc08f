// ==============================================================================
// upstream.rs - NASA APOD Upstream Client
// ==============================================================================
// Description: Fetch and reshape Astronomy Picture of the Day records
// Author: Matt Barham
// Created: 2026-07-29
// Modified: 2026-08-03
// Version: 1.0.0
// ==============================================================================

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::models::PictureResponse;

/// Official APOD endpoint; overridable via NASA_APOD_URL for testing
pub const DEFAULT_APOD_URL: &str = "https://api.nasa.gov/planetary/apod";

/// Upstream failure carrying a human-readable message
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UpstreamError(pub String);

/// Raw APOD payload as the upstream API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct ApodPicture {
    pub title: String,
    pub url: String,
    pub date: String,
    pub explanation: String,
    #[serde(default)]
    pub copyright: Option<String>,
    pub media_type: String,
}

impl From<ApodPicture> for PictureResponse {
    fn from(pic: ApodPicture) -> Self {
        Self {
            title: pic.title,
            img: pic.url,
            date: pic.date,
            description: pic.explanation,
            copyright: pic.copyright,
            media_type: pic.media_type,
        }
    }
}

/// Error body the APOD API returns on bad requests or key problems
#[derive(Debug, Deserialize)]
struct ApodErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<ApodErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApodErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the upstream imagery API
pub struct ImageryClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ImageryClient {
    /// Create a new imagery client sharing the process-wide HTTP client
    pub fn new(http: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    /// Fetch the picture of the day, or of a specific date when given.
    ///
    /// Transport failures and non-2xx upstream statuses both surface as
    /// `UpstreamError` with a non-empty message.
    pub async fn fetch_picture(&self, date: Option<NaiveDate>) -> Result<ApodPicture, UpstreamError> {
        let mut request = self
            .http
            .get(&self.base_url)
            .query(&[("api_key", self.api_key.as_str())]);

        if let Some(date) = date {
            request = request.query(&[("date", date.format("%Y-%m-%d").to_string().as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError(format!("imagery API unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Upstream imagery API returned {}: {}", status, body);
            return Err(UpstreamError(upstream_failure_message(status, &body)));
        }

        response
            .json::<ApodPicture>()
            .await
            .map_err(|e| UpstreamError(format!("invalid imagery API response: {e}")))
    }
}

/// Pull the most specific message out of an upstream error body, falling back
/// to the status line so the message is never empty
fn upstream_failure_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApodErrorBody>(body) {
        if let Some(message) = parsed
            .error
            .and_then(|e| e.message)
            .or(parsed.msg)
            .filter(|m| !m.trim().is_empty())
        {
            return format!("imagery API error: {message}");
        }
    }

    format!("imagery API returned status {status}")
}
