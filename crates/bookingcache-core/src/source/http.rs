//! HTTP fetch source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

use super::BookingSource;
use crate::error::BookingError;
use crate::models::BookingRecord;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches a booking with a GET request against a fixed URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpBookingSource {
    client: Client,
    url: String,
}

impl HttpBookingSource {
    pub fn new(url: impl Into<String>) -> Result<Self, BookingError> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, BookingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Map non-success statuses to errors, reading the body for context.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, BookingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(%status, "Booking request failed");
        Err(BookingError::from_status(status, &body))
    }
}

#[async_trait]
impl BookingSource for HttpBookingSource {
    async fn fetch_booking(&self) -> Result<BookingRecord, BookingError> {
        debug!(url = %self.url, "Fetching booking");

        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| BookingError::Parsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let source = HttpBookingSource::with_timeout(
            "http://127.0.0.1:9/booking.json",
            Duration::from_millis(500),
        )
        .unwrap();

        match source.fetch_booking().await {
            Err(BookingError::Network(_)) => {}
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
