use thiserror::Error;

/// Errors surfaced by the booking cache, fetch sources and orchestrator.
///
/// Clone + PartialEq so the error can be published on the state surface
/// and compared by subscribers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Network Error: {0}")]
    Network(String),

    #[error("Parsing Error: {0}")]
    Parsing(String),

    #[error("Cache Error: {0}")]
    Cache(String),

    #[error("Data has expired")]
    ExpiredData,

    #[error("No data available")]
    NoData,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl BookingError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Classify a non-success HTTP status as a network failure.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        BookingError::Network(format!("Status {}: {}", status, Self::truncate_body(body)))
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BookingError::Parsing(err.to_string())
        } else {
            BookingError::Network(err.to_string())
        }
    }
}
