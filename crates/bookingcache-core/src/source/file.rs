//! Fetch source that reads a booking JSON document from disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::BookingSource;
use crate::error::BookingError;
use crate::models::BookingRecord;

pub struct FileBookingSource {
    path: PathBuf,
}

impl FileBookingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BookingSource for FileBookingSource {
    async fn fetch_booking(&self) -> Result<BookingRecord, BookingError> {
        debug!(path = %self.path.display(), "Reading booking file");

        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BookingError::Network(format!(
                "Booking file {} not readable: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| BookingError::Parsing(e.to_string()))
    }
}
