use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::CacheEntry;
use crate::error::BookingError;
use crate::models::BookingRecord;

/// File name of the single cache slot inside the cache directory.
const CACHE_FILE: &str = "cached_booking_data.json";

/// A single-slot store for the cached booking.
pub trait BookingCache: Send + Sync {
    /// Stamp `record` with the current time and overwrite the slot.
    fn save(&self, record: &BookingRecord) -> Result<(), BookingError>;

    /// `Ok(None)` if the slot is empty. Undecodable contents are an error,
    /// never reported as absent.
    fn load(&self) -> Result<Option<CacheEntry>, BookingError>;

    /// Empty the slot. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), BookingError>;

    /// True only for a loadable entry that is neither expired nor stale.
    fn is_valid(&self) -> bool {
        let valid = match self.load() {
            Ok(Some(entry)) => entry.is_fresh(),
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "Failed to load cache for validity check");
                false
            }
        };
        debug!(valid, "Cache validity check");
        valid
    }
}

pub(crate) fn encode(entry: &CacheEntry) -> Result<String, BookingError> {
    serde_json::to_string_pretty(entry)
        .map_err(|e| BookingError::Cache(format!("Failed to encode data: {}", e)))
}

pub(crate) fn decode(contents: &str) -> Result<CacheEntry, BookingError> {
    serde_json::from_str(contents)
        .map_err(|e| BookingError::Cache(format!("Failed to decode data: {}", e)))
}

/// Cache store backed by one JSON file.
pub struct FileBookingCache {
    cache_dir: PathBuf,
}

impl FileBookingCache {
    pub fn new(cache_dir: PathBuf) -> Result<Self, BookingError> {
        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            BookingError::Cache(format!(
                "Failed to create cache directory {}: {}",
                cache_dir.display(),
                e
            ))
        })?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }
}

impl BookingCache for FileBookingCache {
    fn save(&self, record: &BookingRecord) -> Result<(), BookingError> {
        let contents = encode(&CacheEntry::new(record.clone()))?;
        std::fs::write(self.cache_path(), contents).map_err(|e| {
            warn!(error = %e, "Failed to save booking data");
            BookingError::Cache(format!("Failed to write cache file: {}", e))
        })?;
        info!("Saved booking data to cache");
        Ok(())
    }

    fn load(&self) -> Result<Option<CacheEntry>, BookingError> {
        let contents = match std::fs::read_to_string(self.cache_path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cached booking data found");
                return Ok(None);
            }
            Err(e) => {
                return Err(BookingError::Cache(format!(
                    "Failed to read cache file: {}",
                    e
                )))
            }
        };

        let entry = decode(&contents).inspect_err(|e| {
            warn!(error = %e, "Failed to decode cached booking data");
        })?;
        debug!("Loaded cached booking data");
        Ok(Some(entry))
    }

    fn clear(&self) -> Result<(), BookingError> {
        match std::fs::remove_file(self.cache_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BookingError::Cache(format!(
                    "Failed to remove cache file: {}",
                    e
                )))
            }
        }
        info!("Cleared cached booking data");
        Ok(())
    }
}
