use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::store::{decode, encode};
use super::{BookingCache, CacheEntry};
use crate::error::BookingError;
use crate::models::BookingRecord;

/// In-process cache store holding the serialized entry in one slot.
///
/// Entries go through the same JSON encoding as the file store so that
/// corrupt contents behave identically.
#[derive(Debug, Default)]
pub struct MemoryBookingCache {
    slot: Mutex<Option<String>>,
}

impl MemoryBookingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with a prebuilt entry, keeping its timestamps.
    pub fn with_entry(entry: &CacheEntry) -> Result<Self, BookingError> {
        let cache = Self::new();
        *cache.slot() = Some(encode(entry)?);
        Ok(cache)
    }

    /// Replace the slot contents with raw text, bypassing encoding.
    pub fn put_raw(&self, contents: impl Into<String>) {
        *self.slot() = Some(contents.into());
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookingCache for MemoryBookingCache {
    fn save(&self, record: &BookingRecord) -> Result<(), BookingError> {
        let contents = encode(&CacheEntry::new(record.clone()))?;
        *self.slot() = Some(contents);
        debug!("Saved booking data to memory cache");
        Ok(())
    }

    fn load(&self) -> Result<Option<CacheEntry>, BookingError> {
        match self.slot().as_deref() {
            Some(contents) => decode(contents).map(Some),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<(), BookingError> {
        *self.slot() = None;
        Ok(())
    }
}
