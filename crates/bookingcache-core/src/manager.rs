//! Refresh orchestration for booking data.
//!
//! `BookingDataManager` decides on every request whether to serve the cached
//! booking, refresh it in the background, fetch a fresh copy, or fall back to
//! whatever the cache still holds when the fetch fails. Results are delivered
//! through the `BookingState` surface; the returned `BookingDataResult` is a
//! convenience for callers that want the outcome directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{BookingCache, CacheEntry};
use crate::error::BookingError;
use crate::models::BookingRecord;
use crate::source::BookingSource;
use crate::state::{BookingState, BookingSubscriber};

/// Outcome of a single data request.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingDataResult {
    /// Freshly fetched from the source
    Success(BookingRecord),
    /// Served from the cache without fetching. `refreshing` is set when the
    /// entry was stale and a background refresh was started for it.
    Cached {
        record: BookingRecord,
        cached_at: DateTime<Utc>,
        refreshing: bool,
    },
    /// The fetch failed; the state may still carry a cached fallback
    Failure(BookingError),
}

/// Clone is cheap - all collaborators are shared behind Arc.
#[derive(Clone)]
pub struct BookingDataManager {
    cache: Arc<dyn BookingCache>,
    source: Arc<dyn BookingSource>,
    state: Arc<BookingState>,
}

impl BookingDataManager {
    /// Build a manager and publish any non-expired cached booking.
    pub fn new(cache: Arc<dyn BookingCache>, source: Arc<dyn BookingSource>) -> Self {
        let manager = Self {
            cache,
            source,
            state: Arc::new(BookingState::new()),
        };
        manager.load_cached_data_if_available();
        manager
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn subscribe(&self) -> BookingSubscriber {
        self.state.subscribe()
    }

    /// Serve or fetch booking data.
    ///
    /// Without `force_refresh` a non-expired cache entry is published and
    /// returned immediately; if that entry is stale a detached background
    /// refresh is started. Otherwise the source is fetched with the loading
    /// flag raised for the duration.
    pub async fn request_data(&self, force_refresh: bool) -> BookingDataResult {
        debug!(force_refresh, "Booking data requested");

        if !force_refresh {
            if let Some(entry) = self.usable_cache_entry() {
                debug!("Using cached booking data");
                let cached_at = entry.cached_at_time();
                self.state.publish_record(entry.record.clone(), cached_at);

                let refreshing = entry.is_stale();
                if refreshing {
                    info!("Cached booking data is stale, refreshing in background");
                    self.spawn_background_refresh();
                }
                return BookingDataResult::Cached {
                    record: entry.record,
                    cached_at,
                    refreshing,
                };
            }
        }

        self.state.begin_loading();
        let result = self.fetch_and_publish().await;
        self.state.finish_loading();
        result
    }

    /// Always fetch, ignoring the cache.
    pub async fn refresh(&self) -> BookingDataResult {
        self.request_data(true).await
    }

    /// Empty the cache and drop the published record.
    pub fn clear_cache(&self) -> Result<(), BookingError> {
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear booking cache");
            return Err(e);
        }
        self.state.clear_record();
        info!("Booking cache cleared");
        Ok(())
    }

    pub fn is_data_valid(&self) -> bool {
        self.cache.is_valid()
    }

    /// A cached entry that has not passed its hard expiry. Load errors are
    /// treated as a cache miss.
    fn usable_cache_entry(&self) -> Option<CacheEntry> {
        match self.cache.load() {
            Ok(Some(entry)) if !entry.is_expired() => Some(entry),
            Ok(Some(_)) => {
                debug!("Cached booking data has expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load cached booking data");
                None
            }
        }
    }

    async fn fetch_and_publish(&self) -> BookingDataResult {
        match self.source.fetch_booking().await {
            Ok(record) => {
                if let Err(e) = self.cache.save(&record) {
                    warn!(error = %e, "Failed to cache booking data");
                }
                self.state.publish_record(record.clone(), Utc::now());
                info!(ship_reference = %record.ship_reference, "Fetched fresh booking data");
                BookingDataResult::Success(record)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch booking data");
                self.state.publish_error(e.clone());

                match self.cache.load() {
                    Ok(Some(entry)) => {
                        info!("Falling back to cached booking data");
                        let updated_at = entry.cached_at_time();
                        self.state.publish_record(entry.record, updated_at);
                    }
                    Ok(None) => debug!("No cached booking data to fall back to"),
                    Err(cache_err) => {
                        warn!(error = %cache_err, "Cache fallback failed");
                    }
                }
                BookingDataResult::Failure(e)
            }
        }
    }

    /// Fire-and-forget refresh. Never touches the loading flag or the error
    /// field; its only output is a republished record.
    fn spawn_background_refresh(&self) {
        let cache = Arc::clone(&self.cache);
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            match source.fetch_booking().await {
                Ok(record) => {
                    if let Err(e) = cache.save(&record) {
                        warn!(error = %e, "Failed to cache background refresh");
                    }
                    state.publish_record(record, Utc::now());
                    info!("Background refresh completed");
                }
                Err(e) => {
                    warn!(error = %e, "Background refresh failed");
                }
            }
        });
    }

    fn load_cached_data_if_available(&self) {
        match self.cache.load() {
            Ok(Some(entry)) if !entry.is_expired() => {
                debug!("Loading cached booking data on initialization");
                let updated_at = entry.cached_at_time();
                self.state.publish_record(entry.record, updated_at);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to load cached booking data on initialization");
            }
        }
    }
}
