//! Observable state surface for booking data.
//!
//! Four fields are published independently through `watch` channels:
//! the current record, the loading flag, the last error and the time of the
//! last update. Subscribers see each field on its own schedule and must not
//! assume that a change to one is accompanied by a change to another.
//!
//! Every mutation goes through `BookingState`, which serializes publishers
//! on one lock so that a record and its timestamp from one refresh are never
//! interleaved with another refresh's pair.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::BookingError;
use crate::models::BookingRecord;

pub struct BookingState {
    record: watch::Sender<Option<BookingRecord>>,
    is_loading: watch::Sender<bool>,
    error: watch::Sender<Option<BookingError>>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    publish_lock: Mutex<()>,
}

impl Default for BookingState {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingState {
    pub fn new() -> Self {
        Self {
            record: watch::Sender::new(None),
            is_loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
            last_updated: watch::Sender::new(None),
            publish_lock: Mutex::new(()),
        }
    }

    /// Receivers for all four fields. Each starts at the current value.
    pub fn subscribe(&self) -> BookingSubscriber {
        BookingSubscriber {
            record: self.record.subscribe(),
            is_loading: self.is_loading.subscribe(),
            error: self.error.subscribe(),
            last_updated: self.last_updated.subscribe(),
        }
    }

    pub fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            record: self.record.borrow().clone(),
            is_loading: *self.is_loading.borrow(),
            error: self.error.borrow().clone(),
            last_updated: *self.last_updated.borrow(),
        }
    }

    /// Publish a complete record along with the time it was obtained.
    pub(crate) fn publish_record(&self, record: BookingRecord, updated_at: DateTime<Utc>) {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.record.send_replace(Some(record));
        self.last_updated.send_replace(Some(updated_at));
    }

    pub(crate) fn clear_record(&self) {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.record.send_replace(None);
        self.last_updated.send_replace(None);
    }

    /// Start a foreground load: loading on, previous error cleared.
    pub(crate) fn begin_loading(&self) {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.is_loading.send_replace(true);
        self.error.send_replace(None);
    }

    pub(crate) fn finish_loading(&self) {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.is_loading.send_replace(false);
    }

    pub(crate) fn publish_error(&self, error: BookingError) {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.error.send_replace(Some(error));
    }
}

/// One receiver per published field.
#[derive(Debug, Clone)]
pub struct BookingSubscriber {
    pub record: watch::Receiver<Option<BookingRecord>>,
    pub is_loading: watch::Receiver<bool>,
    pub error: watch::Receiver<Option<BookingError>>,
    pub last_updated: watch::Receiver<Option<DateTime<Utc>>>,
}

/// Point-in-time copy of the published fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSnapshot {
    pub record: Option<BookingRecord>,
    pub is_loading: bool,
    pub error: Option<BookingError>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl BookingSnapshot {
    pub fn status_description(&self) -> String {
        if self.is_loading {
            "Loading...".to_string()
        } else if let Some(ref error) = self.error {
            format!("Error: {}", error)
        } else if let Some(updated) = self.last_updated {
            format!("Last updated: {}", updated.format("%Y-%m-%d %H:%M"))
        } else {
            "No data available".to_string()
        }
    }

    pub fn has_valid_data(&self) -> bool {
        self.record.is_some() && self.error.is_none()
    }

    pub fn segments_count(&self) -> usize {
        self.record.as_ref().map(|r| r.segments.len()).unwrap_or(0)
    }

    pub fn ship_reference(&self) -> String {
        self.record
            .as_ref()
            .map(|r| r.ship_reference.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn duration_description(&self) -> String {
        self.record
            .as_ref()
            .map(BookingRecord::duration_display)
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> BookingRecord {
        BookingRecord {
            ship_reference: "ABCDEF".to_string(),
            ship_token: "TOKEN".to_string(),
            can_issue_ticket_checking: false,
            expiry_timestamp: "1722409261".to_string(),
            duration_minutes: 125,
            segments: Vec::new(),
        }
    }

    #[test]
    fn test_initial_snapshot_is_empty() {
        let state = BookingState::new();
        let snapshot = state.snapshot();
        assert_eq!(snapshot, BookingSnapshot::default());
        assert_eq!(snapshot.status_description(), "No data available");
        assert_eq!(snapshot.ship_reference(), "N/A");
        assert_eq!(snapshot.duration_description(), "N/A");
        assert_eq!(snapshot.segments_count(), 0);
    }

    #[test]
    fn test_publish_record_sets_record_and_timestamp() {
        let state = BookingState::new();
        let at = Utc.with_ymd_and_hms(2024, 7, 31, 6, 21, 0).unwrap();
        state.publish_record(record(), at);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.record, Some(record()));
        assert_eq!(snapshot.last_updated, Some(at));
        assert!(snapshot.has_valid_data());
        assert_eq!(snapshot.duration_description(), "2h 5m");
        assert_eq!(snapshot.status_description(), "Last updated: 2024-07-31 06:21");

        state.clear_record();
        assert_eq!(state.snapshot().record, None);
        assert_eq!(state.snapshot().last_updated, None);
    }

    #[test]
    fn test_begin_loading_clears_error() {
        let state = BookingState::new();
        state.publish_error(BookingError::NoData);
        assert_eq!(state.snapshot().status_description(), "Error: No data available");

        state.begin_loading();
        let snapshot = state.snapshot();
        assert!(snapshot.is_loading);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.status_description(), "Loading...");

        state.finish_loading();
        assert!(!state.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_subscribers_see_field_changes() {
        let state = BookingState::new();
        let mut subscriber = state.subscribe();

        state.publish_error(BookingError::Network("x".to_string()));
        subscriber.error.changed().await.unwrap();
        assert_eq!(
            *subscriber.error.borrow_and_update(),
            Some(BookingError::Network("x".to_string()))
        );
        assert!(!subscriber.record.has_changed().unwrap());
    }
}
