use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::BookingRecord;

/// Consider a cache entry stale five minutes after it was written.
/// Stale entries are still served but trigger a background refresh.
pub const STALE_THRESHOLD_SECONDS: f64 = 300.0;

/// Current wall-clock time as fractional epoch seconds.
pub fn now_epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// A booking record plus the metadata needed to judge its freshness.
///
/// Freshness is never stored: `is_expired` and `is_stale` are recomputed
/// from the clock on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub record: BookingRecord,
    pub cached_at: f64,
    pub expires_at: f64,
}

impl CacheEntry {
    /// Wrap a record, stamping it with the current time.
    pub fn new(record: BookingRecord) -> Self {
        Self::at(record, now_epoch_seconds())
    }

    /// Wrap a record as if cached at `cached_at`.
    ///
    /// The hard expiry adds `duration_minutes` to the timestamp as a number
    /// of *seconds*. This mirrors the upstream service's unit convention and
    /// is kept until the product side confirms minutes were intended.
    pub fn at(record: BookingRecord, cached_at: f64) -> Self {
        let expires_at = cached_at + record.duration_minutes as f64;
        Self {
            record,
            cached_at,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_epoch_seconds())
    }

    pub fn is_expired_at(&self, now: f64) -> bool {
        now > self.expires_at
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(now_epoch_seconds())
    }

    pub fn is_stale_at(&self, now: f64) -> bool {
        now - self.cached_at > STALE_THRESHOLD_SECONDS
    }

    /// Neither expired nor stale.
    pub fn is_fresh(&self) -> bool {
        let now = now_epoch_seconds();
        !self.is_expired_at(now) && !self.is_stale_at(now)
    }

    /// The write time as a UTC timestamp.
    pub fn cached_at_time(&self) -> DateTime<Utc> {
        let micros = (self.cached_at * 1_000_000.0).round() as i64;
        DateTime::from_timestamp_micros(micros).unwrap_or_default()
    }

    pub fn age_minutes(&self) -> i64 {
        ((now_epoch_seconds() - self.cached_at) / 60.0).floor() as i64
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration_minutes: i64) -> BookingRecord {
        BookingRecord {
            ship_reference: "ABCDEF".to_string(),
            ship_token: "TOKEN".to_string(),
            can_issue_ticket_checking: false,
            expiry_timestamp: "1722409261".to_string(),
            duration_minutes,
            segments: Vec::new(),
        }
    }

    #[test]
    fn test_expiry_adds_duration_as_seconds() {
        let entry = CacheEntry::at(record(2430), 1_000.0);
        assert_eq!(entry.expires_at, 3_430.0);
    }

    #[test]
    fn test_fresh_entry() {
        let entry = CacheEntry::new(record(2430));
        assert!(!entry.is_expired());
        assert!(!entry.is_stale());
        assert!(entry.is_fresh());
        assert_eq!(entry.age_display(), "just now");
    }

    #[test]
    fn test_stale_but_not_expired() {
        let now = now_epoch_seconds();
        let mut entry = CacheEntry::at(record(0), now - 400.0);
        entry.expires_at = now + 1_000.0;
        assert!(entry.is_stale_at(now));
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_fresh());
    }

    #[test]
    fn test_stale_boundary() {
        let entry = CacheEntry::at(record(10_000), 0.0);
        assert!(!entry.is_stale_at(300.0));
        assert!(entry.is_stale_at(300.5));
    }

    #[test]
    fn test_expired() {
        let entry = CacheEntry::at(record(60), 0.0);
        assert!(!entry.is_expired_at(60.0));
        assert!(entry.is_expired_at(61.0));
    }

    #[test]
    fn test_age_display() {
        let now = now_epoch_seconds();
        assert_eq!(CacheEntry::at(record(0), now - 5.0 * 60.0 - 1.0).age_display(), "5m ago");
        assert_eq!(CacheEntry::at(record(0), now - 2.0 * 3600.0 - 1.0).age_display(), "2h ago");
        assert_eq!(CacheEntry::at(record(0), now - 3.0 * 86400.0 - 1.0).age_display(), "3d ago");
    }

    #[test]
    fn test_cached_at_time() {
        let entry = CacheEntry::at(record(0), 1_722_409_261.5);
        assert_eq!(entry.cached_at_time().timestamp(), 1_722_409_261);
        assert_eq!(entry.cached_at_time().timestamp_subsec_millis(), 500);
    }
}
