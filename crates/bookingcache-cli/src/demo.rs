//! Demo fetch source.
//!
//! Serves the bundled sample booking after a short delay, fails roughly one
//! request in ten, and randomizes a few fields so refreshes are visible.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::debug;

use bookingcache_core::{BookingError, BookingRecord, BookingSource};

/// Sample payload bundled into the binary
const SAMPLE_BOOKING: &str = include_str!("../data/booking.json");

/// Characters used for generated ship tokens
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const TOKEN_LENGTH: usize = 15;

/// Generated bookings expire one hour after they are served.
const EXPIRY_OFFSET_SECS: i64 = 3600;

/// Maximum random adjustment applied to the duration, in minutes.
const DURATION_JITTER: i64 = 100;

pub struct DemoBookingSource {
    delay: Duration,
    /// One fetch in this many fails; 0 never fails
    failure_one_in: u32,
}

impl DemoBookingSource {
    pub fn new(delay: Duration, failure_one_in: u32) -> Self {
        Self {
            delay,
            failure_one_in,
        }
    }

    fn should_fail(&self, rng: &mut impl Rng) -> bool {
        self.failure_one_in > 0 && rng.gen_ratio(1, self.failure_one_in)
    }

    fn random_token(rng: &mut impl Rng) -> String {
        (0..TOKEN_LENGTH)
            .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
            .collect()
    }
}

impl Default for DemoBookingSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 10)
    }
}

#[async_trait]
impl BookingSource for DemoBookingSource {
    async fn fetch_booking(&self) -> Result<BookingRecord, BookingError> {
        tokio::time::sleep(self.delay).await;

        // ThreadRng is not Send, keep it out of the await points
        let fail = self.should_fail(&mut rand::thread_rng());
        if fail {
            return Err(BookingError::Network("Simulated network error".to_string()));
        }

        let base: BookingRecord = serde_json::from_str(SAMPLE_BOOKING)
            .map_err(|e| BookingError::Parsing(e.to_string()))?;

        let mut rng = rand::thread_rng();
        let record = BookingRecord {
            ship_token: Self::random_token(&mut rng),
            can_issue_ticket_checking: rng.gen_bool(0.5),
            expiry_timestamp: (Utc::now().timestamp() + EXPIRY_OFFSET_SECS).to_string(),
            duration_minutes: base.duration_minutes
                + rng.gen_range(-DURATION_JITTER..=DURATION_JITTER),
            ..base
        };
        debug!(ship_token = %record.ship_token, "Demo source produced booking");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_source_randomizes_fields() {
        let source = DemoBookingSource::new(Duration::ZERO, 0);
        let record = source.fetch_booking().await.unwrap();

        assert_eq!(record.ship_reference, "ABCDEF");
        assert_eq!(record.segments.len(), 3);
        assert_eq!(record.ship_token.len(), TOKEN_LENGTH);
        assert!((2430 - DURATION_JITTER..=2430 + DURATION_JITTER).contains(&record.duration_minutes));
        assert!(record.expiry_time().unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn test_demo_source_always_fails_one_in_one() {
        let source = DemoBookingSource::new(Duration::ZERO, 1);
        assert_eq!(
            source.fetch_booking().await,
            Err(BookingError::Network("Simulated network error".to_string()))
        );
    }

    #[test]
    fn test_zero_failure_rate_never_fails() {
        let source = DemoBookingSource::new(Duration::ZERO, 0);
        let mut rng = rand::thread_rng();
        assert!((0..1000).all(|_| !source.should_fail(&mut rng)));
    }
}
