//! Fetch sources for fresh booking data.
//!
//! A `BookingSource` is an opaque async provider: it may be slow and it may
//! fail. Timeouts belong to the source; the orchestrator never imposes one
//! and never retries.

pub mod file;
pub mod http;

use async_trait::async_trait;

use crate::error::BookingError;
use crate::models::BookingRecord;

pub use file::FileBookingSource;
pub use http::HttpBookingSource;

#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn fetch_booking(&self) -> Result<BookingRecord, BookingError>;
}
