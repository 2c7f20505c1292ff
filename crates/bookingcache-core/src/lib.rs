//! Core library for bookingcache.
//!
//! Serves booking information from a local cache and keeps it fresh:
//!
//! - `models`: booking payload types
//! - `cache`: the single-slot cache store and its entry metadata
//! - `source`: fetch sources that produce fresh booking records
//! - `state`: the observable state surface that front ends subscribe to
//! - `manager`: the refresh orchestrator tying the above together
//! - `config`: on-disk configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod source;
pub mod state;

pub use cache::{BookingCache, CacheEntry, FileBookingCache, MemoryBookingCache};
pub use config::Config;
pub use error::BookingError;
pub use manager::{BookingDataManager, BookingDataResult};
pub use models::{BookingRecord, Location, OriginDestinationPair, Segment};
pub use source::{BookingSource, FileBookingSource, HttpBookingSource};
pub use state::{BookingSnapshot, BookingState, BookingSubscriber};
