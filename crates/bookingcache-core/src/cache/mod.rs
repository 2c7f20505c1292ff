//! Local caching module for booking data.
//!
//! Holds at most one `CacheEntry`, serialized as JSON under a single slot.
//! An entry is stale five minutes after it was written and expired once its
//! hard expiry passes. Two stores are provided:
//! - `FileBookingCache`: durable, one JSON file in the cache directory
//! - `MemoryBookingCache`: in-process slot, for tests and embedders

pub mod entry;
pub mod memory;
pub mod store;

pub use entry::{now_epoch_seconds, CacheEntry, STALE_THRESHOLD_SECONDS};
pub use memory::MemoryBookingCache;
pub use store::{BookingCache, FileBookingCache};
