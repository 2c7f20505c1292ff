//! Data models for booking entities.
//!
//! - `BookingRecord`: ship reference, ticket flags, duration and segments
//! - `Segment`, `OriginDestinationPair`, `Location`: the travel legs

pub mod booking;

pub use booking::{BookingRecord, Location, OriginDestinationPair, Segment};
