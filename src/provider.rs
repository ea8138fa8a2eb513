//! The `TimeZoneProvider` trait.

use crate::{
    error::ErrorMessage, iso::IsoDateTime, time::EpochNanoseconds, TemporalError, TemporalResult,
};
use alloc::string::String;
use alloc::vec::Vec;

/// The UTC offset in effect at an instant, and the transition that began it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneOffset {
    /// The UTC offset in seconds.
    pub offset: i64,
    /// The epoch seconds of the transition into this offset, if known.
    pub transition_epoch: Option<i64>,
}

// NOTE: This trait is kept dyn compatible so that rounding can carry a
// provider alongside a time zone without being generic over it.
/// The `TimeZoneProvider` trait provides methods required for a provider
/// to implement in order to source time zone data from that provider.
pub trait TimeZoneProvider {
    /// Returns the canonical casing of an identifier, failing for unknown zones.
    fn normalize_identifier(&self, identifier: &str) -> TemporalResult<String>;

    /// Returns whether the identifier names a known zone.
    fn check_identifier(&self, identifier: &str) -> bool {
        self.normalize_identifier(identifier).is_ok()
    }

    /// Returns every instant, in ascending order, at which the zone's wall
    /// clock reads `local_datetime`.
    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        local_datetime: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>>;

    /// Returns the offset in effect at an instant.
    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> TemporalResult<TimeZoneOffset>;
}

/// A provider without any time zone data.
///
/// Every lookup fails, which makes it suitable for operations that only
/// involve offset time zones or no time zone at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverProvider;

impl TimeZoneProvider for NeverProvider {
    fn normalize_identifier(&self, _: &str) -> TemporalResult<String> {
        Err(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        _: &str,
        _: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        Err(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))
    }

    fn get_named_tz_offset_nanoseconds(&self, _: &str, _: i128) -> TemporalResult<TimeZoneOffset> {
        Err(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))
    }
}
