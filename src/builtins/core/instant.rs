//! An implementation of the Temporal Instant.

use alloc::string::String;
use core::{num::NonZeroU128, str::FromStr};
use ixdtf::records::UtcOffsetRecordOrZ;

use crate::{
    builtins::core::{
        calendar::Calendar,
        duration::{
            normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
            DateDuration,
        },
        timezone::TimeZone,
        Duration, ZonedDateTime,
    },
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, DisplayOffset,
        ResolvedRoundingOptions, ResolvedToStringRoundingOptions, RoundingIncrement, RoundingMode,
        RoundingOptions, ToStringRoundingOptions, Unit,
    },
    parsers::{offset_nanoseconds, parse_instant, IxdtfStringBuilder},
    provider::{NeverProvider, TimeZoneProvider},
    rounding::round_as_if_positive,
    time::EpochNanoseconds,
    TemporalError, TemporalResult, TemporalUnwrap,
};

const NS_PER_MINUTE: i128 = 60_000_000_000;

/// An exact point on the time line, independent of any calendar or time zone.
///
/// ```rust
/// use temporal_engine::Instant;
/// use core::str::FromStr;
///
/// let instant = Instant::from_str("2020-01-01T00:00:00-05:00").unwrap();
/// assert_eq!(instant.epoch_milliseconds(), 1_577_854_800_000);
/// assert_eq!(instant.to_string(), "2020-01-01T05:00:00Z");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(EpochNanoseconds);

impl From<EpochNanoseconds> for Instant {
    fn from(value: EpochNanoseconds) -> Self {
        Self(value)
    }
}

// ==== Private API ====

impl Instant {
    /// Adds a time duration to the current `Instant`.
    ///
    /// Equivalent: `AddInstant`
    pub(crate) fn add_to_instant(&self, norm: &NormalizedTimeDuration) -> TemporalResult<Self> {
        self.0.checked_add(norm.0).map(Self)
    }

    /// Equivalent: `AddDurationToInstant`
    fn add_duration(&self, duration: &Duration) -> TemporalResult<Self> {
        // 1. If the duration has any date units, throw a RangeError exception.
        if duration.date() != &DateDuration::default() {
            return Err(TemporalError::range()
                .with_message("Instant arithmetic does not accept date units."));
        }
        // 2. Let internalDuration be ToInternalDurationRecordWith24HourDays(duration).
        let norm = duration.time().to_normalized()?;
        // 3. Return ? AddInstant(instant.[[EpochNanoseconds]], internalDuration.[[Time]]).
        self.add_to_instant(&norm)
    }

    /// Differences two instants, applying the resolved rounding options.
    ///
    /// Equivalent: `DifferenceInstant`
    pub(crate) fn diff_instant_internal(
        &self,
        other: &Self,
        resolved: &ResolvedRoundingOptions,
    ) -> TemporalResult<NormalizedTimeDuration> {
        let diff =
            NormalizedTimeDuration::from_nanosecond_difference(other.as_i128(), self.as_i128())?;
        if resolved.is_noop() {
            return Ok(diff);
        }
        diff.round(resolved)
    }

    /// Equivalent: `DifferenceTemporalInstant`
    fn diff_instant(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        // 1. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, TIME, « », "nanosecond", "second").
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            Unit::Second,
            Unit::Nanosecond,
        )?;
        if !resolved.largest_unit.is_time_unit() || !resolved.smallest_unit.is_time_unit() {
            return Err(TemporalError::range()
                .with_message("Instant differences only accept time units."));
        }

        // 2. Let internalDuration be DifferenceInstant(...).
        let norm = self.diff_instant_internal(other, &resolved)?;

        // 3. Let result be ! TemporalDurationFromInternal(internalDuration, settings.[[LargestUnit]]).
        let record = NormalizedDurationRecord::new(DateDuration::default(), norm)?;
        let result = Duration::from_normalized(record, resolved.largest_unit)?;

        // 4. If operation is since, set result to CreateNegatedTemporalDuration(result).
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }

    /// Rounds the epoch nanoseconds with an increment in nanoseconds.
    ///
    /// Equivalent: `RoundTemporalInstant`
    pub(crate) fn round_instant(
        &self,
        increment: NonZeroU128,
        mode: RoundingMode,
    ) -> TemporalResult<i128> {
        round_as_if_positive(self.as_i128(), increment, mode)
    }

    /// Rounds the instant ahead of formatting it at the resolved precision.
    pub(crate) fn round_for_string(
        &self,
        resolved: &ResolvedToStringRoundingOptions,
    ) -> TemporalResult<Self> {
        let increment = increment_in_nanoseconds(resolved.smallest_unit, resolved.increment)?;
        Self::try_new(self.round_instant(increment, resolved.mode)?)
    }

    // Utility for converting `Instant` to `i128`.
    pub(crate) fn as_i128(&self) -> i128 {
        self.0 .0
    }
}

// ==== Public API ====

impl Instant {
    /// Create a new validated `Instant`.
    #[inline]
    pub fn try_new(nanoseconds: i128) -> TemporalResult<Self> {
        Ok(Self::from(EpochNanoseconds::try_from(nanoseconds)?))
    }

    /// Creates a new `Instant` from the provided Epoch millisecond value.
    pub fn from_epoch_milliseconds(epoch_milliseconds: i64) -> TemporalResult<Self> {
        let epoch_nanos = i128::from(epoch_milliseconds) * 1_000_000;
        Self::try_new(epoch_nanos)
    }

    /// Adds a `Duration` to the current `Instant`, returning an error if the `Duration`
    /// contains a date unit.
    #[inline]
    pub fn add(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add_duration(duration)
    }

    /// Subtract a `Duration` from the current `Instant`, returning an error if the `Duration`
    /// contains a date unit.
    #[inline]
    pub fn subtract(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add_duration(&duration.negated())
    }

    /// Returns a `Duration` representing the duration since provided `Instant`
    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_instant(DifferenceOperation::Since, other, settings)
    }

    /// Returns a `Duration` representing the duration until provided `Instant`
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_instant(DifferenceOperation::Until, other, settings)
    }

    /// Returns an `Instant` by rounding the current `Instant` according to the provided settings.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_instant_options(options)?;
        let increment = increment_in_nanoseconds(resolved.smallest_unit, resolved.increment)?;
        let rounded = self.round_instant(increment, resolved.rounding_mode)?;
        Self::try_new(rounded)
    }

    /// Returns the `epochMilliseconds` value for this `Instant`.
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.as_i128().div_euclid(1_000_000) as i64
    }

    /// Returns the `epochNanoseconds` value for this `Instant`.
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> &EpochNanoseconds {
        &self.0
    }

    /// Returns this instant as a `ZonedDateTime` in the ISO calendar.
    #[must_use]
    pub fn to_zoned_date_time_iso(&self, time_zone: TimeZone) -> ZonedDateTime {
        ZonedDateTime::new_unchecked(*self, Calendar::default(), time_zone)
    }

    /// Returns the instant as an ISO 8601 string.
    ///
    /// Without a time zone the string is in UTC with a `Z` designator.
    /// With one, the local date-time and its offset, rounded to whole
    /// minutes, are written.
    pub fn to_ixdtf_string_with_provider(
        &self,
        time_zone: Option<&TimeZone>,
        options: ToStringRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<String> {
        // 1. Round the instant to the requested precision.
        let resolved = options.resolve()?;
        let rounded = self.round_for_string(&resolved)?;

        // 2. Without a time zone, write the UTC date-time with `Z`.
        let Some(time_zone) = time_zone else {
            let iso = IsoDateTime::from_epoch_nanos(rounded.as_i128(), 0);
            return Ok(IxdtfStringBuilder::default()
                .with_date(iso.date)
                .with_time(iso.time, resolved.precision)
                .with_z(DisplayOffset::Auto)
                .build());
        };

        // 3. Otherwise write the local date-time and its offset.
        let offset = time_zone.get_offset_nanos_for(rounded.as_i128(), provider)?;
        let iso = IsoDateTime::from_epoch_nanos(rounded.as_i128(), offset);
        Ok(IxdtfStringBuilder::default()
            .with_date(iso.date)
            .with_time(iso.time, resolved.precision)
            .with_offset(offset_for_display(offset)?, DisplayOffset::Auto)
            .build())
    }
}

/// Rounds an offset to the nearest minute, with ties away from zero.
pub(crate) fn round_offset_to_minutes(offset_ns: i128) -> TemporalResult<i128> {
    let increment = NonZeroU128::new(NS_PER_MINUTE as u128).temporal_unwrap()?;
    let magnitude = round_as_if_positive(offset_ns.abs(), increment, RoundingMode::Nearest)?;
    Ok(magnitude * offset_ns.signum())
}

/// Returns the offset written in strings: the nearest whole minute.
pub(crate) fn offset_for_display(offset_ns: i128) -> TemporalResult<i64> {
    i64::try_from(round_offset_to_minutes(offset_ns)?).map_err(|_| TemporalError::assert())
}

/// Returns `increment` multiples of `unit` in nanoseconds.
fn increment_in_nanoseconds(
    unit: Unit,
    increment: RoundingIncrement,
) -> TemporalResult<NonZeroU128> {
    let length = unit
        .as_nanoseconds()
        .and_then(|ns| NonZeroU128::new(ns.into()))
        .temporal_unwrap()?;
    increment
        .as_extended_increment()
        .checked_mul(length)
        .temporal_unwrap()
}

// ==== Trait impls ====

impl core::fmt::Display for Instant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ixdtf_string = self
            .to_ixdtf_string_with_provider(None, ToStringRoundingOptions::default(), &NeverProvider)
            .map_err(|_| core::fmt::Error)?;
        f.write_str(&ixdtf_string)
    }
}

impl FromStr for Instant {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = parse_instant(s)?;

        // 1. The parser requires a date, a time and an offset.
        let date = record.date.temporal_unwrap()?;
        let time = record.time.temporal_unwrap()?;
        let offset = match record.offset.temporal_unwrap()? {
            UtcOffsetRecordOrZ::Z => 0,
            UtcOffsetRecordOrZ::Offset(offset) => i128::from(offset_nanoseconds(offset)?),
        };

        // 2. Read the local date-time as UTC and remove the offset.
        let date =
            IsoDate::new_with_overflow(date.year, date.month, date.day, ArithmeticOverflow::Reject)?;
        let iso = IsoDateTime::new_unchecked(date, IsoTime::from_time_record(time)?);
        Self::try_new(iso.as_nanoseconds() - offset)
    }
}

// ==== Instant Tests ====

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::str::FromStr;

    use crate::{
        builtins::core::{Duration, Instant},
        options::{
            DifferenceSettings, Precision, RoundingIncrement, RoundingMode, RoundingOptions,
            ToStringRoundingOptions, Unit,
        },
        provider::NeverProvider,
        TimeZone, UtcOffset, NS_MAX_INSTANT, NS_MIN_INSTANT,
    };

    #[test]
    fn max_and_minimum_instant_bounds() {
        let max_instant = Instant::try_new(NS_MAX_INSTANT).unwrap();
        let min_instant = Instant::try_new(NS_MIN_INSTANT).unwrap();

        assert_eq!(max_instant.epoch_milliseconds(), 8_640_000_000_000_000);
        assert_eq!(min_instant.epoch_milliseconds(), -8_640_000_000_000_000);

        assert!(Instant::try_new(NS_MAX_INSTANT + 1).is_err());
        assert!(Instant::try_new(NS_MIN_INSTANT - 1).is_err());
        assert!(Instant::from_epoch_milliseconds(8_640_000_000_000_001).is_err());
    }

    #[test]
    fn epoch_milliseconds_floor() {
        let instant = Instant::try_new(-1).unwrap();
        assert_eq!(instant.epoch_milliseconds(), -1);
        let instant = Instant::try_new(1_999_999).unwrap();
        assert_eq!(instant.epoch_milliseconds(), 1);
    }

    #[test]
    fn parse_instant_strings() {
        let instant = Instant::from_str("1970-01-01T00:00Z").unwrap();
        assert_eq!(instant.epoch_nanoseconds().as_i128(), 0);

        let instant = Instant::from_str("1970-01-01T00:00:00+01:00[Europe/Vienna]").unwrap();
        assert_eq!(instant.epoch_nanoseconds().as_i128(), -3_600_000_000_000);

        let instant = Instant::from_str("1970-01-01t01:00:30.5+01:00:30.5").unwrap();
        assert_eq!(instant.epoch_nanoseconds().as_i128(), 0);

        for invalid in [
            "1970-01-01",
            "1970-01-01T00:00",
            "+275760-09-13T00:00:00.000000001Z",
            "-271821-04-19T23:59:59.999999999Z",
        ] {
            assert!(Instant::from_str(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn instant_add_and_subtract() {
        let instant = Instant::from_str("1970-01-01T00:00Z").unwrap();
        let result = instant
            .add(&Duration::from_str("PT1H0.5S").unwrap())
            .unwrap();
        assert_eq!(result.epoch_nanoseconds().as_i128(), 3_600_500_000_000);

        let result = instant
            .subtract(&Duration::from_str("PT48H").unwrap())
            .unwrap();
        assert_eq!(result.epoch_milliseconds(), -172_800_000);

        assert!(instant.add(&Duration::from_str("P1D").unwrap()).is_err());
        let max = Instant::try_new(NS_MAX_INSTANT).unwrap();
        assert!(max.add(&Duration::from_str("PT0.000000001S").unwrap()).is_err());
    }

    #[test]
    fn instant_until_and_since() {
        let one = Instant::from_str("1969-07-24T16:50:35.123456789Z").unwrap();
        let two = Instant::from_str("2019-06-30T06:52:23.987654321Z").unwrap();

        let result = one.until(&two, DifferenceSettings::default()).unwrap();
        assert_eq!(result.hours(), 0);
        assert_eq!(result.seconds(), 1_575_727_308);
        assert_eq!(result.milliseconds(), 864);
        assert_eq!(result.microseconds(), 197);
        assert_eq!(result.nanoseconds(), 532);

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Hour),
            smallest_unit: Some(Unit::Minute),
            rounding_mode: Some(RoundingMode::Nearest),
            increment: Some(RoundingIncrement::try_new(30).unwrap()),
        };
        let result = two.since(&one, settings).unwrap();
        assert_eq!((result.hours(), result.minutes()), (437_702, 0));

        let settings = DifferenceSettings::with_largest_unit(Unit::Day);
        assert!(one.until(&two, settings).is_err());
    }

    #[test]
    fn instant_round() {
        let instant = Instant::from_str("1976-11-18T14:23:30.123456789Z").unwrap();

        let gen_rounding_options = |smallest: Unit, increment: u32| -> RoundingOptions {
            RoundingOptions {
                smallest_unit: Some(smallest),
                increment: Some(RoundingIncrement::try_new(increment).unwrap()),
                ..Default::default()
            }
        };

        let result = instant.round(gen_rounding_options(Unit::Hour, 4)).unwrap();
        assert_eq!(result.to_string(), "1976-11-18T16:00:00Z");

        let result = instant.round(gen_rounding_options(Unit::Minute, 15)).unwrap();
        assert_eq!(result.to_string(), "1976-11-18T14:30:00Z");

        let result = instant
            .round(gen_rounding_options(Unit::Millisecond, 1))
            .unwrap();
        assert_eq!(result.to_string(), "1976-11-18T14:23:30.123Z");

        // The increment must divide a day, not the next unit.
        let result = instant.round(gen_rounding_options(Unit::Minute, 1440));
        assert!(result.is_ok());
        assert!(instant.round(gen_rounding_options(Unit::Hour, 5)).is_err());
        assert!(instant.round(gen_rounding_options(Unit::Day, 1)).is_err());

        // Floor and trunc both round toward the earlier instant.
        let before_epoch = Instant::try_new(-1_500).unwrap();
        let options = RoundingOptions {
            smallest_unit: Some(Unit::Microsecond),
            rounding_mode: Some(RoundingMode::Trunc),
            ..Default::default()
        };
        assert_eq!(
            before_epoch.round(options).unwrap().epoch_nanoseconds().as_i128(),
            -2_000
        );
    }

    #[test]
    fn to_string_with_time_zone() {
        let instant = Instant::from_str("2020-01-01T12:34:56.789Z").unwrap();

        let options = ToStringRoundingOptions::with_precision(Precision::Digit(0));
        let result = instant
            .to_ixdtf_string_with_provider(None, options, &NeverProvider)
            .unwrap();
        assert_eq!(result, "2020-01-01T12:34:56Z");

        let zone = TimeZone::from(UtcOffset::from_str("-05:30").unwrap());
        let result = instant
            .to_ixdtf_string_with_provider(Some(&zone), Default::default(), &NeverProvider)
            .unwrap();
        assert_eq!(result, "2020-01-01T07:04:56.789-05:30");

        let options = ToStringRoundingOptions {
            smallest_unit: Some(Unit::Minute),
            rounding_mode: Some(RoundingMode::Nearest),
            ..Default::default()
        };
        let result = instant
            .to_ixdtf_string_with_provider(None, options, &NeverProvider)
            .unwrap();
        assert_eq!(result, "2020-01-01T12:35Z");
    }
}
