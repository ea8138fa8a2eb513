//! This module implements `PlainTime`.

use crate::{
    builtins::core::{
        duration::{normalized::NormalizedDurationRecord, DateDuration},
        Duration, PlainDateTime,
    },
    error::ErrorMessage,
    iso::IsoTime,
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, ResolvedRoundingOptions,
        RoundingOptions, ToStringRoundingOptions, Unit,
    },
    parsers::{parse_time, IxdtfStringBuilder},
    TemporalError, TemporalResult,
};
use alloc::string::String;
use core::{cmp::Ordering, str::FromStr};

/// A wall-clock time with nanosecond precision and no date or time zone.
///
/// Arithmetic wraps around midnight.
///
/// ```rust
/// use temporal_engine::{Duration, PlainTime};
/// use core::str::FromStr;
///
/// let time = PlainTime::from_str("T22:30").unwrap();
/// let later = time.add(&Duration::from_str("PT3H").unwrap()).unwrap();
/// assert_eq!(later.to_string(), "01:30:00");
/// ```
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainTime {
    pub(crate) iso: IsoTime,
}

impl PlainTime {
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoTime) -> Self {
        Self { iso }
    }

    /// Equivalent: `DifferenceTemporalPlainTime`
    pub(crate) fn diff_time(
        &self,
        op: DifferenceOperation,
        other: &PlainTime,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        // 1. Resolve the settings with `hour` and `nanosecond` as the defaults.
        let resolved =
            ResolvedRoundingOptions::from_diff_settings(settings, op, Unit::Hour, Unit::Nanosecond)?;
        if !resolved.largest_unit.is_time_unit() || !resolved.smallest_unit.is_time_unit() {
            return Err(TemporalError::range()
                .with_message("PlainTime differences only accept time units."));
        }

        // 2. Take the signed nanosecond difference, rounded when asked.
        let mut time = self.iso.diff(&other.iso);
        if !resolved.is_noop() {
            time = time.round(&resolved)?;
        }

        // 3. Balance it up to the largest unit.
        let record = NormalizedDurationRecord::new(DateDuration::default(), time)?;
        let result = Duration::from_normalized(record, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => result,
            DifferenceOperation::Since => result.negated(),
        })
    }
}

impl PlainTime {
    /// Creates a `PlainTime`, clamping each field into its range.
    ///
    /// ```rust
    /// use temporal_engine::PlainTime;
    ///
    /// let clamped = PlainTime::new(24, 60, 0, 0, 0, 0).unwrap();
    /// assert_eq!((clamped.hour(), clamped.minute()), (23, 59));
    /// ```
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> TemporalResult<Self> {
        IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            ArithmeticOverflow::Constrain,
        )
        .map(Self::new_unchecked)
    }

    /// Creates a `PlainTime`, failing when any field is out of range.
    pub fn try_new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> TemporalResult<Self> {
        IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            ArithmeticOverflow::Reject,
        )
        .map(Self::new_unchecked)
    }

    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.iso.hour
    }

    #[inline]
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.iso.minute
    }

    #[inline]
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.iso.second
    }

    #[inline]
    #[must_use]
    pub const fn millisecond(&self) -> u16 {
        self.iso.millisecond
    }

    #[inline]
    #[must_use]
    pub const fn microsecond(&self) -> u16 {
        self.iso.microsecond
    }

    #[inline]
    #[must_use]
    pub const fn nanosecond(&self) -> u16 {
        self.iso.nanosecond
    }

    /// Adds the time units of `duration`. Date units are ignored and the
    /// day carry is dropped.
    ///
    /// Equivalent: `AddDurationToTime`
    pub fn add(&self, duration: &Duration) -> TemporalResult<Self> {
        let (_, result) = self.iso.add(duration.time().to_normalized()?);
        Ok(Self::new_unchecked(result))
    }

    pub fn subtract(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add(&duration.negated())
    }

    /// Returns the time units from `self` to `other` within one day.
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_time(DifferenceOperation::Until, other, settings)
    }

    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_time(DifferenceOperation::Since, other, settings)
    }

    /// Rounds to a time unit. Rounding up from the last increment of the day
    /// wraps to midnight.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;
        if !resolved.smallest_unit.is_time_unit() {
            return Err(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit));
        }
        let (_, result) = self.iso.round(resolved)?;
        Ok(Self::new_unchecked(result))
    }

    #[inline]
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Writes the time as `HH:MM[:SS[.fffffffff]]`.
    pub fn to_ixdtf_string(&self, options: ToStringRoundingOptions) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let (_, rounded) = self
            .iso
            .round(ResolvedRoundingOptions::from_to_string_options(&resolved))?;
        Ok(IxdtfStringBuilder::default()
            .with_time(rounded, resolved.precision)
            .build())
    }
}

impl From<PlainDateTime> for PlainTime {
    fn from(value: PlainDateTime) -> Self {
        Self::new_unchecked(value.iso.time)
    }
}

impl core::fmt::Display for PlainTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self
            .to_ixdtf_string(ToStringRoundingOptions::default())
            .map_err(|_| core::fmt::Error)?;
        f.write_str(&string)
    }
}

impl FromStr for PlainTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = parse_time(s)?
            .time
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTime))?;
        IsoTime::from_time_record(time).map(Self::new_unchecked)
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use crate::{
        builtins::core::Duration,
        iso::IsoTime,
        options::{
            DifferenceSettings, Precision, RoundingIncrement, RoundingMode, RoundingOptions,
            ToStringRoundingOptions, Unit,
        },
    };

    use super::PlainTime;

    fn fields(time: PlainTime) -> (u8, u8, u8, u16, u16, u16) {
        (
            time.hour(),
            time.minute(),
            time.second(),
            time.millisecond(),
            time.microsecond(),
            time.nanosecond(),
        )
    }

    fn by(unit: Unit, increment: u32) -> RoundingOptions {
        RoundingOptions {
            smallest_unit: Some(unit),
            increment: Some(RoundingIncrement::try_new(increment).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn parse_forms() {
        let cases = [
            ("T12:05:24-05:00[u-ca=iso8601]", (12, 5, 24, 0, 0, 0)),
            ("T12:05:24.123456789-05:00[c=iso8601]", (12, 5, 24, 123, 456, 789)),
            ("2024-05-04 12:05:24.123456789-05:00", (12, 5, 24, 123, 456, 789)),
            ("T120524,5", (12, 5, 24, 500, 0, 0)),
            // Leap seconds are constrained.
            ("T23:59:60", (23, 59, 59, 0, 0, 0)),
        ];
        for (source, expected) in cases {
            assert_eq!(fields(PlainTime::from_str(source).unwrap()), expected, "{source}");
        }

        for invalid in [
            "2019-10-01T09:00:00Z",
            "2019-10-01T09:00:00Z[UTC]",
            "T09:00:00Z",
            "2019-10-01",
            "24:00",
            "T12:00junk",
        ] {
            assert!(PlainTime::from_str(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn round_subsecond_units() {
        let base = PlainTime::new_unchecked(IsoTime::new_unchecked(3, 34, 56, 987, 654, 321));
        let cases = [
            (Unit::Millisecond, 1, (3, 34, 56, 988, 0, 0)),
            (Unit::Millisecond, 4, (3, 34, 56, 988, 0, 0)),
            (Unit::Millisecond, 5, (3, 34, 56, 990, 0, 0)),
            (Unit::Microsecond, 2, (3, 34, 56, 987, 654, 0)),
            (Unit::Microsecond, 4, (3, 34, 56, 987, 656, 0)),
            (Unit::Microsecond, 5, (3, 34, 56, 987, 655, 0)),
            (Unit::Minute, 15, (3, 30, 0, 0, 0, 0)),
        ];
        for (unit, increment, expected) in cases {
            assert_eq!(fields(base.round(by(unit, increment)).unwrap()), expected);
        }
    }

    #[test]
    // test262/test/built-ins/Temporal/PlainTime/prototype/round/roundingincrement-nanoseconds.js
    fn rounding_increment_nanos() {
        let time = PlainTime::new(3, 34, 56, 987, 654, 321).unwrap();
        let cases = [
            (1, 321),
            (2, 322),
            (4, 320),
            (8, 320),
            (25, 325),
            (50, 300),
            (125, 375),
            (200, 400),
            (250, 250),
            (500, 500),
        ];
        for (increment, nanosecond) in cases {
            let rounded = time.round(by(Unit::Nanosecond, increment)).unwrap();
            assert_eq!(rounded.nanosecond(), nanosecond, "increment {increment}");
        }
    }

    #[test]
    fn round_limits() {
        let time = PlainTime::new(23, 59, 59, 999, 0, 0).unwrap();
        assert_eq!(fields(time.round(by(Unit::Second, 1)).unwrap()), (0, 0, 0, 0, 0, 0));

        let floor = RoundingOptions {
            rounding_mode: Some(RoundingMode::Floor),
            ..by(Unit::Hour, 1)
        };
        assert_eq!(fields(time.round(floor).unwrap()), (23, 0, 0, 0, 0, 0));

        // Increments must divide the next larger unit.
        assert!(time.round(by(Unit::Second, 29)).is_err());
        assert!(time.round(by(Unit::Hour, 24)).is_err());
        assert!(time.round(by(Unit::Day, 1)).is_err());
        assert!(time.round(RoundingOptions::default()).is_err());
    }

    #[test]
    fn arithmetic_wraps_midnight() {
        let base = PlainTime::new(15, 23, 30, 123, 456, 789).unwrap();
        let result = base.add(&Duration::from_str("PT16H").unwrap()).unwrap();
        assert_eq!(fields(result), (7, 23, 30, 123, 456, 789));

        let result = base
            .subtract(&Duration::from_str("P1DT15H23M31S").unwrap())
            .unwrap();
        assert_eq!(fields(result), (23, 59, 59, 123, 456, 789));
    }

    #[test]
    fn differences() {
        let a = PlainTime::try_new(15, 23, 30, 123, 456, 789).unwrap();
        let b = PlainTime::try_new(17, 0, 30, 123, 456, 789).unwrap();

        let until = a.until(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((until.hours(), until.minutes()), (1, 37));
        let since = a.since(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((since.hours(), since.minutes()), (-1, -37));

        let settings = DifferenceSettings::with_largest_unit(Unit::Day);
        assert!(a.until(&b, settings).is_err());

        let earlier = PlainTime::new(3, 12, 34, 123, 456, 789).unwrap();
        let later = PlainTime::new(13, 47, 57, 988, 655, 322).unwrap();
        let settings = |increment| DifferenceSettings {
            smallest_unit: Some(Unit::Second),
            increment: Some(RoundingIncrement::try_new(increment).unwrap()),
            ..Default::default()
        };
        let result = later.since(&earlier, settings(1)).unwrap();
        assert_eq!((result.hours(), result.minutes(), result.seconds()), (10, 35, 23));
        assert_eq!(result.milliseconds(), 0);
        let result = later.since(&earlier, settings(4)).unwrap();
        assert_eq!(result.seconds(), 20);
    }

    #[test]
    fn to_string_precision() {
        let time = PlainTime::new(9, 5, 0, 120, 0, 0).unwrap();
        let with = |precision| {
            time.to_ixdtf_string(ToStringRoundingOptions::with_precision(precision))
                .unwrap()
        };
        assert_eq!(with(Precision::Auto), "09:05:00.12");
        assert_eq!(with(Precision::Digit(0)), "09:05:00");
        assert_eq!(with(Precision::Minute), "09:05");
        assert_eq!(PlainTime::from_str("09:05:00.12").unwrap(), time);
    }
}
