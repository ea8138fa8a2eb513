//! This module implements `PlainDateTime` and any directly related algorithms.

use alloc::string::String;
use core::{cmp::Ordering, str::FromStr};

use tinystr::TinyAsciiStr;

use crate::{
    builtins::core::{
        calendar::Calendar, timezone::TimeZone, Duration, Instant, PlainDate, PlainTime,
        ZonedDateTime,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, Disambiguation,
        DisplayCalendar, ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions, Unit,
    },
    parsers::{parse_date_time, IxdtfStringBuilder, ParseRecord},
    provider::TimeZoneProvider,
    TemporalError, TemporalResult,
};

/// A calendar date and a wall-clock time, without a time zone.
///
/// ```rust
/// use temporal_engine::{Calendar, PlainDateTime};
///
/// let dt = PlainDateTime::try_new(2024, 3, 15, 14, 30, 0, 0, 0, 0, Calendar::default()).unwrap();
///
/// assert_eq!(dt.year(), 2024);
/// assert_eq!(dt.hour(), 14);
/// assert_eq!(dt.to_string(), "2024-03-15T14:30:00");
/// ```
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainDateTime {
    pub(crate) iso: IsoDateTime,
    calendar: Calendar,
}

impl core::fmt::Display for PlainDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ixdtf_str = self
            .to_ixdtf_string(ToStringRoundingOptions::default(), DisplayCalendar::Auto)
            .map_err(|_| core::fmt::Error)?;
        f.write_str(&ixdtf_str)
    }
}

// ==== Private PlainDateTime API ====

impl PlainDateTime {
    /// Creates a new unchecked `PlainDateTime`.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoDateTime, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates a `PlainDateTime` from a parsed date-time string, reading a
    /// missing time as midnight.
    pub(crate) fn from_parse_record(record: ParseRecord<'_>) -> TemporalResult<Self> {
        let date = record
            .date
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate))?;
        let date = IsoDate::new_with_overflow(
            date.year,
            date.month,
            date.day,
            ArithmeticOverflow::Reject,
        )?;
        let time = record
            .time
            .map(IsoTime::from_time_record)
            .transpose()?
            .unwrap_or_default();
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();
        Ok(Self::new_unchecked(IsoDateTime::new(date, time)?, calendar))
    }

    /// Equivalent: `AddDurationToDateTime`
    fn add_date_time(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        // 1. Let overflow be ? GetTemporalOverflowOption(options).
        let overflow = overflow.unwrap_or_default();
        // 2. Let norm be the time portion of the duration.
        let norm = duration.time().to_normalized()?;
        // 3. Let result be ? AddDateTime(dateTime, calendar, dateDuration, norm, overflow).
        let result =
            self.iso
                .add_date_duration(self.calendar(), duration.date(), norm, overflow)?;
        // 4. If ISODateTimeWithinLimits(result) is false, throw a RangeError exception.
        if !result.is_within_limits() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateTimeOutOfRange));
        }
        Ok(Self::new_unchecked(result, self.calendar))
    }

    /// Differences two date-times, applying the resolved rounding options.
    ///
    /// Equivalent: `DifferencePlainDateTimeWithRounding`
    pub(crate) fn diff_dt_with_rounding(
        &self,
        other: &IsoDateTime,
        options: &ResolvedRoundingOptions,
    ) -> TemporalResult<Duration> {
        // 1. If CompareISODateTime(isoDateTime1, isoDateTime2) = 0, return a zero duration.
        if self.iso == *other {
            return Ok(Duration::default());
        }

        // 2. Let diff be ? DifferenceISODateTime(isoDateTime1, isoDateTime2, calendar, largestUnit).
        let diff = self
            .iso
            .diff(other, &self.calendar, options.largest_unit)?;

        // 3. If smallestUnit is nanosecond and roundingIncrement = 1, return the unrounded diff.
        if options.is_noop() {
            return Duration::from_normalized(diff, options.largest_unit);
        }

        // 4. Let destEpochNs be GetUTCEpochNanoseconds(isoDateTime2).
        let dest_epoch_ns = other.as_nanoseconds();
        // 5. Return ? RoundRelativeDuration(diff, destEpochNs, isoDateTime1, unset, calendar,
        //    largestUnit, roundingIncrement, smallestUnit, roundingMode).
        diff.round_relative_duration(dest_epoch_ns, self, None, options)
    }

    /// Equivalent: `DifferenceTemporalPlainDateTime`
    fn diff(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        // 1. If CalendarEquals(dateTime.[[Calendar]], other.[[Calendar]]) is false, throw a RangeError exception.
        if self.calendar != other.calendar {
            return Err(TemporalError::range().with_enum(ErrorMessage::CalendarMismatch));
        }

        // 2. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, DATETIME, « », "nanosecond", "day").
        let options = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            Unit::Day,
            Unit::Nanosecond,
        )?;

        // 3. Let result be ? DifferencePlainDateTimeWithRounding(...).
        let result = self.diff_dt_with_rounding(&other.iso, &options)?;

        // 4. If operation is since, let result be CreateNegatedTemporalDuration(result).
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }
}

// ==== Public PlainDateTime API ====

impl PlainDateTime {
    /// Creates a new `PlainDateTime`, constraining any out of range field.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            calendar,
            ArithmeticOverflow::Constrain,
        )
    }

    /// Creates a new `PlainDateTime`, rejecting any out of range field.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            calendar,
            ArithmeticOverflow::Reject,
        )
    }

    /// Creates a new `PlainDateTime` with the provided [`ArithmeticOverflow`] option.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<Self> {
        let date = IsoDate::regulate(year, month, day, overflow)?;
        let time = IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            overflow,
        )?;
        let iso = IsoDateTime::new(date, time)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Combines a `PlainDate` and a `PlainTime`.
    pub fn from_date_and_time(date: PlainDate, time: PlainTime) -> TemporalResult<Self> {
        let iso = IsoDateTime::new(date.iso, time.iso)?;
        Ok(Self::new_unchecked(iso, *date.calendar()))
    }

    /// Returns this date-time with the time replaced, or set to midnight
    /// when `time` is `None`.
    pub fn with_plain_time(&self, time: Option<PlainTime>) -> TemporalResult<Self> {
        let time = time.map(|t| t.iso).unwrap_or_default();
        let iso = IsoDateTime::new(self.iso.date, time)?;
        Ok(Self::new_unchecked(iso, self.calendar))
    }

    /// Returns this date-time viewed in another calendar.
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.iso, calendar)
    }

    /// Returns this `PlainDateTime`'s ISO year value.
    #[inline]
    #[must_use]
    pub const fn iso_year(&self) -> i32 {
        self.iso.date.year
    }

    /// Returns this `PlainDateTime`'s ISO month value.
    #[inline]
    #[must_use]
    pub const fn iso_month(&self) -> u8 {
        self.iso.date.month
    }

    /// Returns this `PlainDateTime`'s ISO day value.
    #[inline]
    #[must_use]
    pub const fn iso_day(&self) -> u8 {
        self.iso.date.day
    }

    /// Returns the hour value
    #[inline]
    #[must_use]
    pub fn hour(&self) -> u8 {
        self.iso.time.hour
    }

    /// Returns the minute value
    #[inline]
    #[must_use]
    pub fn minute(&self) -> u8 {
        self.iso.time.minute
    }

    /// Returns the second value
    #[inline]
    #[must_use]
    pub fn second(&self) -> u8 {
        self.iso.time.second
    }

    /// Returns the `millisecond` value
    #[inline]
    #[must_use]
    pub fn millisecond(&self) -> u16 {
        self.iso.time.millisecond
    }

    /// Returns the `microsecond` value
    #[inline]
    #[must_use]
    pub fn microsecond(&self) -> u16 {
        self.iso.time.microsecond
    }

    /// Returns the `nanosecond` value
    #[inline]
    #[must_use]
    pub fn nanosecond(&self) -> u16 {
        self.iso.time.nanosecond
    }

    /// Returns the Calendar value.
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Adds a `Duration` to the current `PlainDateTime`.
    pub fn add(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        self.add_date_time(duration, overflow)
    }

    /// Subtracts a `Duration` from the current `PlainDateTime`.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        self.add_date_time(&duration.negated(), overflow)
    }

    /// Returns a `Duration` representing the period of time from this `PlainDateTime` until the other `PlainDateTime`.
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// Returns a `Duration` representing the period of time from this `PlainDateTime` since the other `PlainDateTime`.
    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings)
    }

    /// Rounds the current `PlainDateTime` based on provided options.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;

        if resolved.is_noop() {
            return Ok(*self);
        }

        let result = self.iso.round(resolved)?;

        Ok(Self::new_unchecked(result, self.calendar))
    }

    /// Compares two date-times by their ISO fields, then by calendar identifier.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.iso
            .cmp(&other.iso)
            .then_with(|| self.calendar.identifier().cmp(other.calendar.identifier()))
    }

    /// Returns the date part of this date-time.
    #[must_use]
    pub fn to_plain_date(&self) -> PlainDate {
        PlainDate::new_unchecked(self.iso.date, self.calendar)
    }

    /// Returns the time part of this date-time.
    #[must_use]
    pub fn to_plain_time(&self) -> PlainTime {
        PlainTime::from(*self)
    }

    /// Resolves this date-time in a time zone with the provided disambiguation.
    pub fn to_zoned_date_time_with_provider(
        &self,
        time_zone: TimeZone,
        disambiguation: Disambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<ZonedDateTime> {
        let epoch_ns = time_zone.get_epoch_nanoseconds_for(self.iso, disambiguation, provider)?;
        Ok(ZonedDateTime::new_unchecked(
            Instant::from(epoch_ns),
            self.calendar,
            time_zone,
        ))
    }

    /// Returns the date-time as an ISO 8601 string, rounded to the requested precision.
    pub fn to_ixdtf_string(
        &self,
        options: ToStringRoundingOptions,
        display_calendar: DisplayCalendar,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let result = self
            .iso
            .round(ResolvedRoundingOptions::from_to_string_options(&resolved))?;
        let ixdtf_string = IxdtfStringBuilder::default()
            .with_date(result.date)
            .with_time(result.time, resolved.precision)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build();
        Ok(ixdtf_string)
    }
}

// ==== Calendar-derived public API ====

impl PlainDateTime {
    /// Returns the calendar year value.
    pub fn year(&self) -> i32 {
        self.calendar.year(&self.iso.date)
    }

    /// Returns the calendar month value.
    pub fn month(&self) -> u8 {
        self.calendar.month(&self.iso.date)
    }

    /// Returns the calendar day value.
    pub fn day(&self) -> u8 {
        self.calendar.day(&self.iso.date)
    }

    /// Returns the era of the date, if the calendar has eras.
    pub fn era(&self) -> Option<TinyAsciiStr<16>> {
        self.calendar.era(&self.iso.date)
    }

    /// Returns the year within the era, if the calendar has eras.
    pub fn era_year(&self) -> Option<i32> {
        self.calendar.era_year(&self.iso.date)
    }

    /// Returns the calendar day of week value.
    pub fn day_of_week(&self) -> u16 {
        self.calendar.day_of_week(&self.iso.date)
    }

    /// Returns the calendar day of year value.
    pub fn day_of_year(&self) -> u16 {
        self.calendar.day_of_year(&self.iso.date)
    }

    /// Returns the calendar week of year value.
    pub fn week_of_year(&self) -> Option<u8> {
        self.calendar.week_of_year(&self.iso.date)
    }

    /// Returns the calendar year of week value.
    pub fn year_of_week(&self) -> Option<i32> {
        self.calendar.year_of_week(&self.iso.date)
    }

    /// Returns the calendar days in week value.
    pub fn days_in_week(&self) -> u16 {
        self.calendar.days_in_week(&self.iso.date)
    }

    /// Returns the calendar days in month value.
    pub fn days_in_month(&self) -> u8 {
        self.calendar.days_in_month(&self.iso.date)
    }

    /// Returns the calendar days in year value.
    pub fn days_in_year(&self) -> u16 {
        self.calendar.days_in_year(&self.iso.date)
    }

    /// Returns the calendar months in year value.
    pub fn months_in_year(&self) -> u8 {
        self.calendar.months_in_year(&self.iso.date)
    }

    /// Returns whether the date is in a leap year for the given calendar.
    pub fn in_leap_year(&self) -> bool {
        self.calendar.in_leap_year(&self.iso.date)
    }
}

// ==== Trait impls ====

impl From<PlainDate> for PlainDateTime {
    fn from(value: PlainDate) -> Self {
        Self::new_unchecked(
            IsoDateTime::new_unchecked(value.iso, IsoTime::default()),
            *value.calendar(),
        )
    }
}

impl FromStr for PlainDateTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parse_record(parse_date_time(s)?)
    }
}
