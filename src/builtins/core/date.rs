//! This module implements `PlainDate` and any directly related algorithms.

use alloc::string::String;
use core::{cmp::Ordering, fmt, str::FromStr};

use tinystr::TinyAsciiStr;

use crate::{
    builtins::core::{
        calendar::{Calendar, CalendarFields},
        duration::{
            normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
            DateDuration,
        },
        timezone::TimeZone,
        Duration, Instant, PlainDateTime, PlainTime, ZonedDateTime,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, Disambiguation,
        DisplayCalendar, ResolvedRoundingOptions, Unit,
    },
    parsers::{parse_date_time, IxdtfStringBuilder, ParseRecord},
    provider::TimeZoneProvider,
    TemporalError, TemporalResult, NS_PER_DAY,
};

/// A calendar date without a time of day or time zone.
///
/// The date is stored as ISO fields, and the calendar maps them to its own
/// year, month and day.
///
/// ```rust
/// use temporal_engine::{Calendar, Duration, PlainDate};
/// use core::str::FromStr;
///
/// let date = PlainDate::try_new(2020, 1, 31, Calendar::default()).unwrap();
/// let next_month = date.add(&Duration::from_str("P1M").unwrap(), None).unwrap();
///
/// // 2020 is a leap year, so the result is clamped to the 29th.
/// assert_eq!(next_month.to_string(), "2020-02-29");
/// ```
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainDate {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

// ==== Private API ====

impl PlainDate {
    /// Create a new `PlainDate` with the date values and calendar slot.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates a `PlainDate` from a parsed date-time string.
    pub(crate) fn from_parse_record(record: ParseRecord<'_>) -> TemporalResult<Self> {
        let date = record
            .date
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate))?;
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();
        Self::new_with_overflow(
            date.year,
            date.month,
            date.day,
            calendar,
            ArithmeticOverflow::Reject,
        )
    }

    /// Returns the date after adding the given duration to date.
    ///
    /// Time units are balanced into whole days, and any remainder is dropped.
    ///
    /// Equivalent: `AddDurationToDate`
    #[inline]
    pub(crate) fn add_date(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        // 1. Let overflow be ? GetTemporalOverflowOption(options).
        let overflow = overflow.unwrap_or_default();
        // 2. Let dateDuration be ToDateDurationRecordWithoutTime(duration).
        let time_days = duration.time().to_normalized()?.divide(NS_PER_DAY);
        let days = i128::from(duration.days())
            .checked_add(time_days)
            .and_then(|days| i64::try_from(days).ok())
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?;
        let date_duration = DateDuration::new(
            duration.years(),
            duration.months(),
            duration.weeks(),
            days,
        )?;
        // 3. Let result be ? CalendarDateAdd(calendar, temporalDate.[[ISODate]], dateDuration, overflow).
        let result = self
            .calendar
            .date_add(&self.iso, &date_duration, overflow)?
            .check_within_limits()?;
        // 4. Return ! CreateTemporalDate(result, calendar).
        Ok(Self::new_unchecked(result, self.calendar))
    }

    /// Returns a duration representing the difference between the dates one and two.
    ///
    /// Equivalent: `DifferenceTemporalPlainDate`
    pub(crate) fn diff_date(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        // 1. If CalendarEquals(temporalDate.[[Calendar]], other.[[Calendar]]) is false, throw a RangeError exception.
        if self.calendar != other.calendar {
            return Err(TemporalError::range().with_enum(ErrorMessage::CalendarMismatch));
        }

        // 2. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, DATE, « », "day", "day").
        let resolved =
            ResolvedRoundingOptions::from_diff_settings(settings, op, Unit::Day, Unit::Day)?;
        if !resolved.largest_unit.is_date_unit() || !resolved.smallest_unit.is_date_unit() {
            return Err(
                TemporalError::range().with_message("PlainDate differences only accept date units.")
            );
        }

        // 3. If CompareISODate(temporalDate.[[ISODate]], other.[[ISODate]]) = 0, then
        if self.iso == other.iso {
            // a. Return ! CreateTemporalDuration(0, 0, 0, 0, 0, 0, 0, 0, 0, 0).
            return Ok(Duration::default());
        }

        // 4. Let dateDifference be ? CalendarDateUntil(calendar, temporalDate.[[ISODate]], other.[[ISODate]], settings.[[LargestUnit]]).
        let date_difference =
            self.calendar
                .date_until(&self.iso, &other.iso, resolved.largest_unit)?;
        let mut duration = Duration::from(date_difference);

        // 5. If settings.[[SmallestUnit]] is not day or settings.[[RoundingIncrement]] ≠ 1, then
        if resolved.smallest_unit != Unit::Day || resolved.increment.get() != 1 {
            // a. Let isoDateTime be CombineISODateAndTimeRecord(temporalDate.[[ISODate]], MidnightTimeRecord()).
            let dt = PlainDateTime::new_unchecked(
                IsoDateTime::new_unchecked(self.iso, IsoTime::default()),
                self.calendar,
            );
            // b. Let destEpochNs be GetUTCEpochNanoseconds(CombineISODateAndTimeRecord(other.[[ISODate]], MidnightTimeRecord())).
            let dest_epoch_ns =
                IsoDateTime::new_unchecked(other.iso, IsoTime::default()).as_nanoseconds();
            // c. Set duration to ? RoundRelativeDuration(duration, destEpochNs, isoDateTime, unset, calendar,
            //    settings.[[LargestUnit]], settings.[[RoundingIncrement]], settings.[[SmallestUnit]],
            //    settings.[[RoundingMode]]).
            let record =
                NormalizedDurationRecord::new(date_difference, NormalizedTimeDuration::default())?;
            duration = record.round_relative_duration(dest_epoch_ns, &dt, None, &resolved)?;
        }

        // 6. If operation is since, set duration to CreateNegatedTemporalDuration(duration).
        match op {
            DifferenceOperation::Until => Ok(duration),
            DifferenceOperation::Since => Ok(duration.negated()),
        }
    }
}

// ==== Public API ====

impl PlainDate {
    /// Creates a new `PlainDate`, constraining an out of range month or day.
    #[inline]
    pub fn new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, day, calendar, ArithmeticOverflow::Constrain)
    }

    /// Creates a new `PlainDate`, rejecting an out of range month or day.
    #[inline]
    pub fn try_new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, day, calendar, ArithmeticOverflow::Reject)
    }

    /// Creates a new `PlainDate` from ISO fields with the provided overflow option.
    #[inline]
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        calendar: Calendar,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<Self> {
        let iso = IsoDate::new_with_overflow(year, month, day, overflow)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a `PlainDate` from calendar fields, which are read in the
    /// reckoning of `calendar`.
    ///
    /// ```rust
    /// use temporal_engine::{partial::CalendarFields, Calendar, PlainDate};
    /// use tinystr::tinystr;
    ///
    /// let fields = CalendarFields::new()
    ///     .with_year(2019)
    ///     .with_month(2)
    ///     .with_day(30);
    ///
    /// let date = PlainDate::from_partial(fields, Calendar::ISO, None).unwrap();
    /// assert_eq!((date.iso_month(), date.iso_day()), (2, 28));
    ///
    /// // The ISO calendar does not read eras.
    /// let fields = CalendarFields::new()
    ///     .with_era(tinystr!(16, "ce"), 2019)
    ///     .with_month(4)
    ///     .with_day(30);
    /// assert!(PlainDate::from_partial(fields, Calendar::ISO, None).is_err());
    /// ```
    pub fn from_partial(
        fields: CalendarFields,
        calendar: Calendar,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        let iso = calendar
            .date_from_fields(&fields, overflow.unwrap_or_default())?
            .check_within_limits()?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Returns this `PlainDate` viewed in another calendar.
    #[inline]
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.iso, calendar)
    }

    #[inline]
    #[must_use]
    /// Returns this `PlainDate`'s ISO year value.
    pub const fn iso_year(&self) -> i32 {
        self.iso.year
    }

    #[inline]
    #[must_use]
    /// Returns this `PlainDate`'s ISO month value.
    pub const fn iso_month(&self) -> u8 {
        self.iso.month
    }

    #[inline]
    #[must_use]
    /// Returns this `PlainDate`'s ISO day value.
    pub const fn iso_day(&self) -> u8 {
        self.iso.day
    }

    #[inline]
    #[must_use]
    /// Returns a reference to this `PlainDate`'s calendar slot.
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Adds a `Duration` to the current `PlainDate`.
    pub fn add(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        self.add_date(duration, overflow)
    }

    /// Subtracts a `Duration` from the current `PlainDate`.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        self.add_date(&duration.negated(), overflow)
    }

    /// Returns the `Duration` from this date until `other`.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_date(DifferenceOperation::Until, other, settings)
    }

    /// Returns the `Duration` from `other` since this date.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_date(DifferenceOperation::Since, other, settings)
    }

    /// Compares two dates by their ISO fields, then by calendar identifier.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.iso
            .cmp(&other.iso)
            .then_with(|| self.calendar.identifier().cmp(other.calendar.identifier()))
    }

    /// Combines this date with a time, or midnight when `time` is `None`.
    pub fn to_plain_datetime(&self, time: Option<PlainTime>) -> TemporalResult<PlainDateTime> {
        let time = time.map(|t| t.iso).unwrap_or_default();
        let iso = IsoDateTime::new(self.iso, time)?;
        Ok(PlainDateTime::new_unchecked(iso, self.calendar))
    }

    /// Resolves this date in a time zone.
    ///
    /// Without a time, the result is the first instant of the day. With a
    /// time, the local date-time is resolved with `Compatible` disambiguation.
    pub fn to_zoned_date_time_with_provider(
        &self,
        time_zone: TimeZone,
        time: Option<PlainTime>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<ZonedDateTime> {
        let epoch_ns = match time {
            None => time_zone.get_start_of_day(&self.iso, provider)?,
            Some(time) => {
                let iso = IsoDateTime::new(self.iso, time.iso)?;
                time_zone.get_epoch_nanoseconds_for(iso, Disambiguation::Compatible, provider)?
            }
        };
        Ok(ZonedDateTime::new_unchecked(
            Instant::from(epoch_ns),
            self.calendar,
            time_zone,
        ))
    }

    /// Returns the date as an ISO 8601 string with a calendar annotation.
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        IxdtfStringBuilder::default()
            .with_date(self.iso)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build()
    }
}

// ==== Calendar-derived Public API ====

impl PlainDate {
    /// Returns the calendar year value.
    pub fn year(&self) -> i32 {
        self.calendar.year(&self.iso)
    }

    /// Returns the calendar month value.
    pub fn month(&self) -> u8 {
        self.calendar.month(&self.iso)
    }

    /// Returns the calendar day value.
    pub fn day(&self) -> u8 {
        self.calendar.day(&self.iso)
    }

    /// Returns the era of the date, if the calendar has eras.
    pub fn era(&self) -> Option<TinyAsciiStr<16>> {
        self.calendar.era(&self.iso)
    }

    /// Returns the year within the era, if the calendar has eras.
    pub fn era_year(&self) -> Option<i32> {
        self.calendar.era_year(&self.iso)
    }

    /// Returns the calendar day of week value.
    pub fn day_of_week(&self) -> u16 {
        self.calendar.day_of_week(&self.iso)
    }

    /// Returns the calendar day of year value.
    pub fn day_of_year(&self) -> u16 {
        self.calendar.day_of_year(&self.iso)
    }

    /// Returns the calendar week of year value.
    pub fn week_of_year(&self) -> Option<u8> {
        self.calendar.week_of_year(&self.iso)
    }

    /// Returns the calendar year of week value.
    pub fn year_of_week(&self) -> Option<i32> {
        self.calendar.year_of_week(&self.iso)
    }

    /// Returns the calendar days in week value.
    pub fn days_in_week(&self) -> u16 {
        self.calendar.days_in_week(&self.iso)
    }

    /// Returns the calendar days in month value.
    pub fn days_in_month(&self) -> u8 {
        self.calendar.days_in_month(&self.iso)
    }

    /// Returns the calendar days in year value.
    pub fn days_in_year(&self) -> u16 {
        self.calendar.days_in_year(&self.iso)
    }

    /// Returns the calendar months in year value.
    pub fn months_in_year(&self) -> u8 {
        self.calendar.months_in_year(&self.iso)
    }

    /// Returns whether the date is in a leap year for the given calendar.
    pub fn in_leap_year(&self) -> bool {
        self.calendar.in_leap_year(&self.iso)
    }
}

// ==== Trait impls ====

impl From<PlainDateTime> for PlainDate {
    fn from(value: PlainDateTime) -> Self {
        value.to_plain_date()
    }
}

impl fmt::Display for PlainDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

impl FromStr for PlainDate {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parse_record(parse_date_time(s)?)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::{cmp::Ordering, str::FromStr};

    use tinystr::tinystr;

    use super::PlainDate;
    use crate::{
        builtins::core::{
            calendar::{testing::SINGLE_ERA, CalendarFields},
            Duration,
        },
        options::{ArithmeticOverflow, DifferenceSettings, DisplayCalendar, RoundingMode, Unit},
        Calendar,
    };

    #[test]
    fn construction_overflow() {
        assert!(PlainDate::try_new(2021, 2, 29, Calendar::ISO).is_err());
        let constrained = PlainDate::new(2021, 2, 29, Calendar::ISO).unwrap();
        assert_eq!(constrained.day(), 28);
        assert!(PlainDate::try_new(275_760, 9, 14, Calendar::ISO).is_err());
    }

    #[test]
    fn from_partial_requires_fields() {
        let fields = CalendarFields::new().with_year(2024).with_month(2);
        assert!(PlainDate::from_partial(fields, Calendar::ISO, None).is_err());

        let fields = fields.with_day(30);
        let date = PlainDate::from_partial(fields, Calendar::ISO, None).unwrap();
        assert_eq!(date.to_string(), "2024-02-29");
        assert!(
            PlainDate::from_partial(fields, Calendar::ISO, Some(ArithmeticOverflow::Reject))
                .is_err()
        );

        let fields = CalendarFields::new()
            .with_era(tinystr!(16, "ce"), 2019)
            .with_month(5)
            .with_day(1);
        let date = PlainDate::from_partial(fields, SINGLE_ERA, None).unwrap();
        assert_eq!((date.iso_year(), date.iso_month(), date.iso_day()), (2019, 5, 1));
        assert_eq!(date.calendar(), &SINGLE_ERA);
    }

    #[test]
    fn add_months_constrains() {
        let date = PlainDate::from_str("2020-01-31").unwrap();
        let one_month = Duration::from_str("P1M").unwrap();

        let result = date.add(&one_month, None).unwrap();
        assert_eq!(result.to_string(), "2020-02-29");
        assert!(date
            .add(&one_month, Some(ArithmeticOverflow::Reject))
            .is_err());

        let result = date.subtract(&Duration::from_str("P1Y1D").unwrap(), None).unwrap();
        assert_eq!(result.to_string(), "2019-01-30");

        // Time units are balanced into whole days.
        let result = date.add(&Duration::from_str("PT47H").unwrap(), None).unwrap();
        assert_eq!(result.to_string(), "2020-02-01");
    }

    #[test]
    fn until_and_since() {
        let start = PlainDate::from_str("2019-01-31").unwrap();
        let end = PlainDate::from_str("2020-03-01").unwrap();

        let days = start.until(&end, DifferenceSettings::default()).unwrap();
        assert_eq!(days.days(), 395);

        let settings = DifferenceSettings::with_largest_unit(Unit::Year);
        let result = start.until(&end, settings).unwrap();
        assert_eq!((result.years(), result.months(), result.days()), (1, 1, 1));

        let result = end.since(&start, settings).unwrap();
        assert_eq!((result.years(), result.months(), result.days()), (1, 1, 1));
        let result = start.since(&end, settings).unwrap();
        assert_eq!((result.years(), result.months(), result.days()), (-1, -1, -1));

        let settings = DifferenceSettings::with_largest_unit(Unit::Hour);
        assert!(start.until(&end, settings).is_err());

        let other = end.with_calendar(SINGLE_ERA);
        assert!(start.until(&other, DifferenceSettings::default()).is_err());
    }

    #[test]
    fn until_with_rounding() {
        let start = PlainDate::from_str("2020-01-01").unwrap();
        let end = PlainDate::from_str("2020-02-20").unwrap();

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Month),
            smallest_unit: Some(Unit::Month),
            rounding_mode: Some(RoundingMode::Nearest),
            ..Default::default()
        };
        let result = start.until(&end, settings).unwrap();
        assert_eq!((result.months(), result.days()), (2, 0));

        let settings = DifferenceSettings {
            smallest_unit: Some(Unit::Week),
            ..Default::default()
        };
        let result = start.until(&end, settings).unwrap();
        assert_eq!((result.weeks(), result.days()), (7, 0));
    }

    #[test]
    fn compare_and_calendar_fields() {
        let one = PlainDate::from_str("2019-04-30").unwrap();
        let two = PlainDate::from_str("2019-05-01[c=iso8601]")
            .unwrap()
            .with_calendar(SINGLE_ERA);
        assert_eq!(one.compare(&two), Ordering::Less);
        assert_eq!(
            one.compare(&one.with_calendar(SINGLE_ERA)),
            Ordering::Less
        );
        assert!(PlainDate::from_str("2019-05-01[c=japanese]").is_err());

        assert_eq!(one.era(), None);
        assert_eq!(two.era().as_deref(), Some("ce"));
        assert_eq!(two.era_year(), Some(2019));
        assert_eq!(two.day_of_week(), 3);
        assert_eq!(two.days_in_month(), 31);
        assert_eq!(two.to_string(), "2019-05-01[c=single-era]");
        assert_eq!(
            one.to_ixdtf_string(DisplayCalendar::Always),
            "2019-04-30[c=iso8601]"
        );
    }

    #[test]
    fn invalid_strings() {
        for invalid in ["2019-02-29", "2019-13-01", "2019-01-01Z", "2019-01-01[c=unknown]"] {
            assert!(PlainDate::from_str(invalid).is_err(), "{invalid}");
        }
        let date = PlainDate::from_str("+010000-01-01").unwrap();
        assert_eq!(date.to_string(), "+010000-01-01");
    }
}
