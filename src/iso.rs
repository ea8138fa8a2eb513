//! This module implements the internal ISO field records.
//!
//! The three record types are:
//!   - `IsoDateTime`
//!   - `IsoDate`
//!   - `IsoTime`
//!
//! An `IsoDate` holds the proleptic Gregorian year, month, and day. An
//! `IsoTime` holds the hour through nanosecond of a wall-clock time. An
//! `IsoDateTime` combines the two.
//!
//! Every value type stores its fields as ISO records, and calendars map
//! them to and from their own reckoning.

use core::num::NonZeroU128;
use ixdtf::records::TimeRecord;

use crate::{
    builtins::core::{
        calendar::Calendar,
        duration::{
            normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
            DateDuration,
        },
    },
    error::{ErrorMessage, TemporalError},
    options::{ArithmeticOverflow, ResolvedRoundingOptions, Unit},
    rounding::IncrementRounder,
    utils, TemporalResult, TemporalUnwrap, NS_MAX_INSTANT, NS_MIN_INSTANT, NS_PER_DAY,
};

/// The smallest epoch day of a valid `IsoDate`, -271821-04-19.
const MIN_EPOCH_DAYS: i64 = -100_000_001;
/// The largest epoch day of a valid `IsoDate`, +275760-09-13.
const MAX_EPOCH_DAYS: i64 = 100_000_000;

/// `IsoDateTime` is the record of the `IsoDate` and `IsoTime` fields.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDateTime {
    pub date: IsoDate,
    pub time: IsoTime,
}

impl IsoDateTime {
    /// Creates a new `IsoDateTime` without any validaiton.
    pub(crate) const fn new_unchecked(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    /// Creates a new validated `IsoDateTime` that is within valid limits.
    pub fn new(date: IsoDate, time: IsoTime) -> TemporalResult<Self> {
        let result = Self::new_unchecked(date, time);
        if !result.is_within_limits() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateTimeOutOfRange));
        }
        Ok(result)
    }

    /// Creates the local `IsoDateTime` of an epoch nanosecond value at a
    /// UTC offset.
    pub(crate) fn from_epoch_nanos(epoch_nanoseconds: i128, offset_nanoseconds: i128) -> Self {
        let (days, nanoseconds) =
            utils::epoch_ns_to_days_and_time(epoch_nanoseconds + offset_nanoseconds);
        Self::new_unchecked(
            IsoDate::from_epoch_days(days),
            IsoTime::from_nanoseconds(nanoseconds),
        )
    }

    /// Returns whether the `IsoDateTime` is within valid limits.
    ///
    /// Date-times may be up to one day outside of the instant range so that
    /// any valid instant has a local representation at every offset.
    pub(crate) fn is_within_limits(&self) -> bool {
        let nanoseconds = self.as_nanoseconds();
        let ns_per_day = i128::from(NS_PER_DAY);
        (NS_MIN_INSTANT - ns_per_day) < nanoseconds && nanoseconds < (NS_MAX_INSTANT + ns_per_day)
    }

    /// Returns this `IsoDateTime` in nanoseconds since the epoch, read as UTC.
    pub fn as_nanoseconds(&self) -> i128 {
        i128::from(self.date.to_epoch_days()) * i128::from(NS_PER_DAY)
            + i128::from(self.time.as_nanoseconds())
    }

    /// Adds a date duration and a time duration to this date-time.
    ///
    /// The time duration is carried through the time of day, and any whole
    /// days that overflow are added to the date duration's days.
    pub(crate) fn add_date_duration(
        &self,
        calendar: &Calendar,
        date_duration: &DateDuration,
        norm: NormalizedTimeDuration,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<Self> {
        let (days, time) = self.time.add(norm);
        let date_duration = DateDuration {
            days: date_duration
                .days
                .checked_add(days)
                .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?,
            ..*date_duration
        };

        let added_date = calendar.date_add(&self.date, &date_duration, overflow)?;
        Ok(Self::new_unchecked(added_date, time))
    }

    /// Rounds this date-time, carrying into the date.
    pub(crate) fn round(&self, resolved_options: ResolvedRoundingOptions) -> TemporalResult<Self> {
        let (rounded_days, rounded_time) = self.time.round(resolved_options)?;
        let date = self.date.add_days(rounded_days)?;
        Self::new(date, rounded_time)
    }

    /// Differences this date-time against `other` with a calendar, producing
    /// an unrounded duration record up to `largest_unit`.
    pub(crate) fn diff(
        &self,
        other: &Self,
        calendar: &Calendar,
        largest_unit: Unit,
    ) -> TemporalResult<NormalizedDurationRecord> {
        let mut time_duration = self.time.diff(&other.time);
        let time_sign = time_duration.sign() as i8;
        let date_sign = other.date.cmp(&self.date) as i8;

        // Borrow a day from the date difference when the time difference
        // points the other way.
        let mut adjusted_date = other.date;
        if time_sign != 0 && time_sign == -date_sign {
            adjusted_date = IsoDate::from_epoch_days(
                adjusted_date.to_epoch_days() + i64::from(time_sign),
            );
            time_duration = time_duration.add_days(-i64::from(time_sign))?;
        }

        let date_largest_unit = largest_unit.max(Unit::Day);
        let date_diff = calendar.date_until(&self.date, &adjusted_date, date_largest_unit)?;

        let days = if largest_unit == date_largest_unit {
            date_diff.days
        } else {
            time_duration = time_duration.add_days(date_diff.days)?;
            0
        };

        NormalizedDurationRecord::new(
            DateDuration {
                years: date_diff.years,
                months: date_diff.months,
                weeks: date_diff.weeks,
                days,
            },
            time_duration,
        )
    }
}

// ==== `IsoDate` section ====

/// `IsoDate` serves as a record for the ISO year, month, and day.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl Default for IsoDate {
    fn default() -> Self {
        Self::new_unchecked(1970, 1, 1)
    }
}

impl IsoDate {
    /// Creates a new `IsoDate` without determining the validity.
    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Creates a new regulated `IsoDate` that is within the valid range.
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<Self> {
        Self::regulate(year, month, day, overflow)?.check_within_limits()
    }

    /// Regulates the month and day per the overflow option, without checking
    /// the representable range.
    pub(crate) fn regulate(
        year: i32,
        month: u8,
        day: u8,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<Self> {
        if month == 0 || day == 0 {
            return Err(TemporalError::range().with_enum(ErrorMessage::InvalidDate));
        }
        match overflow {
            ArithmeticOverflow::Constrain => {
                let month = month.min(12);
                let day = day.min(utils::iso_days_in_month(year, month));
                Ok(Self::new_unchecked(year, month, day))
            }
            ArithmeticOverflow::Reject => {
                let date = Self::new_unchecked(year, month, day);
                if !date.is_valid() {
                    return Err(TemporalError::range().with_enum(ErrorMessage::DateOverflowReject));
                }
                Ok(date)
            }
        }
    }

    /// Creates an `IsoDate` from an epoch day.
    pub(crate) fn from_epoch_days(epoch_days: i64) -> Self {
        let (year, month, day) = utils::ymd_from_epoch_days(epoch_days);
        Self::new_unchecked(year, month, day)
    }

    /// Returns the epoch day of this date.
    pub(crate) fn to_epoch_days(self) -> i64 {
        utils::epoch_days_from_gregorian_date(self.year, self.month, self.day)
    }

    /// Returns whether the month and day are valid for the year.
    pub(crate) fn is_valid(self) -> bool {
        (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= utils::iso_days_in_month(self.year, self.month)
    }

    /// Returns whether the date is within the representable range.
    pub(crate) fn is_within_limits(self) -> bool {
        (MIN_EPOCH_DAYS..=MAX_EPOCH_DAYS).contains(&self.to_epoch_days())
    }

    pub(crate) fn check_within_limits(self) -> TemporalResult<Self> {
        if !self.is_within_limits() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        Ok(self)
    }

    /// Adds a number of days, failing when the result is out of range.
    pub(crate) fn add_days(self, days: i64) -> TemporalResult<Self> {
        let epoch_days = self
            .to_epoch_days()
            .checked_add(days)
            .filter(|d| (MIN_EPOCH_DAYS..=MAX_EPOCH_DAYS).contains(d))
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))?;
        Ok(Self::from_epoch_days(epoch_days))
    }
}

// ==== `IsoTime` section ====

/// An `IsoTime` record that contains the wall-clock fields.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoTime {
    pub hour: u8,         // 0..=23
    pub minute: u8,       // 0..=59
    pub second: u8,       // 0..=59
    pub millisecond: u16, // 0..=999
    pub microsecond: u16, // 0..=999
    pub nanosecond: u16,  // 0..=999
}

impl IsoTime {
    /// Creates a new `IsoTime` without any validation.
    pub(crate) const fn new_unchecked(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        }
    }

    /// Creates a new regulated `IsoTime`.
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoTime> {
        let time = Self::new_unchecked(hour, minute, second, millisecond, microsecond, nanosecond);
        match overflow {
            ArithmeticOverflow::Constrain => Ok(Self::new_unchecked(
                hour.min(23),
                minute.min(59),
                second.min(59),
                millisecond.min(999),
                microsecond.min(999),
                nanosecond.min(999),
            )),
            ArithmeticOverflow::Reject if time.is_valid() => Ok(time),
            ArithmeticOverflow::Reject => {
                Err(TemporalError::range().with_enum(ErrorMessage::InvalidTime))
            }
        }
    }

    /// Creates an `IsoTime` from a parsed time, constraining a leap second to 59.
    pub(crate) fn from_time_record(record: TimeRecord) -> TemporalResult<Self> {
        let subsecond = match record.fraction {
            Some(fraction) => fraction
                .to_nanoseconds()
                .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserInvalidFraction))?,
            None => 0,
        };
        Ok(Self::new_unchecked(
            record.hour,
            record.minute,
            record.second.min(59),
            (subsecond / 1_000_000) as u16,
            ((subsecond / 1_000) % 1_000) as u16,
            (subsecond % 1_000) as u16,
        ))
    }

    /// Creates an `IsoTime` from nanoseconds since midnight.
    ///
    /// The value must be below one day.
    pub(crate) fn from_nanoseconds(nanoseconds: u64) -> Self {
        debug_assert!(nanoseconds < NS_PER_DAY);
        let nanosecond = (nanoseconds % 1000) as u16;
        let microsecond = ((nanoseconds / 1_000) % 1000) as u16;
        let millisecond = ((nanoseconds / 1_000_000) % 1000) as u16;
        let second = ((nanoseconds / 1_000_000_000) % 60) as u8;
        let minute = ((nanoseconds / 60_000_000_000) % 60) as u8;
        let hour = ((nanoseconds / 3_600_000_000_000) % 24) as u8;
        Self::new_unchecked(hour, minute, second, millisecond, microsecond, nanosecond)
    }

    /// Returns the nanoseconds since midnight.
    pub(crate) fn as_nanoseconds(&self) -> u64 {
        let minutes = u64::from(self.hour) * 60 + u64::from(self.minute);
        let seconds = minutes * 60 + u64::from(self.second);
        let millis = seconds * 1000 + u64::from(self.millisecond);
        let micros = millis * 1000 + u64::from(self.microsecond);
        micros * 1000 + u64::from(self.nanosecond)
    }

    /// Balances a nanosecond count into whole days and a time of day.
    pub(crate) fn balance(nanoseconds: i128) -> (i64, Self) {
        let (days, time) = utils::epoch_ns_to_days_and_time(nanoseconds);
        (days, Self::from_nanoseconds(time))
    }

    /// Returns `other - self` as a time duration.
    pub(crate) fn diff(&self, other: &Self) -> NormalizedTimeDuration {
        NormalizedTimeDuration(
            i128::from(other.as_nanoseconds()) - i128::from(self.as_nanoseconds()),
        )
    }

    /// Rounds the current `IsoTime` according to the provided settings,
    /// returning a day carry of zero or one.
    ///
    /// Each valid increment evenly divides the next larger unit, so rounding
    /// the nanoseconds since midnight is equivalent to rounding within the
    /// enclosing unit.
    pub(crate) fn round(
        &self,
        resolved_options: ResolvedRoundingOptions,
    ) -> TemporalResult<(i64, Self)> {
        let length = resolved_options
            .smallest_unit
            .as_nanoseconds()
            .and_then(|ns| NonZeroU128::new(ns.into()))
            .ok_or(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?;

        let increment = resolved_options
            .increment
            .as_extended_increment()
            .checked_mul(length)
            .temporal_unwrap()?;

        let rounded = IncrementRounder::<i128>::from_signed_num(
            i128::from(self.as_nanoseconds()),
            increment,
        )?
        .round_with_options(&resolved_options);

        Ok(Self::balance(rounded))
    }

    /// Checks if the time is a valid `IsoTime`
    pub(crate) fn is_valid(&self) -> bool {
        self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
            && self.millisecond <= 999
            && self.microsecond <= 999
            && self.nanosecond <= 999
    }

    /// Adds a time duration, returning the day carry and the new time.
    pub(crate) fn add(&self, norm: NormalizedTimeDuration) -> (i64, Self) {
        Self::balance(i128::from(self.as_nanoseconds()) + norm.0)
    }
}
