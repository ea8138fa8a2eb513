//! This module implements `Duration` along with it's methods and components.

use crate::{
    builtins::core::PlainDateTime,
    error::ErrorMessage,
    iso::{IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, RelativeTo, ResolvedRoundingOptions, RoundingIncrement,
        RoundingOptions, ToStringRoundingOptions, Unit,
    },
    parsers::{self, FormattableDateDuration, FormattableDuration},
    provider::TimeZoneProvider,
    Sign, TemporalError, TemporalResult,
};
use alloc::string::String;
use core::{cmp::Ordering, str::FromStr};
use ixdtf::records::{Fraction, TimeDurationRecord};
use writeable::Writeable;

use self::normalized::NormalizedDurationRecord;

mod date;
pub(crate) mod normalized;
mod time;


#[doc(inline)]
pub use date::DateDuration;
#[doc(inline)]
pub use time::TimeDuration;

/// A `PartialDuration` is a Duration that may have fields not set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDuration {
    /// A potentially existent `years` field.
    pub years: Option<i64>,
    /// A potentially existent `months` field.
    pub months: Option<i64>,
    /// A potentially existent `weeks` field.
    pub weeks: Option<i64>,
    /// A potentially existent `days` field.
    pub days: Option<i64>,
    /// A potentially existent `hours` field.
    pub hours: Option<i64>,
    /// A potentially existent `minutes` field.
    pub minutes: Option<i64>,
    /// A potentially existent `seconds` field.
    pub seconds: Option<i64>,
    /// A potentially existent `milliseconds` field.
    pub milliseconds: Option<i64>,
    /// A potentially existent `microseconds` field.
    pub microseconds: Option<i128>,
    /// A potentially existent `nanoseconds` field.
    pub nanoseconds: Option<i128>,
}

impl PartialDuration {
    /// Returns whether the `PartialDuration` is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A signed length of time made up of date and time units.
///
/// `Duration` is made up of a `DateDuration` and a `TimeDuration`. All
/// non-zero fields share one sign.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    date: DateDuration,
    time: TimeDuration,
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let formattable = duration_to_formattable(self, crate::options::Precision::Auto)
            .map_err(|_| core::fmt::Error)?;
        formattable.write_to(f)
    }
}

// ==== Private Creation methods ====

impl Duration {
    /// Creates a new `Duration` from a `DateDuration` and `TimeDuration`.
    #[inline]
    pub(crate) const fn new_unchecked(date: DateDuration, time: TimeDuration) -> Self {
        Self { date, time }
    }

    /// Balances a normalized record into a `Duration` with the time portion
    /// carried up to `largest_unit`.
    ///
    /// Equivalent: `TemporalDurationFromInternal`
    pub(crate) fn from_normalized(
        duration_record: NormalizedDurationRecord,
        largest_unit: Unit,
    ) -> TemporalResult<Self> {
        let (overflow_day, time) = TimeDuration::from_normalized(
            duration_record.normalized_time_duration(),
            largest_unit,
        )?;
        let date = duration_record.date();
        let days = date
            .days
            .checked_add(overflow_day)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?;
        Self::from_parts(
            DateDuration::new_unchecked(date.years, date.months, date.weeks, days),
            time,
        )
    }

    fn from_parts(date: DateDuration, time: TimeDuration) -> TemporalResult<Self> {
        is_valid_duration(&date, &time)?;
        Ok(Self::new_unchecked(date, time))
    }

    /// Returns this duration as a normalized record.
    pub(crate) fn to_normalized(self) -> TemporalResult<NormalizedDurationRecord> {
        NormalizedDurationRecord::new(self.date, self.time.to_normalized()?)
    }

    /// Returns the largest unit with a non-zero field, or nanoseconds.
    ///
    /// Equivalent: `DefaultTemporalLargestUnit`
    pub(crate) fn default_largest_unit(&self) -> Unit {
        let fields = [
            (i128::from(self.date.years), Unit::Year),
            (i128::from(self.date.months), Unit::Month),
            (i128::from(self.date.weeks), Unit::Week),
            (i128::from(self.date.days), Unit::Day),
            (i128::from(self.time.hours), Unit::Hour),
            (i128::from(self.time.minutes), Unit::Minute),
            (i128::from(self.time.seconds), Unit::Second),
            (i128::from(self.time.milliseconds), Unit::Millisecond),
            (self.time.microseconds, Unit::Microsecond),
        ];
        fields
            .into_iter()
            .find(|(value, _)| *value != 0)
            .map_or(Unit::Nanosecond, |(_, unit)| unit)
    }
}

// ==== Public Duration API ====

impl Duration {
    /// Creates a new validated `Duration`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        years: i64,
        months: i64,
        weeks: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> TemporalResult<Self> {
        Self::from_parts(
            DateDuration::new_unchecked(years, months, weeks, days),
            TimeDuration::new_unchecked(
                hours,
                minutes,
                seconds,
                milliseconds,
                microseconds,
                nanoseconds,
            ),
        )
    }

    /// Creates a `Duration` from a provided `PartialDuration`.
    ///
    /// At least one field must be set.
    pub fn from_partial_duration(partial: PartialDuration) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::r#type().with_message("PartialDuration cannot be empty."));
        }
        Self::new(
            partial.years.unwrap_or_default(),
            partial.months.unwrap_or_default(),
            partial.weeks.unwrap_or_default(),
            partial.days.unwrap_or_default(),
            partial.hours.unwrap_or_default(),
            partial.minutes.unwrap_or_default(),
            partial.seconds.unwrap_or_default(),
            partial.milliseconds.unwrap_or_default(),
            partial.microseconds.unwrap_or_default(),
            partial.nanoseconds.unwrap_or_default(),
        )
    }

    /// Compares two durations.
    ///
    /// Durations with calendar units need a `relative_to` anchor. With a
    /// zoned anchor, days are measured through the time zone.
    pub fn compare_with_provider(
        &self,
        other: &Duration,
        relative_to: Option<RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Ordering> {
        if self == other {
            return Ok(Ordering::Equal);
        }
        // 1. Let largestUnit1 and largestUnit2 be the default largest units.
        let largest_unit_1 = self.default_largest_unit();
        let largest_unit_2 = other.default_largest_unit();
        // 2. If there is a zoned anchor and either contains date units,
        //    compare the instants each reaches from the anchor.
        if let Some(RelativeTo::ZonedDateTime(zdt)) = relative_to.as_ref() {
            if largest_unit_1.is_date_unit() || largest_unit_2.is_date_unit() {
                let after1 = zdt.add_as_instant(self, ArithmeticOverflow::Constrain, provider)?;
                let after2 = zdt.add_as_instant(other, ArithmeticOverflow::Constrain, provider)?;
                return Ok(after1.cmp(&after2));
            }
        }
        // 3. Calendar units are converted to days through a plain anchor.
        let (days1, days2) =
            if largest_unit_1.is_calendar_unit() || largest_unit_2.is_calendar_unit() {
                let Some(RelativeTo::PlainDate(date)) = relative_to.as_ref() else {
                    return Err(TemporalError::range().with_enum(ErrorMessage::RelativeToRequired));
                };
                (self.date.days(date)?, other.date.days(date)?)
            } else {
                (self.date.days, other.date.days)
            };
        // 4. Compare the exact totals with 24-hour days.
        let time_duration_1 = self.time.to_normalized()?.add_days(days1)?;
        let time_duration_2 = other.time.to_normalized()?.add_days(days2)?;
        Ok(time_duration_1.cmp(&time_duration_2))
    }
}

// ==== Public `Duration` Getters/Setters ====

impl Duration {
    /// Returns a reference to the inner `TimeDuration`
    #[inline]
    #[must_use]
    pub fn time(&self) -> &TimeDuration {
        &self.time
    }

    /// Returns a reference to the inner `DateDuration`
    #[inline]
    #[must_use]
    pub fn date(&self) -> &DateDuration {
        &self.date
    }

    /// Returns the `years` field of duration.
    #[inline]
    #[must_use]
    pub const fn years(&self) -> i64 {
        self.date.years
    }

    /// Returns the `months` field of duration.
    #[inline]
    #[must_use]
    pub const fn months(&self) -> i64 {
        self.date.months
    }

    /// Returns the `weeks` field of duration.
    #[inline]
    #[must_use]
    pub const fn weeks(&self) -> i64 {
        self.date.weeks
    }

    /// Returns the `days` field of duration.
    #[inline]
    #[must_use]
    pub const fn days(&self) -> i64 {
        self.date.days
    }

    /// Returns the `hours` field of duration.
    #[inline]
    #[must_use]
    pub const fn hours(&self) -> i64 {
        self.time.hours
    }

    /// Returns the `minutes` field of duration.
    #[inline]
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        self.time.minutes
    }

    /// Returns the `seconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.time.seconds
    }

    /// Returns the `milliseconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn milliseconds(&self) -> i64 {
        self.time.milliseconds
    }

    /// Returns the `microseconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn microseconds(&self) -> i128 {
        self.time.microseconds
    }

    /// Returns the `nanoseconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn nanoseconds(&self) -> i128 {
        self.time.nanoseconds
    }
}

// ==== Public Duration methods ====

impl Duration {
    /// Determines the sign for the current self.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        match self.date.sign() {
            Sign::Zero => self.time.sign(),
            sign => sign,
        }
    }

    /// Returns whether the current `Duration` is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    /// Returns a negated `Duration`
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            date: self.date.negated(),
            time: self.time.negated(),
        }
    }

    /// Returns the absolute value of `Duration`.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            date: self.date.abs(),
            time: self.time.abs(),
        }
    }

    /// Returns the result of adding a `Duration` to the current `Duration`.
    ///
    /// Neither duration may contain years, months, or weeks.
    pub fn add(&self, other: &Self) -> TemporalResult<Self> {
        // 1. Let largestUnit be the larger of the two default largest units.
        let largest_unit = self
            .default_largest_unit()
            .max(other.default_largest_unit());
        // 2. If IsCalendarUnit(largestUnit), throw a RangeError exception.
        if largest_unit.is_calendar_unit() {
            return Err(TemporalError::range().with_message(
                "Largest unit cannot be a calendar unit when adding two durations.",
            ));
        }
        // 3. Add both exact totals with 24-hour days.
        let norm_one = self.time.to_normalized()?.add_days(self.date.days)?;
        let norm_two = other.time.to_normalized()?.add_days(other.date.days)?;
        let result = (norm_one + norm_two)?;
        // 4. Balance the result up to largestUnit.
        Self::from_normalized(
            NormalizedDurationRecord::new(DateDuration::default(), result)?,
            largest_unit,
        )
    }

    /// Returns the result of subtracting a `Duration` from the current `Duration`
    #[inline]
    pub fn subtract(&self, other: &Self) -> TemporalResult<Self> {
        self.add(&other.negated())
    }

    /// Rounds the current `Duration` and balances it up to the largest unit.
    ///
    /// Calendar units require a `relative_to` anchor. Without one, days
    /// are treated as 24 hours.
    pub fn round_with_provider(
        &self,
        options: RoundingOptions,
        relative_to: Option<RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        // 1. Resolve the options against the existing largest unit.
        let existing_largest_unit = self.default_largest_unit();
        let resolved_options =
            ResolvedRoundingOptions::from_duration_options(options, existing_largest_unit)?;

        // 2. If nothing would change, return the duration as is.
        let hours_to_days_may_occur = (self.date.days != 0
            && matches!(relative_to, Some(RelativeTo::ZonedDateTime(_))))
            || self.time.hours.unsigned_abs() >= 24;
        if resolved_options.is_noop()
            && resolved_options.largest_unit == existing_largest_unit
            && !hours_to_days_may_occur
        {
            return Ok(*self);
        }

        match relative_to {
            // 3. With a zoned anchor, difference the anchor and the instant
            //    the duration reaches from it.
            Some(RelativeTo::ZonedDateTime(zdt)) => {
                let target_epoch_ns =
                    zdt.add_as_instant(self, ArithmeticOverflow::Constrain, provider)?;
                let target = zdt.with_epoch_nanoseconds(target_epoch_ns);
                zdt.diff_with_rounding(&target, &resolved_options, provider)
            }
            // 4. With a plain anchor, difference the anchor at midnight and
            //    the date-time the duration reaches from it.
            Some(RelativeTo::PlainDate(plain_date)) => {
                let (days, time) = IsoTime::default().add(self.time.to_normalized()?);
                let date_duration = DateDuration::new(
                    self.date.years,
                    self.date.months,
                    self.date.weeks,
                    self.date
                        .days
                        .checked_add(days)
                        .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?,
                )?;
                let target_date = plain_date.calendar().date_add(
                    &plain_date.iso,
                    &date_duration,
                    ArithmeticOverflow::Constrain,
                )?;
                let start = PlainDateTime::new_unchecked(
                    IsoDateTime::new_unchecked(plain_date.iso, IsoTime::default()),
                    *plain_date.calendar(),
                );
                let target = IsoDateTime::new(target_date, time)?;
                start.diff_dt_with_rounding(&target, &resolved_options)
            }
            // 5. Without an anchor, only days and time units can be rounded.
            None => {
                if self.date.has_calendar_units() || resolved_options.largest_unit.is_calendar_unit()
                {
                    return Err(TemporalError::range().with_enum(ErrorMessage::RelativeToRequired));
                }
                let norm = self.time.to_normalized()?.add_days(self.date.days)?;
                let rounded = norm.round(&resolved_options)?;
                Self::from_normalized(
                    NormalizedDurationRecord::new(DateDuration::default(), rounded)?,
                    resolved_options.largest_unit,
                )
            }
        }
    }

    /// Returns the `Duration` as a formatted string
    pub fn as_temporal_string(&self, options: ToStringRoundingOptions) -> TemporalResult<String> {
        if matches!(options.smallest_unit, Some(Unit::Hour | Unit::Minute)) {
            return Err(TemporalError::range().with_message(
                "string rounding options cannot have hour or minute smallest unit.",
            ));
        }

        let resolved_options = options.resolve()?;
        if resolved_options.smallest_unit == Unit::Nanosecond
            && resolved_options.increment == RoundingIncrement::ONE
        {
            let duration = duration_to_formattable(self, resolved_options.precision)?;
            return Ok(duration.write_to_string().into_owned());
        }

        let rounding_options = ResolvedRoundingOptions::from_to_string_options(&resolved_options);

        // 1. Let largestUnit be DefaultTemporalLargestUnit(duration).
        let largest = self.default_largest_unit();
        // 2. Round the time portion only; days are not carried into.
        let record = self.to_normalized()?;
        let rounded = record.normalized_time_duration().round(&rounding_options)?;
        let record = NormalizedDurationRecord::new(record.date(), rounded)?;
        // 3. Balance up to at least seconds.
        let rounded_largest = largest.max(Unit::Second);
        let rounded = Self::from_normalized(record, rounded_largest)?;

        Ok(duration_to_formattable(&rounded, resolved_options.precision)?
            .write_to_string()
            .into_owned())
    }
}

/// Builds the formattable representation of a `Duration`.
pub(crate) fn duration_to_formattable(
    duration: &Duration,
    precision: crate::options::Precision,
) -> TemporalResult<FormattableDuration> {
    let sign = duration.sign();
    let duration = duration.abs();
    let date = (duration.date.sign() != Sign::Zero).then(|| FormattableDateDuration {
        years: duration.years().unsigned_abs(),
        months: duration.months().unsigned_abs(),
        weeks: duration.weeks().unsigned_abs(),
        days: duration.days().unsigned_abs(),
    });

    // Seconds and smaller units are combined into a decimal seconds value.
    let seconds = TimeDuration::new_unchecked(
        0,
        0,
        duration.seconds(),
        duration.milliseconds(),
        duration.microseconds(),
        duration.nanoseconds(),
    )
    .to_normalized()?;

    Ok(FormattableDuration {
        precision,
        sign,
        date,
        hours: duration.hours().unsigned_abs(),
        minutes: duration.minutes().unsigned_abs(),
        seconds: seconds.seconds().unsigned_abs(),
        subseconds: seconds.subseconds().unsigned_abs(),
    })
}

/// The exclusive bound on years, months, and weeks.
const TWO_POWER_THIRTY_TWO: u64 = 1 << 32;

/// Checks whether the `Duration` fields are valid.
///
/// Equivalent: `IsValidDuration`
pub(crate) fn is_valid_duration(date: &DateDuration, time: &TimeDuration) -> TemporalResult<()> {
    // 1. Let sign be DurationSign of all fields.
    let fields = date
        .fields()
        .into_iter()
        .map(i128::from)
        .chain(time.fields());
    let sign = duration_sign(fields.clone());
    // 2. No non-zero field may disagree with sign.
    let mut fields = fields;
    if fields.any(|v| (v < 0 && sign == Sign::Positive) || (v > 0 && sign == Sign::Negative)) {
        return Err(TemporalError::range().with_enum(ErrorMessage::DurationMixedSign));
    }
    // 3. Years, months, and weeks must be below 2^32 in magnitude.
    if date.years.unsigned_abs() >= TWO_POWER_THIRTY_TWO
        || date.months.unsigned_abs() >= TWO_POWER_THIRTY_TWO
        || date.weeks.unsigned_abs() >= TWO_POWER_THIRTY_TWO
    {
        return Err(TemporalError::range().with_enum(ErrorMessage::DurationNotValid));
    }
    // 4. The days and time total must be below 2^53 seconds in magnitude.
    let total = time
        .checked_total_nanoseconds()
        .and_then(|ns| ns.checked_add(i128::from(date.days) * i128::from(crate::NS_PER_DAY)))
        .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?;
    if total.unsigned_abs() > normalized::MAX_TIME_DURATION.unsigned_abs() {
        return Err(TemporalError::range().with_enum(ErrorMessage::DurationNotValid));
    }
    Ok(())
}

/// Determines the sign of a set of `Duration` fields from the first
/// non-zero value.
///
/// Equivalent: `DurationSign`
#[inline]
#[must_use]
pub(crate) fn duration_sign(fields: impl Iterator<Item = i128>) -> Sign {
    fields
        .map(|v| Sign::from(v.cmp(&0)))
        .find(|sign| *sign != Sign::Zero)
        .unwrap_or(Sign::Zero)
}

impl From<TimeDuration> for Duration {
    fn from(value: TimeDuration) -> Self {
        Self {
            time: value,
            date: DateDuration::default(),
        }
    }
}

impl From<DateDuration> for Duration {
    fn from(value: DateDuration) -> Self {
        Self {
            date: value,
            time: TimeDuration::default(),
        }
    }
}

// ==== FromStr trait impl ====

/// Splits nanoseconds below one minute into seconds, milliseconds,
/// microseconds and nanoseconds.
fn split_subminute(nanoseconds: u64) -> (u64, u64, u64, u64) {
    let seconds = nanoseconds / 1_000_000_000;
    let rem = nanoseconds % 1_000_000_000;
    (seconds, rem / 1_000_000, (rem % 1_000_000) / 1_000, rem % 1_000)
}

fn fraction_nanoseconds(fraction: Option<Fraction>) -> TemporalResult<u64> {
    match fraction {
        Some(fraction) => fraction
            .to_nanoseconds()
            .map(u64::from)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserInvalidFraction)),
        None => Ok(0),
    }
}

impl FromStr for Duration {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_record = parsers::parse_duration(s)?;

        let (hours, minutes, seconds, millis, micros, nanos) = match parse_record.time {
            Some(TimeDurationRecord::Hours { hours, fraction }) => {
                // A fractional hour is carried exactly into minutes and below.
                let fraction_ns = fraction_nanoseconds(fraction)? * 3600;
                let minutes = fraction_ns / 60_000_000_000;
                let (seconds, millis, micros, nanos) =
                    split_subminute(fraction_ns % 60_000_000_000);
                (hours, minutes, seconds, millis, micros, nanos)
            }
            Some(TimeDurationRecord::Minutes {
                hours,
                minutes,
                fraction,
            }) => {
                let fraction_ns = fraction_nanoseconds(fraction)? * 60;
                let (seconds, millis, micros, nanos) = split_subminute(fraction_ns);
                (hours, minutes, seconds, millis, micros, nanos)
            }
            Some(TimeDurationRecord::Seconds {
                hours,
                minutes,
                seconds,
                fraction,
            }) => {
                let fraction_ns = fraction_nanoseconds(fraction)?;
                let (_, millis, micros, nanos) = split_subminute(fraction_ns);
                (hours, minutes, seconds, millis, micros, nanos)
            }
            None => (0, 0, 0, 0, 0, 0),
        };

        let (years, months, weeks, days) = parse_record
            .date
            .map_or((0, 0, 0, 0), |date| {
                (
                    u64::from(date.years),
                    u64::from(date.months),
                    u64::from(date.weeks),
                    date.days,
                )
            });

        let sign = i64::from(parse_record.sign as i8);
        let signed = |value: u64| -> TemporalResult<i64> {
            i64::try_from(value)
                .map(|v| v * sign)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationNotValid))
        };

        Self::new(
            signed(years)?,
            signed(months)?,
            signed(weeks)?,
            signed(days)?,
            signed(hours)?,
            signed(minutes)?,
            signed(seconds)?,
            signed(millis)?,
            i128::from(signed(micros)?),
            i128::from(signed(nanos)?),
        )
    }
}
