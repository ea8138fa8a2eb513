//! This module implements the normalized `Duration` records.

use core::{num::NonZeroU128, ops::Add};

use crate::{
    builtins::core::{timezone::TimeZone, PlainDateTime},
    error::ErrorMessage,
    iso::IsoDateTime,
    options::{ArithmeticOverflow, Disambiguation, ResolvedRoundingOptions, Unit},
    provider::TimeZoneProvider,
    rounding::{round_progress, IncrementRounder},
    temporal_assert, Sign, TemporalError, TemporalResult, TemporalUnwrap, NS_PER_DAY,
};

use super::{DateDuration, Duration, TimeDuration};

/// The largest magnitude of a normalized time duration: 2^53 seconds
/// less one nanosecond.
pub(crate) const MAX_TIME_DURATION: i128 = 9_007_199_254_740_991_999_999_999;

const NS_PER_DAY_128BIT: i128 = NS_PER_DAY as i128;

// ==== NormalizedTimeDuration ====
//
// A time duration represented in pure nanoseconds.
//
// Invariants:
//
// nanoseconds.abs() <= MAX_TIME_DURATION

/// A Normalized `TimeDuration` that represents the current `TimeDuration` in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NormalizedTimeDuration(pub(crate) i128);

impl NormalizedTimeDuration {
    fn checked(nanoseconds: i128) -> TemporalResult<Self> {
        if nanoseconds.unsigned_abs() > MAX_TIME_DURATION.unsigned_abs() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationNotValid));
        }
        Ok(Self(nanoseconds))
    }

    /// Equivalent: `TimeDurationFromComponents`
    pub(crate) fn from_time_duration(time: &TimeDuration) -> TemporalResult<Self> {
        let nanoseconds = time
            .checked_total_nanoseconds()
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?;
        Self::checked(nanoseconds)
    }

    /// Equivalent: `TimeDurationFromEpochNanosecondsDifference ( one, two )`
    pub(crate) fn from_nanosecond_difference(one: i128, two: i128) -> TemporalResult<Self> {
        Self::checked(one - two)
    }

    /// Equivalent: `Add24HourDaysToTimeDuration ( d, days )`
    pub(crate) fn add_days(&self, days: i64) -> TemporalResult<Self> {
        Self::checked(self.0 + i128::from(days) * NS_PER_DAY_128BIT)
    }

    /// Divides the duration by a divisor, truncating toward zero.
    pub(crate) fn divide(&self, divisor: u64) -> i128 {
        self.0 / i128::from(divisor)
    }

    // NOTE: non-euclid is required here for negative rounding.
    /// Returns the div_rem of this NormalizedTimeDuration.
    pub(crate) fn div_rem(&self, divisor: u64) -> (i128, i128) {
        (self.0 / i128::from(divisor), self.0 % i128::from(divisor))
    }

    /// Equivalent: `TimeDurationSign ( d )`
    #[inline]
    #[must_use]
    pub(crate) fn sign(&self) -> Sign {
        Sign::from(self.0.cmp(&0))
    }

    /// Return the whole seconds value of the `NormalizedTimeDuration`.
    pub(crate) fn seconds(&self) -> i64 {
        // The magnitude is below 2^53 seconds.
        (self.0 / 1_000_000_000) as i64
    }

    /// Returns the subsecond components of the `NormalizedTimeDuration`.
    pub(crate) fn subseconds(&self) -> i32 {
        (self.0 % 1_000_000_000) as i32
    }

    pub(crate) fn checked_sub(&self, other: &Self) -> TemporalResult<Self> {
        Self::checked(self.0 - other.0)
    }

    /// Rounds the duration to a time unit or to 24-hour days.
    ///
    /// Equivalent: `RoundTimeDuration`
    pub(crate) fn round(&self, options: &ResolvedRoundingOptions) -> TemporalResult<Self> {
        // 1. Let divisor be the length of the unit in nanoseconds.
        let divisor = options
            .smallest_unit
            .as_nanoseconds()
            .and_then(|ns| NonZeroU128::new(ns.into()))
            .ok_or(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?;
        // 2. Round to divisor × increment.
        let increment = divisor
            .checked_mul(options.increment.as_extended_increment())
            .temporal_unwrap()?;
        self.round_inner(increment, options)
    }

    /// Rounds the duration to a multiple of `increment` nanoseconds.
    ///
    /// Equivalent: `RoundTimeDurationToIncrement`
    pub(crate) fn round_inner(
        &self,
        increment: NonZeroU128,
        options: &ResolvedRoundingOptions,
    ) -> TemporalResult<Self> {
        let rounded =
            IncrementRounder::<i128>::from_signed_num(self.0, increment)?.round_with_options(options);
        Self::checked(rounded)
    }
}

/// Equivalent: `AddTimeDuration ( one, two )`
impl Add<Self> for NormalizedTimeDuration {
    type Output = TemporalResult<Self>;

    fn add(self, rhs: Self) -> Self::Output {
        Self::checked(self.0 + rhs.0)
    }
}

// ==== NormalizedDurationRecord ====
//
// A record consisting of a DateDuration and NormalizedTimeDuration
//

/// A NormalizedDurationRecord is a duration record that contains
/// a `DateDuration` and `NormalizedTimeDuration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDurationRecord {
    date: DateDuration,
    norm: NormalizedTimeDuration,
}

impl NormalizedDurationRecord {
    /// Creates a new `NormalizedDurationRecord`.
    ///
    /// Equivalent: `CombineDateAndTimeDuration`
    pub(crate) fn new(date: DateDuration, norm: NormalizedTimeDuration) -> TemporalResult<Self> {
        let date_sign = date.sign();
        let time_sign = norm.sign();
        if date_sign != Sign::Zero && time_sign != Sign::Zero && date_sign != time_sign {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationMixedSign));
        }
        Ok(Self { date, norm })
    }

    pub(crate) fn from_date_duration(date: DateDuration) -> TemporalResult<Self> {
        Self::new(date, NormalizedTimeDuration::default())
    }

    pub(crate) fn date(&self) -> DateDuration {
        self.date
    }

    pub(crate) fn normalized_time_duration(&self) -> NormalizedTimeDuration {
        self.norm
    }

    pub(crate) fn sign(&self) -> Sign {
        match self.date.sign() {
            Sign::Zero => self.norm.sign(),
            sign => sign,
        }
    }
}

// ==== Nudge Duration Rounding Functions ====

// Below implements the nudge rounding functionality for Duration.
//
// Generally, this rounding is implemented on a NormalizedDurationRecord,
// which is the reason the functionality lives below.

/// The time zone and provider used to anchor zoned rounding.
pub(crate) type ZonedAnchor<'a> = (&'a TimeZone, &'a dyn TimeZoneProvider);

#[derive(Debug)]
struct NudgeRecord {
    normalized: NormalizedDurationRecord,
    nudge_epoch_ns: i128,
    expanded: bool,
}

/// Truncates `value` to a multiple of `increment`.
fn trunc_to_increment(value: i64, increment: i64) -> i64 {
    value / increment * increment
}

/// Returns the epoch nanoseconds of a local date-time, read as UTC or
/// resolved through a time zone.
fn epoch_ns_for(local: &IsoDateTime, tz: Option<ZonedAnchor<'_>>) -> TemporalResult<i128> {
    match tz {
        Some((tz, provider)) => Ok(tz
            .get_epoch_nanoseconds_for(*local, Disambiguation::Compatible, provider)?
            .as_i128()),
        None => Ok(local.as_nanoseconds()),
    }
}

impl NormalizedDurationRecord {
    /// Equivalent: `NudgeToCalendarUnit`
    fn nudge_calendar_unit(
        &self,
        sign: Sign,
        dest_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<ZonedAnchor<'_>>,
        options: &ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        let increment = i64::from(options.increment.get());
        let step = increment * i64::from(sign.as_sign_multiplier());
        let date = self.date;

        // 1. Compute the two bracketing candidates at `unit` granularity.
        let (start_duration, end_duration) = match options.smallest_unit {
            Unit::Year => {
                let years = trunc_to_increment(date.years, increment);
                (
                    DateDuration::new_unchecked(years, 0, 0, 0),
                    DateDuration::new_unchecked(years + step, 0, 0, 0),
                )
            }
            Unit::Month => {
                let months = trunc_to_increment(date.months, increment);
                (
                    DateDuration::new_unchecked(date.years, months, 0, 0),
                    DateDuration::new_unchecked(date.years, months + step, 0, 0),
                )
            }
            Unit::Week => {
                // Weeks are counted from the anchor after years and months.
                let years_months = DateDuration::new_unchecked(date.years, date.months, 0, 0);
                let weeks_start = dt.calendar().date_add(
                    &dt.iso.date,
                    &years_months,
                    ArithmeticOverflow::Constrain,
                )?;
                let weeks_end = weeks_start.add_days(date.days)?;
                let until = dt
                    .calendar()
                    .date_until(&weeks_start, &weeks_end, Unit::Week)?;
                let weeks = trunc_to_increment(date.weeks + until.weeks, increment);
                (
                    DateDuration::new_unchecked(date.years, date.months, weeks, 0),
                    DateDuration::new_unchecked(date.years, date.months, weeks + step, 0),
                )
            }
            Unit::Day => {
                let days = trunc_to_increment(date.days, increment);
                (
                    DateDuration::new_unchecked(date.years, date.months, date.weeks, days),
                    DateDuration::new_unchecked(date.years, date.months, date.weeks, days + step),
                )
            }
            _ => return Err(TemporalError::assert()),
        };

        // 2. Locate both candidates on the time line.
        let start = dt.iso.add_date_duration(
            dt.calendar(),
            &start_duration,
            NormalizedTimeDuration::default(),
            ArithmeticOverflow::Constrain,
        )?;
        let end = dt.iso.add_date_duration(
            dt.calendar(),
            &end_duration,
            NormalizedTimeDuration::default(),
            ArithmeticOverflow::Constrain,
        )?;
        let start_epoch_ns = epoch_ns_for(&start, tz)?;
        let end_epoch_ns = epoch_ns_for(&end, tz)?;

        // 3. The progress from start toward end is compared exactly.
        let numerator = dest_epoch_ns - start_epoch_ns;
        let denominator = end_epoch_ns - start_epoch_ns;
        if denominator == 0 {
            return Err(TemporalError::range()
                .with_message("Rounding candidates resolved to the same instant."));
        }
        let mode = options.unsigned_rounding_mode(sign != Sign::Negative);
        let expanded = round_progress(numerator, denominator, mode);

        let (duration, nudge_epoch_ns) = if expanded {
            (end_duration, end_epoch_ns)
        } else {
            (start_duration, start_epoch_ns)
        };

        Ok(NudgeRecord {
            normalized: NormalizedDurationRecord::from_date_duration(duration)?,
            nudge_epoch_ns,
            expanded,
        })
    }

    /// Equivalent: `NudgeToZonedTime`
    fn nudge_to_zoned_time(
        &self,
        sign: Sign,
        dt: &PlainDateTime,
        tz: ZonedAnchor<'_>,
        options: &ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        let (time_zone, provider) = tz;
        // 1. Let start be the anchor with the date part applied.
        let start = dt.iso.add_date_duration(
            dt.calendar(),
            &self.date,
            NormalizedTimeDuration::default(),
            ArithmeticOverflow::Constrain,
        )?;
        // 2. Let end be one day later, in the direction of the sign.
        let end_date = start
            .date
            .add_days(i64::from(sign.as_sign_multiplier()))?;
        let end = IsoDateTime::new_unchecked(end_date, start.time);

        // 3. Resolve both through the time zone.
        let start_epoch_ns = time_zone
            .get_epoch_nanoseconds_for(start, Disambiguation::Compatible, provider)?
            .as_i128();
        let end_epoch_ns = time_zone
            .get_epoch_nanoseconds_for(end, Disambiguation::Compatible, provider)?
            .as_i128();

        // 4. Let daySpan be the real length of that day.
        let day_span = NormalizedTimeDuration::from_nanosecond_difference(end_epoch_ns, start_epoch_ns)?;
        temporal_assert!(
            day_span.sign() == sign || sign == Sign::Zero,
            "Day span must agree with the duration sign."
        );

        // 5. Round the time portion.
        let unit_length = options
            .smallest_unit
            .as_nanoseconds()
            .and_then(|ns| NonZeroU128::new(ns.into()))
            .temporal_unwrap()?;
        let increment = unit_length
            .checked_mul(options.increment.as_extended_increment())
            .temporal_unwrap()?;
        let mut rounded_norm = self.norm.round_inner(increment, options)?;

        // 6. If rounding reached or passed the end of the day, round again
        //    from the start of the next day.
        let beyond_day_span = rounded_norm.checked_sub(&day_span)?;
        let (day_delta, nudge_epoch_ns, expanded) =
            if beyond_day_span.sign() != sign.negate() {
                rounded_norm = beyond_day_span.round_inner(increment, options)?;
                (
                    i64::from(sign.as_sign_multiplier()),
                    rounded_norm.0 + end_epoch_ns,
                    true,
                )
            } else {
                (0, rounded_norm.0 + start_epoch_ns, false)
            };

        let date = DateDuration::new_unchecked(
            self.date.years,
            self.date.months,
            self.date.weeks,
            self.date.days + day_delta,
        );

        Ok(NudgeRecord {
            normalized: NormalizedDurationRecord::new(date, rounded_norm)?,
            nudge_epoch_ns,
            expanded,
        })
    }

    /// Equivalent: `NudgeToDayOrTime`
    fn nudge_to_day_or_time(
        &self,
        dest_epoch_ns: i128,
        options: &ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        // 1. Assert: The value in the "Category" column of the row of Table 22 whose "Singular" column contains smallestUnit, is time.
        // 2. Let norm be ! Add24HourDaysToTimeDuration(duration.[[NormalizedTime]], duration.[[Days]]).
        let norm = self.norm.add_days(self.date.days)?;

        // 3. Let unitLength be the value in the "Length in Nanoseconds" column of the row of Table 22 whose "Singular" column contains smallestUnit.
        let unit_length = options
            .smallest_unit
            .as_nanoseconds()
            .and_then(|ns| NonZeroU128::new(ns.into()))
            .temporal_unwrap()?;
        // 4. Let roundedNorm be ? RoundTimeDurationToIncrement(norm, unitLength × increment, roundingMode).
        let increment = unit_length
            .checked_mul(options.increment.as_extended_increment())
            .temporal_unwrap()?;
        let rounded_norm = norm.round_inner(increment, options)?;

        // 5. Let diffNorm be ! SubtractTimeDuration(roundedNorm, norm).
        let diff_norm = rounded_norm.checked_sub(&norm)?;

        // 6. Let wholeDays be truncate(norm / nsPerDay).
        let whole_days = norm.divide(NS_PER_DAY);

        // 7. Let roundedFractionalDays be roundedNorm / nsPerDay.
        // 8. Let roundedWholeDays be truncate(roundedFractionalDays).
        let (rounded_whole_days, rounded_remainder) = rounded_norm.div_rem(NS_PER_DAY);

        // 9. Let dayDelta be roundedWholeDays - wholeDays.
        let delta = rounded_whole_days - whole_days;
        // 10. If dayDelta < 0, let dayDeltaSign be -1; else if dayDelta > 0, let dayDeltaSign be 1; else let dayDeltaSign be 0.
        // 11. If dayDeltaSign = NormalizedTimeDurationSign(norm), let didExpandDays be true; else let didExpandDays be false.
        let did_expand_days = delta.signum() as i8 == norm.sign() as i8;

        // 12. Let nudgedEpochNs be AddTimeDurationToEpochNanoseconds(diffNorm, destEpochNs).
        let nudged_ns = diff_norm.0 + dest_epoch_ns;

        // 13. Let days be 0.
        // 14. Let remainder be roundedNorm.
        // 15. If LargerOfTwoTemporalUnits(largestUnit, "day") is largestUnit, then
        let (days, remainder) = if options.largest_unit >= Unit::Day {
            // a. Set days to roundedWholeDays.
            // b. Set remainder to the sub-day remainder of roundedNorm.
            (
                i64::try_from(rounded_whole_days)
                    .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationNotValid))?,
                NormalizedTimeDuration(rounded_remainder),
            )
        } else {
            (0, rounded_norm)
        };

        // 16. Let resultDuration be ? CombineDateAndTimeDuration(years, months, weeks, days, remainder).
        let result_duration = NormalizedDurationRecord::new(
            DateDuration::new_unchecked(
                self.date.years,
                self.date.months,
                self.date.weeks,
                days,
            ),
            remainder,
        )?;

        // 17. Return the Duration Nudge Result Record.
        Ok(NudgeRecord {
            normalized: result_duration,
            nudge_epoch_ns: nudged_ns,
            expanded: did_expand_days,
        })
    }

    /// Equivalent: `BubbleRelativeDuration`
    fn bubble_relative_duration(
        &self,
        sign: Sign,
        nudge_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<ZonedAnchor<'_>>,
        largest_unit: Unit,
        smallest_unit: Unit,
    ) -> TemporalResult<NormalizedDurationRecord> {
        let mut duration = *self;
        // 1. If smallestUnit is "year", return duration.
        if smallest_unit == Unit::Year {
            return Ok(duration);
        }

        let step = i64::from(sign.as_sign_multiplier());
        // 2. Walk each unit above smallestUnit up to largestUnit.
        let mut unit = smallest_unit + 1;
        while unit != Unit::Auto && unit <= largest_unit {
            // a. Weeks are only bubbled into when they are the largest unit.
            if unit == Unit::Week && largest_unit != Unit::Week {
                unit = unit + 1;
                continue;
            }

            let date = duration.date();
            let end_duration = match unit {
                Unit::Year => DateDuration::new_unchecked(date.years + step, 0, 0, 0),
                Unit::Month => DateDuration::new_unchecked(date.years, date.months + step, 0, 0),
                Unit::Week => {
                    DateDuration::new_unchecked(date.years, date.months, date.weeks + step, 0)
                }
                Unit::Day => DateDuration::new_unchecked(
                    date.years,
                    date.months,
                    date.weeks,
                    date.days + step,
                ),
                _ => return Err(TemporalError::assert()),
            };

            // b. Let end be the anchor plus endDuration.
            let end = dt.iso.add_date_duration(
                dt.calendar(),
                &end_duration,
                NormalizedTimeDuration::default(),
                ArithmeticOverflow::Constrain,
            )?;
            let end_epoch_ns = epoch_ns_for(&end, tz)?;

            // c. If the nudged result reached endDuration, take it and continue.
            let beyond_end = nudge_epoch_ns - end_epoch_ns;
            if beyond_end.signum() != -i128::from(step) {
                duration = NormalizedDurationRecord::from_date_duration(end_duration)?;
            } else {
                break;
            }
            unit = unit + 1;
        }

        Ok(duration)
    }

    /// Rounds a duration measured from `dt` to `dest_epoch_ns`.
    ///
    /// Equivalent: `RoundRelativeDuration`
    pub(crate) fn round_relative_duration(
        &self,
        dest_epoch_ns: i128,
        dt: &PlainDateTime,
        tz: Option<ZonedAnchor<'_>>,
        options: &ResolvedRoundingOptions,
    ) -> TemporalResult<Duration> {
        // 1. Let irregularLengthUnit be whether smallestUnit is a calendar
        //    unit, or a zoned day.
        let irregular_unit = options.smallest_unit.is_calendar_unit()
            || (tz.is_some() && options.smallest_unit == Unit::Day);

        // 2. If the duration is negative, let sign be -1; else let sign be 1.
        let sign = if self.sign() == Sign::Negative {
            Sign::Negative
        } else {
            Sign::Positive
        };

        // 3. Nudge the duration.
        let nudge_result = if irregular_unit {
            self.nudge_calendar_unit(sign, dest_epoch_ns, dt, tz, options)?
        } else if let Some(tz) = tz {
            self.nudge_to_zoned_time(sign, dt, tz, options)?
        } else {
            self.nudge_to_day_or_time(dest_epoch_ns, options)?
        };

        let mut duration = nudge_result.normalized;

        // 4. If nudgeResult.[[DidExpandCalendarUnit]] is true and smallestUnit is not "week", then
        if nudge_result.expanded && options.smallest_unit != Unit::Week {
            // a. Let startUnit be LargerOfTwoTemporalUnits(smallestUnit, "day").
            let start_unit = options.smallest_unit.max(Unit::Day);
            // b. Set duration to ? BubbleRelativeDuration(...).
            duration = duration.bubble_relative_duration(
                sign,
                nudge_result.nudge_epoch_ns,
                dt,
                tz,
                options.largest_unit,
                start_unit,
            )?;
        }

        // 5. Balance the time portion with hours as the largest unit when
        //    largestUnit is a date unit.
        let largest_unit = if options.largest_unit.is_date_unit() {
            Unit::Hour
        } else {
            options.largest_unit
        };

        Duration::from_normalized(duration, largest_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::{NormalizedDurationRecord, NormalizedTimeDuration, MAX_TIME_DURATION};
    use crate::{builtins::core::duration::DateDuration, NS_PER_DAY};

    #[test]
    fn validate_seconds_cast() {
        let max_seconds = MAX_TIME_DURATION.div_euclid(1_000_000_000);
        assert!(max_seconds <= i64::MAX.into());
        assert_eq!(max_seconds, 9_007_199_254_740_991);
    }

    #[test]
    fn time_duration_limits() {
        let max = NormalizedTimeDuration(MAX_TIME_DURATION);
        assert!((max + NormalizedTimeDuration(1)).is_err());
        assert!(NormalizedTimeDuration::default()
            .add_days(104_249_991_374)
            .is_ok());
        assert!(NormalizedTimeDuration::default()
            .add_days(104_249_991_375)
            .is_err());
        let norm = NormalizedTimeDuration(-(NS_PER_DAY as i128) - 5);
        assert_eq!(norm.div_rem(NS_PER_DAY), (-1, -5));
        assert_eq!(norm.seconds(), -86_400);
        assert_eq!(norm.subseconds(), -5);
    }

    #[test]
    fn record_sign_agreement() {
        let date = DateDuration::new_unchecked(0, 1, 0, 0);
        assert!(NormalizedDurationRecord::new(date, NormalizedTimeDuration(-1)).is_err());
        let record = NormalizedDurationRecord::new(date, NormalizedTimeDuration(1)).unwrap();
        assert_eq!(record.sign(), crate::Sign::Positive);
        let record =
            NormalizedDurationRecord::new(DateDuration::default(), NormalizedTimeDuration(-1))
                .unwrap();
        assert_eq!(record.sign(), crate::Sign::Negative);
    }
}
