//! This module contains the core implementation of the `ZonedDateTime`
//! builtin type.

use alloc::string::{String, ToString};
use core::{cmp::Ordering, num::NonZeroU128};
use ixdtf::records::UtcOffsetRecordOrZ;
use tinystr::TinyAsciiStr;

use crate::{
    builtins::core::{
        calendar::Calendar,
        duration::{
            normalized::{NormalizedDurationRecord, NormalizedTimeDuration},
            DateDuration,
        },
        instant::{offset_for_display, round_offset_to_minutes},
        timezone::{TimeZone, UtcOffset},
        Duration, Instant, PlainDate, PlainDateTime, PlainTime,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, Disambiguation,
        DisplayCalendar, DisplayOffset, DisplayTimeZone, OffsetDisambiguation,
        ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions, Unit,
    },
    parsers::{self, IxdtfStringBuilder, ParseRecord, TimeZoneSource},
    provider::TimeZoneProvider,
    rounding::round_as_if_positive,
    time::EpochNanoseconds,
    TemporalError, TemporalResult, TemporalUnwrap, NS_PER_HOUR,
};


/// How the offset written in a string is applied when resolving a local
/// date-time to an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetBehaviour {
    /// An explicit numeric offset, checked per the `OffsetDisambiguation` option.
    Option(i128),
    /// An offset that is exact by construction, such as `Z`.
    Exact(i128),
    /// No offset; the wall-clock time is resolved in the time zone.
    Wall,
}

/// The native Rust implementation of a zoned date-time.
///
/// A `ZonedDateTime` is an exact instant paired with a time zone and a
/// calendar. Its local fields are derived from the instant on demand, so
/// every accessor needs a [`TimeZoneProvider`] to look up the offset.
///
/// ```rust
/// # #[cfg(feature = "compiled_data")] {
/// use temporal_engine::{tzdb::CompiledTzdbProvider, ZonedDateTime};
/// use temporal_engine::options::{Disambiguation, OffsetDisambiguation};
///
/// let provider = CompiledTzdbProvider::default();
/// let zdt = ZonedDateTime::from_str_with_provider(
///     "2020-03-08T02:30[America/Los_Angeles]",
///     Disambiguation::Compatible,
///     OffsetDisambiguation::Reject,
///     &provider,
/// )
/// .unwrap();
///
/// // 02:30 does not exist on this day, so the wall clock moves forward.
/// assert_eq!(zdt.hour_with_provider(&provider).unwrap(), 3);
/// assert_eq!(zdt.offset_with_provider(&provider).unwrap(), "-07:00");
/// # }
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedDateTime {
    instant: Instant,
    calendar: Calendar,
    tz: TimeZone,
}

// ==== Private API ====

impl ZonedDateTime {
    /// Creates a `ZonedDateTime` without validating the input.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(instant: Instant, calendar: Calendar, tz: TimeZone) -> Self {
        Self {
            instant,
            calendar,
            tz,
        }
    }

    /// Returns a `ZonedDateTime` at another instant in the same zone and calendar.
    pub(crate) fn with_epoch_nanoseconds(&self, epoch_nanoseconds: EpochNanoseconds) -> Self {
        Self::new_unchecked(
            Instant::from(epoch_nanoseconds),
            self.calendar,
            self.tz.clone(),
        )
    }

    /// Returns the local date-time of this instant.
    fn local_iso(&self, provider: &impl TimeZoneProvider) -> TemporalResult<IsoDateTime> {
        self.tz
            .get_iso_datetime_for(self.instant.epoch_nanoseconds(), provider)
    }

    /// Creates a `ZonedDateTime` from a parsed zoned date-time string.
    pub(crate) fn from_parse_record(
        record: ParseRecord<'_>,
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        // 1. The time zone annotation is required.
        let annotation = record
            .tz
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTimeZone))?;
        let tz = TimeZone::from_source(TimeZoneSource::from_record(annotation.tz)?, provider)?;

        // 2. Resolve the calendar, defaulting to ISO.
        let calendar = record
            .calendar
            .map(Calendar::from_utf8)
            .transpose()?
            .unwrap_or_default();

        // 3. Determine how the written offset is applied.
        let (behaviour, match_minutes) = match record.offset {
            Some(UtcOffsetRecordOrZ::Z) => (OffsetBehaviour::Exact(0), false),
            Some(UtcOffsetRecordOrZ::Offset(offset)) => (
                OffsetBehaviour::Option(i128::from(parsers::offset_nanoseconds(offset)?)),
                offset.second().is_none(),
            ),
            None => (OffsetBehaviour::Wall, false),
        };

        // 4. Validate the date, and read a missing time as the start of the day.
        let date = record
            .date
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate))?;
        let date =
            IsoDate::new_with_overflow(date.year, date.month, date.day, ArithmeticOverflow::Reject)?;
        let time = record.time.map(IsoTime::from_time_record).transpose()?;

        // 5. Let epochNanoseconds be ? InterpretISODateTimeOffset(...).
        let epoch_ns = interpret_isodatetime_offset(
            date,
            time,
            behaviour,
            &tz,
            disambiguation,
            offset_option,
            match_minutes,
            provider,
        )?;

        Ok(Self::new_unchecked(
            Instant::from(epoch_ns),
            calendar,
            tz,
        ))
    }

    /// Adds a duration to this zoned date-time, returning the resulting instant.
    ///
    /// Equivalent: `AddZonedDateTime`
    pub(crate) fn add_as_instant(
        &self,
        duration: &Duration,
        overflow: ArithmeticOverflow,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<EpochNanoseconds> {
        let norm = duration.time().to_normalized()?;
        // 1. If DateDurationSign(duration.[[Date]]) = 0, then
        if duration.date() == &DateDuration::default() {
            // a. Return ? AddInstant(epochNanoseconds, duration.[[Time]]).
            return Ok(*self.instant.add_to_instant(&norm)?.epoch_nanoseconds());
        }
        // 2. Let isoDateTime be GetISODateTimeFor(timeZone, epochNanoseconds).
        let iso = self.local_iso(provider)?;
        // 3. Let addedDate be ? CalendarDateAdd(calendar, isoDateTime.[[ISODate]], duration.[[Date]], overflow).
        let added_date = self.calendar.date_add(&iso.date, duration.date(), overflow)?;
        // 4. Let intermediateDateTime be CombineISODateAndTimeRecord(addedDate, isoDateTime.[[Time]]).
        // 5. If ISODateTimeWithinLimits(intermediateDateTime) is false, throw a RangeError exception.
        let intermediate = IsoDateTime::new(added_date, iso.time)?;
        // 6. Let intermediateNs be ! GetEpochNanosecondsFor(timeZone, intermediateDateTime, compatible).
        let intermediate_ns =
            self.tz
                .get_epoch_nanoseconds_for(intermediate, Disambiguation::Compatible, provider)?;
        // 7. Return ? AddInstant(intermediateNs, duration.[[Time]]).
        intermediate_ns.checked_add(norm.0)
    }

    /// Equivalent: `AddDurationToZonedDateTime`
    fn add_internal(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let epoch_ns = self.add_as_instant(duration, overflow.unwrap_or_default(), provider)?;
        Ok(self.with_epoch_nanoseconds(epoch_ns))
    }

    /// Differences two zoned date-times through their local dates, correcting
    /// for days whose length differs from 24 hours.
    ///
    /// Equivalent: `DifferenceZonedDateTime`
    pub(crate) fn diff_zoned_datetime(
        &self,
        other: &Self,
        largest_unit: Unit,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<NormalizedDurationRecord> {
        let ns_one = self.instant.as_i128();
        let ns_two = other.instant.as_i128();
        // 1. If ns1 = ns2, return CombineDateAndTimeDuration(ZeroDateDuration(), 0).
        if ns_one == ns_two {
            return NormalizedDurationRecord::new(
                DateDuration::default(),
                NormalizedTimeDuration::default(),
            );
        }
        // 2. Let startDateTime be GetISODateTimeFor(timeZone, ns1).
        let start = self.local_iso(provider)?;
        // 3. Let endDateTime be GetISODateTimeFor(timeZone, ns2).
        let end = self.tz.get_iso_datetime_for(other.instant.epoch_nanoseconds(), provider)?;
        // 4. If the local dates are equal, the difference is exact.
        if start.date == end.date {
            let norm = NormalizedTimeDuration::from_nanosecond_difference(ns_two, ns_one)?;
            return NormalizedDurationRecord::new(DateDuration::default(), norm);
        }
        // 5. If ns2 - ns1 < 0, let sign be -1; else let sign be 1.
        let sign: i64 = if ns_two < ns_one { -1 } else { 1 };
        // 6. If sign = 1, let maxDayCorrection be 2; else let maxDayCorrection be 1.
        let max_day_correction = if sign == 1 { 2 } else { 1 };
        // 7. Let dayCorrection be 0.
        let mut day_correction = 0;
        // 8. Let timeDuration be DifferenceTime(startDateTime.[[Time]], endDateTime.[[Time]]).
        let time_duration = start.time.diff(&end.time);
        // 9. If TimeDurationSign(timeDuration) = -sign, set dayCorrection to dayCorrection + 1.
        if time_duration.sign() as i64 == -sign {
            day_correction += 1;
        }

        // 10. Step back one day at a time until the remaining time has the right sign.
        let (intermediate_date, norm) = loop {
            if day_correction > max_day_correction {
                return Err(TemporalError::assert()
                    .with_message("The day correction of a zoned difference exceeded its bound."));
            }
            // a. Let intermediateDate be BalanceISODate(endDateTime.[[Year]], endDateTime.[[Month]],
            //    endDateTime.[[Day]] - dayCorrection × sign).
            let intermediate_date = end.date.add_days(-day_correction * sign)?;
            // b. Let intermediateDateTime be CombineISODateAndTimeRecord(intermediateDate, startDateTime.[[Time]]).
            let intermediate = IsoDateTime::new_unchecked(intermediate_date, start.time);
            // c. Let intermediateNs be ? GetEpochNanosecondsFor(timeZone, intermediateDateTime, compatible).
            let intermediate_ns = self.tz.get_epoch_nanoseconds_for(
                intermediate,
                Disambiguation::Compatible,
                provider,
            )?;
            // d. Set timeDuration to TimeDurationFromEpochNanosecondsDifference(ns2, intermediateNs).
            let norm = NormalizedTimeDuration::from_nanosecond_difference(
                ns_two,
                intermediate_ns.as_i128(),
            )?;
            // e. If timeSign ≠ -sign, the correction succeeded.
            if norm.sign() as i64 != -sign {
                break (intermediate_date, norm);
            }
            // f. Set dayCorrection to dayCorrection + 1.
            day_correction += 1;
        };

        // 11. Let dateLargestUnit be LargerOfTwoTemporalUnits(largestUnit, day).
        let date_largest_unit = largest_unit.max(Unit::Day);
        // 12. Let dateDifference be CalendarDateUntil(calendar, startDateTime.[[ISODate]], intermediateDate, dateLargestUnit).
        let date_difference =
            self.calendar
                .date_until(&start.date, &intermediate_date, date_largest_unit)?;
        // 13. Return CombineDateAndTimeDuration(dateDifference, timeDuration).
        NormalizedDurationRecord::new(date_difference, norm)
    }

    /// Differences two zoned date-times and applies the resolved rounding options.
    ///
    /// Equivalent: `DifferenceZonedDateTimeWithRounding`
    pub(crate) fn diff_with_rounding(
        &self,
        other: &Self,
        resolved: &ResolvedRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        // 1. If TemporalUnitCategory(largestUnit) is time, then
        if resolved.largest_unit.is_time_unit() {
            // a. Return DifferenceInstant(ns1, ns2, roundingIncrement, smallestUnit, roundingMode).
            let norm = self.instant.diff_instant_internal(&other.instant, resolved)?;
            let record = NormalizedDurationRecord::new(DateDuration::default(), norm)?;
            return Duration::from_normalized(record, resolved.largest_unit);
        }
        // 2. Let difference be ? DifferenceZonedDateTime(ns1, ns2, timeZone, calendar, largestUnit).
        let difference = self.diff_zoned_datetime(other, resolved.largest_unit, provider)?;
        // 3. If smallestUnit is nanosecond and roundingIncrement = 1, return difference.
        if resolved.is_noop() {
            return Duration::from_normalized(difference, Unit::Hour);
        }
        // 4. Let dateTime be GetISODateTimeFor(timeZone, ns1).
        let date_time = PlainDateTime::new_unchecked(self.local_iso(provider)?, self.calendar);
        // 5. Return ? RoundRelativeDuration(difference, ns2, dateTime, timeZone, calendar, largestUnit,
        //    roundingIncrement, smallestUnit, roundingMode).
        difference.round_relative_duration(
            other.instant.as_i128(),
            &date_time,
            Some((&self.tz, provider as &dyn TimeZoneProvider)),
            resolved,
        )
    }

    /// Equivalent: `DifferenceTemporalZonedDateTime`
    fn diff(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        // 1. If CalendarEquals(zonedDateTime.[[Calendar]], other.[[Calendar]]) is false, throw a RangeError exception.
        if self.calendar != other.calendar {
            return Err(TemporalError::range().with_enum(ErrorMessage::CalendarMismatch));
        }
        // 2. Let settings be ? GetDifferenceSettings(operation, resolvedOptions, DATETIME, « », "nanosecond", "hour").
        let resolved =
            ResolvedRoundingOptions::from_diff_settings(settings, op, Unit::Hour, Unit::Nanosecond)?;

        // 3. Date units are differenced through the local dates, which must share a time zone.
        if resolved.largest_unit.is_date_unit() {
            // a. If TimeZoneEquals(zonedDateTime.[[TimeZone]], other.[[TimeZone]]) is false, throw a RangeError exception.
            if self.tz != other.tz {
                return Err(TemporalError::range()
                    .with_message("Differences in date units require the same time zone."));
            }
            // b. If zonedDateTime.[[EpochNanoseconds]] = other.[[EpochNanoseconds]], return a zero duration.
            if self.instant == other.instant {
                return Ok(Duration::default());
            }
        }

        // 4. Let result be ? DifferenceZonedDateTimeWithRounding(...).
        let result = self.diff_with_rounding(other, &resolved, provider)?;

        // 5. If operation is since, set result to CreateNegatedTemporalDuration(result).
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }
}

/// Resolves a local date, an optional time and the written offset to an
/// instant.
///
/// A missing time resolves to the start of the day.
///
/// Equivalent: `InterpretISODateTimeOffset`
#[allow(clippy::too_many_arguments)]
fn interpret_isodatetime_offset(
    date: IsoDate,
    time: Option<IsoTime>,
    behaviour: OffsetBehaviour,
    tz: &TimeZone,
    disambiguation: Disambiguation,
    offset_option: OffsetDisambiguation,
    match_minutes: bool,
    provider: &impl TimeZoneProvider,
) -> TemporalResult<EpochNanoseconds> {
    // 1. If time is start-of-day, return ? GetStartOfDay(timeZone, isoDate).
    let Some(time) = time else {
        return tz.get_start_of_day(&date, provider);
    };
    // 2. Let isoDateTime be CombineISODateAndTimeRecord(isoDate, time).
    let iso = IsoDateTime::new_unchecked(date, time);

    let offset_ns = match (behaviour, offset_option) {
        // 3. If offsetBehaviour is wall, or offsetOption is ignore, resolve the wall-clock time.
        (OffsetBehaviour::Wall, _) | (OffsetBehaviour::Option(_), OffsetDisambiguation::Ignore) => {
            return tz.get_epoch_nanoseconds_for(iso, disambiguation, provider);
        }
        // 4. If offsetBehaviour is exact, or offsetOption is use, apply the offset as written.
        (OffsetBehaviour::Exact(offset), _)
        | (OffsetBehaviour::Option(offset), OffsetDisambiguation::Use) => {
            if !iso.is_within_limits() {
                return Err(TemporalError::range().with_enum(ErrorMessage::DateTimeOutOfRange));
            }
            return EpochNanoseconds::try_from(iso.as_nanoseconds() - offset);
        }
        // 5. Otherwise offsetOption is prefer or reject.
        (OffsetBehaviour::Option(offset), _) => offset,
    };

    // 6. Look for a candidate whose offset matches the written one.
    let utc_epoch_ns = iso.as_nanoseconds();
    let possible = tz.get_possible_epoch_ns_for(iso, provider)?;
    for candidate in &possible {
        let candidate_offset = utc_epoch_ns - candidate.as_i128();
        if candidate_offset == offset_ns {
            return Ok(*candidate);
        }
        if match_minutes && round_offset_to_minutes(candidate_offset)? == offset_ns {
            return Ok(*candidate);
        }
    }

    // 7. If offsetOption is reject, throw a RangeError exception.
    if offset_option == OffsetDisambiguation::Reject {
        return Err(TemporalError::range().with_enum(ErrorMessage::OffsetMismatch));
    }

    // 8. Return ? DisambiguatePossibleEpochNanoseconds(possibleEpochNs, timeZone, isoDateTime, disambiguation).
    tz.disambiguate_possible_epoch_nanos(possible, iso, disambiguation, provider)
}

// ==== Public API ====

impl ZonedDateTime {
    /// Creates a new valid `ZonedDateTime`.
    #[inline]
    pub fn try_new(nanos: i128, calendar: Calendar, time_zone: TimeZone) -> TemporalResult<Self> {
        let instant = Instant::try_new(nanos)?;
        Ok(Self::new_unchecked(instant, calendar, time_zone))
    }

    /// Parses a zoned date-time string.
    ///
    /// The time zone annotation is required. A written offset is checked
    /// against the zone according to `offset_option`.
    pub fn from_str_with_provider(
        source: &str,
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let record = parsers::parse_zoned_date_time(source)?;
        Self::from_parse_record(record, disambiguation, offset_option, provider)
    }

    /// Returns `ZonedDateTime`'s Calendar.
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Returns `ZonedDateTime`'s `TimeZone` slot.
    #[inline]
    #[must_use]
    pub fn timezone(&self) -> &TimeZone {
        &self.tz
    }

    /// Returns the exact instant of this `ZonedDateTime`.
    #[inline]
    #[must_use]
    pub fn to_instant(&self) -> Instant {
        self.instant
    }

    /// Returns the `epochSeconds` value of this `ZonedDateTime`.
    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.instant.as_i128().div_euclid(1_000_000_000) as i64
    }

    /// Returns the `epochMilliseconds` value of this `ZonedDateTime`.
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.instant.epoch_milliseconds()
    }

    /// Returns the `epochMicroseconds` value of this `ZonedDateTime`.
    #[must_use]
    pub fn epoch_microseconds(&self) -> i128 {
        self.instant.as_i128().div_euclid(1_000)
    }

    /// Returns the `epochNanoseconds` value of this `ZonedDateTime`.
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> &EpochNanoseconds {
        self.instant.epoch_nanoseconds()
    }

    /// Returns this value in another time zone, at the same instant.
    #[must_use]
    pub fn with_timezone(&self, time_zone: TimeZone) -> Self {
        Self::new_unchecked(self.instant, self.calendar, time_zone)
    }

    /// Returns this value in another calendar, at the same instant.
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.instant, calendar, self.tz.clone())
    }

    /// Compares two zoned date-times by instant, then calendar identifier,
    /// then time zone identifier.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.calendar.identifier().cmp(other.calendar.identifier()))
            .then_with(|| self.tz.identifier().cmp(&other.tz.identifier()))
    }
}

// ==== HoursInDay accessor method implementation ====

impl ZonedDateTime {
    /// Returns the length of the local day in hours.
    ///
    /// The length is the exact difference between the start of this day and
    /// the start of the next day; the `f64` is for display only.
    pub fn hours_in_day_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<f64> {
        // 1. Let today be the local date of this instant.
        let today = self.local_iso(provider)?.date;
        // 2. Let tomorrow be BalanceISODate(today.[[Year]], today.[[Month]], today.[[Day]] + 1).
        let tomorrow = today.add_days(1)?;
        // 3. Let todayNs be ? GetStartOfDay(timeZone, today).
        let today_ns = self.tz.get_start_of_day(&today, provider)?;
        // 4. Let tomorrowNs be ? GetStartOfDay(timeZone, tomorrow).
        let tomorrow_ns = self.tz.get_start_of_day(&tomorrow, provider)?;
        // 5. Let diff be TimeDurationFromEpochNanosecondsDifference(tomorrowNs, todayNs).
        let diff = tomorrow_ns.as_i128() - today_ns.as_i128();
        // 6. Return 𝔽(TotalTimeDuration(diff, hour)).
        Ok(diff as f64 / NS_PER_HOUR as f64)
    }
}

// ==== Core accessor methods ====

impl ZonedDateTime {
    /// Returns the calendar year value.
    pub fn year_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<i32> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.year(&iso.date))
    }

    /// Returns the calendar month value.
    pub fn month_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.month(&iso.date))
    }

    /// Returns the calendar day value.
    pub fn day_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.day(&iso.date))
    }

    /// Returns the era of the local date, if the calendar has eras.
    pub fn era_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.era(&iso.date))
    }

    /// Returns the year within the era, if the calendar has eras.
    pub fn era_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<i32>> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.era_year(&iso.date))
    }

    /// Returns the hour value
    pub fn hour_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.local_iso(provider)?.time.hour)
    }

    /// Returns the minute value
    pub fn minute_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.local_iso(provider)?.time.minute)
    }

    /// Returns the second value
    pub fn second_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.local_iso(provider)?.time.second)
    }

    /// Returns the millisecond value
    pub fn millisecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self.local_iso(provider)?.time.millisecond)
    }

    /// Returns the microsecond value
    pub fn microsecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self.local_iso(provider)?.time.microsecond)
    }

    /// Returns the nanosecond value
    pub fn nanosecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self.local_iso(provider)?.time.nanosecond)
    }

    /// Returns the current offset as a formatted offset string.
    pub fn offset_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<String> {
        let offset = self.offset_nanoseconds_with_provider(provider)?;
        Ok(UtcOffset::from_nanoseconds(offset)?.to_string())
    }

    /// Returns the current offset in nanoseconds.
    pub fn offset_nanoseconds_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<i64> {
        let offset = self.tz.get_offset_nanos_for(self.instant.as_i128(), provider)?;
        i64::try_from(offset).ok().temporal_unwrap()
    }

    /// Returns the calendar day of week value.
    pub fn day_of_week_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.day_of_week(&iso.date))
    }

    /// Returns the calendar day of year value.
    pub fn day_of_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.day_of_year(&iso.date))
    }

    /// Returns the calendar week of year value.
    pub fn week_of_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<u8>> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.week_of_year(&iso.date))
    }

    /// Returns the calendar year of week value.
    pub fn year_of_week_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<i32>> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.year_of_week(&iso.date))
    }

    /// Returns the calendar days in week value.
    pub fn days_in_week_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.days_in_week(&iso.date))
    }

    /// Returns the calendar days in month value.
    pub fn days_in_month_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u8> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.days_in_month(&iso.date))
    }

    /// Returns the calendar days in year value.
    pub fn days_in_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.days_in_year(&iso.date))
    }

    /// Returns the calendar months in year value.
    pub fn months_in_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u8> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.months_in_year(&iso.date))
    }

    /// Returns whether the local date is in a leap year for the calendar.
    pub fn in_leap_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<bool> {
        let iso = self.local_iso(provider)?;
        Ok(self.calendar.in_leap_year(&iso.date))
    }
}

// ==== Core method implementations ====

impl ZonedDateTime {
    /// Adds a `Duration`.
    ///
    /// The date units are added to the local date through the calendar, the
    /// result is resolved with `Compatible` disambiguation, and the time
    /// units are then added as exact nanoseconds.
    pub fn add_with_provider(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        self.add_internal(duration, overflow, provider)
    }

    /// Subtracts a `Duration`.
    pub fn subtract_with_provider(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        self.add_internal(&duration.negated(), overflow, provider)
    }

    /// Returns the `Duration` from this value until `other`.
    pub fn until_with_provider(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings, provider)
    }

    /// Returns the `Duration` from `other` since this value.
    pub fn since_with_provider(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings, provider)
    }

    /// Returns the first instant of the local day.
    pub fn start_of_day_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let iso = self.local_iso(provider)?;
        let epoch_ns = self.tz.get_start_of_day(&iso.date, provider)?;
        Ok(self.with_epoch_nanoseconds(epoch_ns))
    }

    /// Returns this value with its wall-clock time replaced, or moved to the
    /// start of the day when `time` is `None`.
    pub fn with_plain_time_and_provider(
        &self,
        time: Option<PlainTime>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let iso = self.local_iso(provider)?;
        let epoch_ns = match time {
            None => self.tz.get_start_of_day(&iso.date, provider)?,
            Some(time) => {
                let iso = IsoDateTime::new(iso.date, time.iso)?;
                self.tz
                    .get_epoch_nanoseconds_for(iso, Disambiguation::Compatible, provider)?
            }
        };
        Ok(self.with_epoch_nanoseconds(epoch_ns))
    }

    /// Rounds this value to the provided options.
    ///
    /// The local date-time is rounded and resolved again, preferring the
    /// original offset. Day rounding is measured against the actual length
    /// of the local day.
    pub fn round_with_provider(
        &self,
        options: RoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        // 1. Resolve the options; the smallest unit is required.
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;
        // 2. If smallestUnit is nanosecond and roundingIncrement = 1, return a copy.
        if resolved.is_noop() {
            return Ok(self.clone());
        }

        // 3. Let isoDateTime be GetISODateTimeFor(timeZone, thisNs).
        let iso = self.local_iso(provider)?;

        // 4. If smallestUnit is day, then
        if resolved.smallest_unit == Unit::Day {
            // a. Let dateStart be isoDateTime.[[ISODate]], and dateEnd the following day.
            let date_end = iso.date.add_days(1)?;
            // b. Let startNs be ? GetStartOfDay(timeZone, dateStart).
            let start_ns = self.tz.get_start_of_day(&iso.date, provider)?.as_i128();
            // c. Let endNs be ? GetStartOfDay(timeZone, dateEnd).
            let end_ns = self.tz.get_start_of_day(&date_end, provider)?.as_i128();
            // d. Round the progress through the day against the day's actual length.
            let day_length = u128::try_from(end_ns - start_ns)
                .ok()
                .and_then(NonZeroU128::new)
                .temporal_unwrap()?;
            let progress = self.instant.as_i128() - start_ns;
            let rounded = round_as_if_positive(progress, day_length, resolved.rounding_mode)?;
            // e. Let epochNanoseconds be AddTimeDurationToEpochNanoseconds(roundedDayNs, startNs).
            let epoch_ns = EpochNanoseconds::try_from(start_ns + rounded)?;
            return Ok(self.with_epoch_nanoseconds(epoch_ns));
        }

        // 5. Else, round the local date-time and resolve it preferring the original offset.
        let rounded = iso.round(resolved)?;
        let offset_ns = self.tz.get_offset_nanos_for(self.instant.as_i128(), provider)?;
        let epoch_ns = interpret_isodatetime_offset(
            rounded.date,
            Some(rounded.time),
            OffsetBehaviour::Option(offset_ns),
            &self.tz,
            Disambiguation::Compatible,
            OffsetDisambiguation::Prefer,
            false,
            provider,
        )?;
        Ok(self.with_epoch_nanoseconds(epoch_ns))
    }

    /// Returns the local date.
    pub fn to_plain_date_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDate> {
        let iso = self.local_iso(provider)?;
        Ok(PlainDate::new_unchecked(iso.date, self.calendar))
    }

    /// Returns the local time.
    pub fn to_plain_time_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainTime> {
        let iso = self.local_iso(provider)?;
        Ok(PlainTime::new_unchecked(iso.time))
    }

    /// Returns the local date-time.
    pub fn to_plain_datetime_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDateTime> {
        let iso = self.local_iso(provider)?;
        Ok(PlainDateTime::new_unchecked(iso, self.calendar))
    }

    /// Returns the value as an annotated ISO 8601 string, such as
    /// `2020-03-08T03:30:00-07:00[America/Los_Angeles]`.
    ///
    /// The offset is written in whole minutes.
    pub fn to_ixdtf_string_with_provider(
        &self,
        display_offset: DisplayOffset,
        display_timezone: DisplayTimeZone,
        display_calendar: DisplayCalendar,
        options: ToStringRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<String> {
        // 1. Round the instant to the requested precision.
        let resolved = options.resolve()?;
        let rounded = self.instant.round_for_string(&resolved)?;

        // 2. Resolve the local date-time and offset of the rounded instant.
        let offset = self.tz.get_offset_nanos_for(rounded.as_i128(), provider)?;
        let iso = IsoDateTime::from_epoch_nanos(rounded.as_i128(), offset);
        let identifier = self.tz.identifier();

        // 3. Write the date-time, offset and annotations.
        Ok(IxdtfStringBuilder::default()
            .with_date(iso.date)
            .with_time(iso.time, resolved.precision)
            .with_offset(offset_for_display(offset)?, display_offset)
            .with_timezone(&identifier, display_timezone)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }
}
