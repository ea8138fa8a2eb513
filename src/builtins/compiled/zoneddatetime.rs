use crate::builtins::TZ_PROVIDER;
use crate::{
    options::{
        ArithmeticOverflow, DifferenceSettings, Disambiguation, DisplayCalendar, DisplayOffset,
        DisplayTimeZone, OffsetDisambiguation, RoundingOptions, ToStringRoundingOptions,
    },
    Duration, PlainDate, PlainDateTime, PlainTime, TemporalError, TemporalResult, TinyAsciiStr,
    ZonedDateTime,
};
use alloc::string::String;
use core::str::FromStr;

impl core::fmt::Display for ZonedDateTime {
    /// The [`core::fmt::Display`] implementation for `ZonedDateTime`.
    ///
    /// Enable with the `compiled_data` feature flag.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self
            .to_ixdtf_string(
                DisplayOffset::Auto,
                DisplayTimeZone::Auto,
                DisplayCalendar::Auto,
                ToStringRoundingOptions::default(),
            )
            .map_err(|_| core::fmt::Error)?;
        f.write_str(&string)
    }
}

impl FromStr for ZonedDateTime {
    type Err = TemporalError;

    /// Parses with `Compatible` disambiguation, rejecting a written offset
    /// that the time zone does not use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_with_options(s, Disambiguation::Compatible, OffsetDisambiguation::Reject)
    }
}

// ==== TZ_PROVIDER accessor implementations ====

/// Accessor implementations for `ZonedDateTime`.
///
/// The following [`ZonedDateTime`] methods are feature gated behind the
/// `compiled_data` feature flag.
impl ZonedDateTime {
    /// Returns the `ZonedDateTime`'s calendar year.
    pub fn year(&self) -> TemporalResult<i32> {
        self.year_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s calendar month.
    pub fn month(&self) -> TemporalResult<u8> {
        self.month_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s calendar day.
    pub fn day(&self) -> TemporalResult<u8> {
        self.day_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the era of the local date, if the calendar has eras.
    pub fn era(&self) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        self.era_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the year within the era, if the calendar has eras.
    pub fn era_year(&self) -> TemporalResult<Option<i32>> {
        self.era_year_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s hour.
    pub fn hour(&self) -> TemporalResult<u8> {
        self.hour_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s minute.
    pub fn minute(&self) -> TemporalResult<u8> {
        self.minute_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s second.
    pub fn second(&self) -> TemporalResult<u8> {
        self.second_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s millisecond.
    pub fn millisecond(&self) -> TemporalResult<u16> {
        self.millisecond_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s microsecond.
    pub fn microsecond(&self) -> TemporalResult<u16> {
        self.microsecond_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the `ZonedDateTime`'s nanosecond.
    pub fn nanosecond(&self) -> TemporalResult<u16> {
        self.nanosecond_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the current offset as a formatted offset string.
    pub fn offset(&self) -> TemporalResult<String> {
        self.offset_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the current offset in nanoseconds.
    pub fn offset_nanoseconds(&self) -> TemporalResult<i64> {
        self.offset_nanoseconds_with_provider(&*TZ_PROVIDER)
    }

    pub fn day_of_week(&self) -> TemporalResult<u16> {
        self.day_of_week_with_provider(&*TZ_PROVIDER)
    }

    pub fn day_of_year(&self) -> TemporalResult<u16> {
        self.day_of_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn week_of_year(&self) -> TemporalResult<Option<u8>> {
        self.week_of_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn year_of_week(&self) -> TemporalResult<Option<i32>> {
        self.year_of_week_with_provider(&*TZ_PROVIDER)
    }

    pub fn days_in_week(&self) -> TemporalResult<u16> {
        self.days_in_week_with_provider(&*TZ_PROVIDER)
    }

    pub fn days_in_month(&self) -> TemporalResult<u8> {
        self.days_in_month_with_provider(&*TZ_PROVIDER)
    }

    pub fn days_in_year(&self) -> TemporalResult<u16> {
        self.days_in_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn months_in_year(&self) -> TemporalResult<u8> {
        self.months_in_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn in_leap_year(&self) -> TemporalResult<bool> {
        self.in_leap_year_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the hours in the day.
    pub fn hours_in_day(&self) -> TemporalResult<f64> {
        self.hours_in_day_with_provider(&*TZ_PROVIDER)
    }
}

// ==== TZ_PROVIDER method implementations ====

/// The primary `ZonedDateTime` method implementations.
///
/// The following [`ZonedDateTime`] methods are feature gated behind the
/// `compiled_data` feature flag.
impl ZonedDateTime {
    /// Parses a `ZonedDateTime` with the provided disambiguation options.
    pub fn from_str_with_options(
        source: &str,
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
    ) -> TemporalResult<Self> {
        Self::from_str_with_provider(source, disambiguation, offset_option, &*TZ_PROVIDER)
    }

    /// Creates a new `ZonedDateTime` from the current `ZonedDateTime` with the provided `PlainTime`.
    pub fn with_plain_time(&self, time: Option<PlainTime>) -> TemporalResult<Self> {
        self.with_plain_time_and_provider(time, &*TZ_PROVIDER)
    }

    /// Adds a [`Duration`] to the current `ZonedDateTime`.
    pub fn add(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        self.add_with_provider(duration, overflow, &*TZ_PROVIDER)
    }

    /// Subtracts a [`Duration`] from the current `ZonedDateTime`.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporalResult<Self> {
        self.subtract_with_provider(duration, overflow, &*TZ_PROVIDER)
    }

    /// Returns a [`Duration`] representing the period of time from this `ZonedDateTime` since the other `ZonedDateTime`.
    pub fn since(&self, other: &Self, options: DifferenceSettings) -> TemporalResult<Duration> {
        self.since_with_provider(other, options, &*TZ_PROVIDER)
    }

    /// Returns a [`Duration`] representing the period of time from this `ZonedDateTime` until the other `ZonedDateTime`.
    pub fn until(&self, other: &Self, options: DifferenceSettings) -> TemporalResult<Duration> {
        self.until_with_provider(other, options, &*TZ_PROVIDER)
    }

    /// Returns the start of day for the current `ZonedDateTime`.
    pub fn start_of_day(&self) -> TemporalResult<Self> {
        self.start_of_day_with_provider(&*TZ_PROVIDER)
    }

    /// Rounds this [`ZonedDateTime`] according to the given rounding options.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        self.round_with_provider(options, &*TZ_PROVIDER)
    }

    pub fn to_plain_date(&self) -> TemporalResult<PlainDate> {
        self.to_plain_date_with_provider(&*TZ_PROVIDER)
    }

    pub fn to_plain_time(&self) -> TemporalResult<PlainTime> {
        self.to_plain_time_with_provider(&*TZ_PROVIDER)
    }

    pub fn to_plain_datetime(&self) -> TemporalResult<PlainDateTime> {
        self.to_plain_datetime_with_provider(&*TZ_PROVIDER)
    }

    /// Returns a RFC 9557 (IXDTF) string with the provided options.
    pub fn to_ixdtf_string(
        &self,
        display_offset: DisplayOffset,
        display_timezone: DisplayTimeZone,
        display_calendar: DisplayCalendar,
        options: ToStringRoundingOptions,
    ) -> TemporalResult<String> {
        self.to_ixdtf_string_with_provider(
            display_offset,
            display_timezone,
            display_calendar,
            options,
            &*TZ_PROVIDER,
        )
    }
}
