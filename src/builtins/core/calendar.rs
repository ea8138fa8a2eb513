//! This module implements the calendar capability trait and the `Calendar`
//! handle that the date types carry.
//!
//! A calendar maps ISO dates to its own year, month and day reckoning and
//! back. Arithmetic over calendar units is provided by a generic engine that
//! only uses those mappings, so any `CalendarSystem` supports adding and
//! differencing dates.

use core::{fmt, str::FromStr};

use tinystr::TinyAsciiStr;

use crate::{
    builtins::core::{duration::DateDuration, PlainDate, PlainDateTime, ZonedDateTime},
    error::ErrorMessage,
    iso::IsoDate,
    options::{ArithmeticOverflow, Unit},
    utils, TemporalError, TemporalResult,
};

pub(crate) mod engine;
mod systems;
#[cfg(test)]
pub(crate) mod testing;

pub use systems::Iso;

// ==== `CalendarFields` ====

/// A partial set of calendar fields used to resolve a date.
///
/// Either `year` or both of `era` and `era_year` identify the year. When
/// both forms are present they must agree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub era: Option<TinyAsciiStr<16>>,
    pub era_year: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl CalendarFields {
    pub const fn new() -> Self {
        Self {
            era: None,
            era_year: None,
            year: None,
            month: None,
            day: None,
        }
    }

    pub(crate) const fn from_ymd(year: i32, month: u8, day: u8) -> Self {
        Self {
            era: None,
            era_year: None,
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    pub const fn with_era(mut self, era: TinyAsciiStr<16>, era_year: i32) -> Self {
        self.era = Some(era);
        self.era_year = Some(era_year);
        self
    }

    pub const fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub const fn with_month(mut self, month: u8) -> Self {
        self.month = Some(month);
        self
    }

    pub const fn with_day(mut self, day: u8) -> Self {
        self.day = Some(day);
        self
    }

    /// Returns the month and day, failing with a `TypeError` when missing.
    pub(crate) fn required_month_day(&self) -> TemporalResult<(u8, u8)> {
        let month = self
            .month
            .ok_or(TemporalError::r#type().with_message("Required month field is empty."))?;
        let day = self
            .day
            .ok_or(TemporalError::r#type().with_message("Required day field is empty."))?;
        Ok((month, day))
    }
}

// ==== `CalendarSystem` ====

/// The capability interface of a calendar system.
///
/// Implementors describe how ISO dates map to their own fields. The
/// arithmetic methods have default implementations over those mappings.
pub trait CalendarSystem: fmt::Debug + Send + Sync {
    /// The lowercase identifier of the calendar.
    fn identifier(&self) -> &'static str;

    /// Resolves calendar fields into an ISO date.
    ///
    /// A missing month or day is a `TypeError`. A month or day of zero is
    /// always a `RangeError`, other out of range values are clamped or
    /// rejected per `overflow`.
    fn date_from_fields(
        &self,
        fields: &CalendarFields,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoDate>;

    fn year(&self, date: &IsoDate) -> i32;

    fn era(&self, _date: &IsoDate) -> Option<TinyAsciiStr<16>> {
        None
    }

    fn era_year(&self, _date: &IsoDate) -> Option<i32> {
        None
    }

    fn month(&self, date: &IsoDate) -> u8;

    fn day(&self, date: &IsoDate) -> u8;

    fn months_in_year(&self, date: &IsoDate) -> u8;

    fn days_in_month(&self, date: &IsoDate) -> u8;

    fn days_in_year(&self, date: &IsoDate) -> u16;

    fn in_leap_year(&self, date: &IsoDate) -> bool;

    /// The ISO day of the week, Monday being 1.
    fn day_of_week(&self, date: &IsoDate) -> u16 {
        utils::epoch_days_to_day_of_week(date.to_epoch_days())
    }

    fn day_of_year(&self, date: &IsoDate) -> u16;

    /// The week number, if the calendar has a week numbering.
    fn week_of_year(&self, _date: &IsoDate) -> Option<u8> {
        None
    }

    /// The year the week number belongs to.
    fn year_of_week(&self, _date: &IsoDate) -> Option<i32> {
        None
    }

    fn days_in_week(&self, _date: &IsoDate) -> u16 {
        7
    }

    /// Adds a date duration to `date`.
    fn date_add(
        &self,
        date: &IsoDate,
        duration: &DateDuration,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoDate> {
        engine::date_add(self, date, duration, overflow)
    }

    /// Returns the difference from `one` to `two` in units up to `largest_unit`.
    fn date_until(
        &self,
        one: &IsoDate,
        two: &IsoDate,
        largest_unit: Unit,
    ) -> TemporalResult<DateDuration> {
        engine::date_until(self, one, two, largest_unit)
    }
}

// ==== `Calendar` ====

/// A handle to a calendar system.
///
/// Calendars are compared by identifier.
#[derive(Debug, Clone, Copy)]
pub struct Calendar(&'static dyn CalendarSystem);

impl Default for Calendar {
    fn default() -> Self {
        Self::ISO
    }
}

impl PartialEq for Calendar {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for Calendar {}

impl Calendar {
    /// The ISO 8601 calendar.
    pub const ISO: Self = Self(&Iso);

    /// Creates a `Calendar` from any calendar system.
    pub const fn new(system: &'static dyn CalendarSystem) -> Self {
        Self(system)
    }

    /// Returns the built-in `Calendar` for an identifier, ignoring ASCII case.
    ///
    /// Only `iso8601` is built in. Other systems are attached with
    /// [`Calendar::new`].
    pub fn from_utf8(bytes: &[u8]) -> TemporalResult<Self> {
        if Iso.identifier().as_bytes().eq_ignore_ascii_case(bytes) {
            return Ok(Self::ISO);
        }
        Err(TemporalError::range().with_enum(ErrorMessage::UnknownCalendar))
    }

    /// Returns whether the current calendar is `ISO`
    #[inline]
    pub fn is_iso(&self) -> bool {
        self.identifier() == Iso.identifier()
    }

    /// Returns the identifier of this calendar.
    #[inline]
    pub fn identifier(&self) -> &'static str {
        self.0.identifier()
    }

    /// `CalendarDateFromFields`
    pub fn date_from_fields(
        &self,
        fields: &CalendarFields,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoDate> {
        self.0.date_from_fields(fields, overflow)
    }

    /// `CalendarDateAdd`
    pub fn date_add(
        &self,
        date: &IsoDate,
        duration: &DateDuration,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoDate> {
        self.0.date_add(date, duration, overflow)
    }

    /// `CalendarDateUntil`
    pub fn date_until(
        &self,
        one: &IsoDate,
        two: &IsoDate,
        largest_unit: Unit,
    ) -> TemporalResult<DateDuration> {
        self.0.date_until(one, two, largest_unit)
    }

    /// `CalendarEra`
    pub fn era(&self, iso_date: &IsoDate) -> Option<TinyAsciiStr<16>> {
        self.0.era(iso_date)
    }

    /// `CalendarEraYear`
    pub fn era_year(&self, iso_date: &IsoDate) -> Option<i32> {
        self.0.era_year(iso_date)
    }

    /// `CalendarYear`
    pub fn year(&self, iso_date: &IsoDate) -> i32 {
        self.0.year(iso_date)
    }

    /// `CalendarMonth`
    pub fn month(&self, iso_date: &IsoDate) -> u8 {
        self.0.month(iso_date)
    }

    /// `CalendarDay`
    pub fn day(&self, iso_date: &IsoDate) -> u8 {
        self.0.day(iso_date)
    }

    /// `CalendarDayOfWeek`
    pub fn day_of_week(&self, iso_date: &IsoDate) -> u16 {
        self.0.day_of_week(iso_date)
    }

    /// `CalendarDayOfYear`
    pub fn day_of_year(&self, iso_date: &IsoDate) -> u16 {
        self.0.day_of_year(iso_date)
    }

    /// `CalendarWeekOfYear`
    pub fn week_of_year(&self, iso_date: &IsoDate) -> Option<u8> {
        self.0.week_of_year(iso_date)
    }

    /// `CalendarYearOfWeek`
    pub fn year_of_week(&self, iso_date: &IsoDate) -> Option<i32> {
        self.0.year_of_week(iso_date)
    }

    /// `CalendarDaysInWeek`
    pub fn days_in_week(&self, iso_date: &IsoDate) -> u16 {
        self.0.days_in_week(iso_date)
    }

    /// `CalendarDaysInMonth`
    pub fn days_in_month(&self, iso_date: &IsoDate) -> u8 {
        self.0.days_in_month(iso_date)
    }

    /// `CalendarDaysInYear`
    pub fn days_in_year(&self, iso_date: &IsoDate) -> u16 {
        self.0.days_in_year(iso_date)
    }

    /// `CalendarMonthsInYear`
    pub fn months_in_year(&self, iso_date: &IsoDate) -> u8 {
        self.0.months_in_year(iso_date)
    }

    /// `CalendarInLeapYear`
    pub fn in_leap_year(&self, iso_date: &IsoDate) -> bool {
        self.0.in_leap_year(iso_date)
    }
}

impl FromStr for Calendar {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl From<PlainDate> for Calendar {
    fn from(value: PlainDate) -> Self {
        *value.calendar()
    }
}

impl From<PlainDateTime> for Calendar {
    fn from(value: PlainDateTime) -> Self {
        *value.calendar()
    }
}

impl From<ZonedDateTime> for Calendar {
    fn from(value: ZonedDateTime) -> Self {
        *value.calendar()
    }
}

#[cfg(test)]
mod tests {
    use crate::{iso::IsoDate, options::Unit};
    use core::str::FromStr;

    use super::{testing::SINGLE_ERA, Calendar};

    #[test]
    fn calendar_from_str_is_case_insensitive() {
        let calendar = Calendar::from_utf8("iSo8601".as_bytes()).unwrap();
        assert_eq!(calendar, Calendar::default());
        assert_eq!(Calendar::from_str("ISO8601").unwrap(), Calendar::ISO);
    }

    #[test]
    fn calendar_invalid_ascii_value() {
        let _err = Calendar::from_str("Ä°SO8601").unwrap_err();
        let _err = Calendar::from_str("\u{0130}SO8601").unwrap_err();
        let _err = Calendar::from_str("").unwrap_err();
        let _err = Calendar::from_str("hebrew").unwrap_err();
        let _err = Calendar::from_str("gregory").unwrap_err();
        let _err = Calendar::from_str("single-era").unwrap_err();
    }

    #[test]
    fn date_until_largest_year() {
        // tests format: (Date one, PlainDate two, (years, months, weeks, days))
        let tests = [
            ((2021, 7, 16), (2021, 7, 16), (0, 0, 0, 0)),
            ((2021, 7, 16), (2021, 7, 17), (0, 0, 0, 1)),
            ((2021, 7, 16), (2021, 7, 23), (0, 0, 0, 7)),
            ((2021, 7, 16), (2021, 8, 16), (0, 1, 0, 0)),
            ((2020, 12, 16), (2021, 1, 16), (0, 1, 0, 0)),
            ((2021, 1, 5), (2021, 2, 5), (0, 1, 0, 0)),
            ((2021, 1, 7), (2021, 3, 7), (0, 2, 0, 0)),
            ((2021, 7, 16), (2021, 8, 17), (0, 1, 0, 1)),
            ((2021, 7, 16), (2021, 8, 13), (0, 0, 0, 28)),
            ((2021, 7, 16), (2021, 9, 16), (0, 2, 0, 0)),
            ((2021, 7, 16), (2022, 7, 16), (1, 0, 0, 0)),
            ((2021, 7, 16), (2031, 7, 16), (10, 0, 0, 0)),
            ((2021, 7, 16), (2022, 7, 19), (1, 0, 0, 3)),
            ((2021, 7, 16), (2022, 9, 19), (1, 2, 0, 3)),
            ((2021, 7, 16), (2031, 12, 16), (10, 5, 0, 0)),
            ((1997, 12, 16), (2021, 7, 16), (23, 7, 0, 0)),
            ((1997, 7, 16), (2021, 7, 16), (24, 0, 0, 0)),
            ((1997, 7, 16), (2021, 7, 15), (23, 11, 0, 29)),
            ((1997, 6, 16), (2021, 6, 15), (23, 11, 0, 30)),
            ((1960, 2, 16), (2020, 3, 16), (60, 1, 0, 0)),
            ((1960, 2, 16), (2021, 3, 15), (61, 0, 0, 27)),
            ((1960, 2, 16), (2020, 3, 15), (60, 0, 0, 28)),
            ((2021, 3, 30), (2021, 7, 16), (0, 3, 0, 16)),
            ((2020, 3, 30), (2021, 7, 16), (1, 3, 0, 16)),
            ((1960, 3, 30), (2021, 7, 16), (61, 3, 0, 16)),
            ((2019, 12, 30), (2021, 7, 16), (1, 6, 0, 16)),
            ((2020, 12, 30), (2021, 7, 16), (0, 6, 0, 16)),
            ((1997, 12, 30), (2021, 7, 16), (23, 6, 0, 16)),
            ((1, 12, 25), (2021, 7, 16), (2019, 6, 0, 21)),
            ((2019, 12, 30), (2021, 3, 5), (1, 2, 0, 5)),
            ((2021, 7, 17), (2021, 7, 16), (0, 0, 0, -1)),
            ((2021, 7, 23), (2021, 7, 16), (0, 0, 0, -7)),
            ((2021, 8, 16), (2021, 7, 16), (0, -1, 0, 0)),
            ((2021, 1, 16), (2020, 12, 16), (0, -1, 0, 0)),
            ((2021, 2, 5), (2021, 1, 5), (0, -1, 0, 0)),
            ((2021, 3, 7), (2021, 1, 7), (0, -2, 0, 0)),
            ((2021, 8, 17), (2021, 7, 16), (0, -1, 0, -1)),
            ((2021, 8, 13), (2021, 7, 16), (0, 0, 0, -28)),
            ((2021, 9, 16), (2021, 7, 16), (0, -2, 0, 0)),
            ((2022, 7, 16), (2021, 7, 16), (-1, 0, 0, 0)),
            ((2031, 7, 16), (2021, 7, 16), (-10, 0, 0, 0)),
            ((2022, 7, 19), (2021, 7, 16), (-1, 0, 0, -3)),
            ((2022, 9, 19), (2021, 7, 16), (-1, -2, 0, -3)),
            ((2031, 12, 16), (2021, 7, 16), (-10, -5, 0, 0)),
            ((2021, 7, 16), (1997, 12, 16), (-23, -7, 0, 0)),
            ((2021, 7, 16), (1997, 7, 16), (-24, 0, 0, 0)),
            ((2021, 7, 15), (1997, 7, 16), (-23, -11, 0, -30)),
            ((2021, 6, 15), (1997, 6, 16), (-23, -11, 0, -29)),
            ((2020, 3, 16), (1960, 2, 16), (-60, -1, 0, 0)),
            ((2021, 3, 15), (1960, 2, 16), (-61, 0, 0, -28)),
            ((2020, 3, 15), (1960, 2, 16), (-60, 0, 0, -28)),
            ((2021, 7, 16), (2021, 3, 30), (0, -3, 0, -17)),
            ((2021, 7, 16), (2020, 3, 30), (-1, -3, 0, -17)),
            ((2021, 7, 16), (1960, 3, 30), (-61, -3, 0, -17)),
            ((2021, 7, 16), (2019, 12, 30), (-1, -6, 0, -17)),
            ((2021, 7, 16), (2020, 12, 30), (0, -6, 0, -17)),
            ((2021, 7, 16), (1997, 12, 30), (-23, -6, 0, -17)),
            ((2021, 7, 16), (1, 12, 25), (-2019, -6, 0, -22)),
            ((2021, 3, 5), (2019, 12, 30), (-1, -2, 0, -6)),
        ];

        let calendar = Calendar::default();

        for test in tests {
            let first = IsoDate::new_unchecked(test.0 .0, test.0 .1, test.0 .2);
            let second = IsoDate::new_unchecked(test.1 .0, test.1 .1, test.1 .2);
            let result = calendar.date_until(&first, &second, Unit::Year).unwrap();
            assert_eq!(
                (result.years, result.months, result.weeks, result.days),
                test.2,
                "failed for test \"{test:?}\""
            );
        }
    }

    #[test]
    fn calendar_fields_by_system() {
        let date = IsoDate::new_unchecked(1976, 11, 18);
        let iso = Calendar::ISO;
        assert_eq!(iso.era(&date), None);
        assert_eq!(iso.week_of_year(&date), Some(47));
        assert_eq!(iso.year_of_week(&date), Some(1976));
        assert_eq!(iso.day_of_week(&date), 4);
        assert_eq!(iso.day_of_year(&date), 323);
        assert_eq!(iso.days_in_year(&date), 366);
        assert!(iso.in_leap_year(&date));

        assert_eq!(iso.era_year(&date), None);

        let custom = SINGLE_ERA;
        assert_ne!(custom, iso);
        assert_eq!(custom.era(&date).as_deref(), Some("ce"));
        assert_eq!(custom.era_year(&date), Some(1976));
        assert_eq!(custom.month(&date), 11);
        // Week numbering is opt-in per system.
        assert_eq!(custom.week_of_year(&date), None);
    }
}
