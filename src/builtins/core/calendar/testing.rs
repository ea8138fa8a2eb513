//! A calendar for tests that need something other than `iso8601`.

use tinystr::{tinystr, TinyAsciiStr};

use super::{Calendar, CalendarFields, CalendarSystem, Iso};
use crate::{iso::IsoDate, options::ArithmeticOverflow, TemporalError, TemporalResult};

/// ISO months and days, with every year counted in a single `ce` era.
#[derive(Debug)]
pub(crate) struct SingleEra;

pub(crate) const SINGLE_ERA: Calendar = Calendar::new(&SingleEra);

const ERA: TinyAsciiStr<16> = tinystr!(16, "ce");

impl CalendarSystem for SingleEra {
    fn identifier(&self) -> &'static str {
        "single-era"
    }

    fn date_from_fields(
        &self,
        fields: &CalendarFields,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoDate> {
        let era_year = match (fields.era, fields.era_year) {
            (Some(era), Some(era_year)) if era == ERA => Some(era_year),
            (None, None) => None,
            _ => return Err(TemporalError::range().with_message("Unknown era.")),
        };
        let year = match (fields.year, era_year) {
            (Some(year), Some(era_year)) if year != era_year => {
                return Err(TemporalError::range().with_message("Year and era year disagree."))
            }
            (Some(year), _) | (None, Some(year)) => year,
            (None, None) => {
                return Err(TemporalError::r#type().with_message("Required year field is empty."))
            }
        };
        let (month, day) = fields.required_month_day()?;
        IsoDate::regulate(year, month, day, overflow)
    }

    fn year(&self, date: &IsoDate) -> i32 {
        date.year
    }

    fn era(&self, _date: &IsoDate) -> Option<TinyAsciiStr<16>> {
        Some(ERA)
    }

    fn era_year(&self, date: &IsoDate) -> Option<i32> {
        Some(date.year)
    }

    fn month(&self, date: &IsoDate) -> u8 {
        Iso.month(date)
    }

    fn day(&self, date: &IsoDate) -> u8 {
        Iso.day(date)
    }

    fn months_in_year(&self, date: &IsoDate) -> u8 {
        Iso.months_in_year(date)
    }

    fn days_in_month(&self, date: &IsoDate) -> u8 {
        Iso.days_in_month(date)
    }

    fn days_in_year(&self, date: &IsoDate) -> u16 {
        Iso.days_in_year(date)
    }

    fn in_leap_year(&self, date: &IsoDate) -> bool {
        Iso.in_leap_year(date)
    }

    fn day_of_year(&self, date: &IsoDate) -> u16 {
        Iso.day_of_year(date)
    }
}
