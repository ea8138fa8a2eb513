//! The generic calendar arithmetic engine.
//!
//! The engine only works through a calendar's `(year, month, day)` fields and
//! `date_from_fields`, so it never assumes a month length or a number of
//! months per year.

use core::cmp::Ordering;

use crate::{
    builtins::core::duration::DateDuration,
    error::ErrorMessage,
    iso::IsoDate,
    options::{ArithmeticOverflow, Unit},
    TemporalError, TemporalResult,
};

use super::{CalendarFields, CalendarSystem};

/// Years further than this from the epoch cannot produce a representable
/// date, so year balancing stops there.
const YEAR_LIMIT: i64 = 300_000;

fn check_year(year: i64) -> TemporalResult<i32> {
    if !(-YEAR_LIMIT..=YEAR_LIMIT).contains(&year) {
        return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
    }
    Ok(year as i32)
}

/// Returns the calendar's fields for an ISO date.
fn calendar_ymd<C: CalendarSystem + ?Sized>(calendar: &C, date: &IsoDate) -> (i32, u8, u8) {
    (calendar.year(date), calendar.month(date), calendar.day(date))
}

fn first_of_month<C: CalendarSystem + ?Sized>(
    calendar: &C,
    year: i32,
    month: u8,
) -> TemporalResult<IsoDate> {
    calendar.date_from_fields(
        &CalendarFields::from_ymd(year, month, 1),
        ArithmeticOverflow::Reject,
    )
}

/// Returns the number of months in a calendar year.
pub(crate) fn months_in_year_of<C: CalendarSystem + ?Sized>(
    calendar: &C,
    year: i32,
) -> TemporalResult<u8> {
    Ok(calendar.months_in_year(&first_of_month(calendar, year, 1)?))
}

/// Returns the number of days in a calendar month.
pub(crate) fn days_in_month_of<C: CalendarSystem + ?Sized>(
    calendar: &C,
    year: i32,
    month: u8,
) -> TemporalResult<u8> {
    Ok(calendar.days_in_month(&first_of_month(calendar, year, month)?))
}

/// Moves a `(year, month)` position by a number of months, carrying through
/// the months of each intermediate year.
fn add_months<C: CalendarSystem + ?Sized>(
    calendar: &C,
    year: i32,
    month: u8,
    months: i64,
) -> TemporalResult<(i32, u8)> {
    let mut year = i64::from(year);
    let mut month = i64::from(month) + months;
    while month < 1 {
        year -= 1;
        month += i64::from(months_in_year_of(calendar, check_year(year)?)?);
    }
    loop {
        let months_in_year = i64::from(months_in_year_of(calendar, check_year(year)?)?);
        if month <= months_in_year {
            break;
        }
        month -= months_in_year;
        year += 1;
    }
    Ok((check_year(year)?, month as u8))
}

/// Counts the months from one `(year, month)` position to another.
fn months_between<C: CalendarSystem + ?Sized>(
    calendar: &C,
    from: (i32, u8),
    to: (i32, u8),
) -> TemporalResult<i64> {
    match from.0.cmp(&to.0) {
        Ordering::Equal => Ok(i64::from(to.1) - i64::from(from.1)),
        Ordering::Less => {
            let mut months = i64::from(months_in_year_of(calendar, from.0)?) - i64::from(from.1);
            for year in from.0 + 1..to.0 {
                months += i64::from(months_in_year_of(calendar, year)?);
            }
            Ok(months + i64::from(to.1))
        }
        Ordering::Greater => months_between(calendar, to, from).map(|m| -m),
    }
}

/// Clamps a month to the months of `year`, or rejects it.
fn regulate_month<C: CalendarSystem + ?Sized>(
    calendar: &C,
    year: i32,
    month: u8,
    overflow: ArithmeticOverflow,
) -> TemporalResult<u8> {
    let months_in_year = months_in_year_of(calendar, year)?;
    match overflow {
        _ if month <= months_in_year => Ok(month),
        ArithmeticOverflow::Constrain => Ok(months_in_year),
        ArithmeticOverflow::Reject => {
            Err(TemporalError::range().with_enum(ErrorMessage::DateOverflowReject))
        }
    }
}

/// Returns whether the unregulated position `(year, month, day)` lies past
/// `end` in the direction of `sign`.
fn surpasses(sign: i64, position: (i32, u8, u8), end: (i32, u8, u8)) -> bool {
    let order = position.cmp(&end) as i64;
    order != 0 && order == sign
}

/// `CalendarDateAdd`
///
/// Years are applied first, then months with a carry through each
/// intermediate year. The day is then regulated against the resulting month
/// before weeks and days are added as a day count.
pub(crate) fn date_add<C: CalendarSystem + ?Sized>(
    calendar: &C,
    date: &IsoDate,
    duration: &DateDuration,
    overflow: ArithmeticOverflow,
) -> TemporalResult<IsoDate> {
    let (year, month, day) = calendar_ymd(calendar, date);

    // 1. Add years, keeping the month when the target year has it.
    let year = check_year(i64::from(year) + duration.years)?;
    let month = regulate_month(calendar, year, month, overflow)?;

    // 2. Add months.
    let (year, month) = add_months(calendar, year, month, duration.months)?;

    // 3. Regulate the day for the resulting month.
    let intermediate =
        calendar.date_from_fields(&CalendarFields::from_ymd(year, month, day), overflow)?;

    // 4. Add weeks and days.
    let days = duration
        .weeks
        .checked_mul(7)
        .and_then(|d| d.checked_add(duration.days))
        .ok_or(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))?;
    intermediate.add_days(days)
}

/// `CalendarDateUntil`
///
/// Whole years and months are taken such that adding them to `one` does not
/// pass `two`. The remaining days are the day difference between that
/// intermediate date and `two`.
pub(crate) fn date_until<C: CalendarSystem + ?Sized>(
    calendar: &C,
    one: &IsoDate,
    two: &IsoDate,
    largest_unit: Unit,
) -> TemporalResult<DateDuration> {
    let day_difference = two.to_epoch_days() - one.to_epoch_days();
    match largest_unit {
        Unit::Year | Unit::Month => {}
        Unit::Week => {
            return Ok(DateDuration::new_unchecked(
                0,
                0,
                day_difference / 7,
                day_difference % 7,
            ))
        }
        _ => return Ok(DateDuration::new_unchecked(0, 0, 0, day_difference)),
    }

    let sign = day_difference.signum();
    if sign == 0 {
        return Ok(DateDuration::default());
    }

    let start = calendar_ymd(calendar, one);
    let end = calendar_ymd(calendar, two);

    // 1. Take whole years, backing off when the candidate passes `end`.
    let mut years = 0;
    if largest_unit == Unit::Year {
        years = i64::from(end.0) - i64::from(start.0);
        while years != 0 {
            let year = check_year(i64::from(start.0) + years)?;
            let month = start.1.min(months_in_year_of(calendar, year)?);
            if !surpasses(sign, (year, month, start.2), end) {
                break;
            }
            years -= sign;
        }
    }

    // 2. Take whole months from the year-adjusted start in the same way.
    let year = check_year(i64::from(start.0) + years)?;
    let month = start.1.min(months_in_year_of(calendar, year)?);
    let mut months = months_between(calendar, (year, month), (end.0, end.1))?;
    let (year, month) = loop {
        let (y, m) = add_months(calendar, year, month, months)?;
        if months == 0 || !surpasses(sign, (y, m, start.2), end) {
            break (y, m);
        }
        months -= sign;
    };

    // 3. The remaining days are counted from the regulated intermediate date.
    let day = start.2.min(days_in_month_of(calendar, year, month)?);
    let intermediate = calendar.date_from_fields(
        &CalendarFields::from_ymd(year, month, day),
        ArithmeticOverflow::Constrain,
    )?;
    let days = two.to_epoch_days() - intermediate.to_epoch_days();

    Ok(DateDuration::new_unchecked(years, months, 0, days))
}

#[cfg(test)]
mod tests {
    use tinystr::TinyAsciiStr;

    use crate::{
        builtins::core::{
            calendar::{Calendar, CalendarFields, CalendarSystem},
            duration::DateDuration,
        },
        iso::IsoDate,
        options::{ArithmeticOverflow, Unit},
        utils, TemporalError, TemporalResult,
    };

    /// A calendar of thirteen 28 day months, with the leftover days of the
    /// ISO year appended to the last month.
    #[derive(Debug)]
    struct Thirteen;

    impl Thirteen {
        fn ordinal(date: &IsoDate) -> u16 {
            utils::iso_day_of_year(date.year, date.month, date.day)
        }
    }

    impl CalendarSystem for Thirteen {
        fn identifier(&self) -> &'static str {
            "thirteen"
        }

        fn date_from_fields(
            &self,
            fields: &CalendarFields,
            overflow: ArithmeticOverflow,
        ) -> TemporalResult<IsoDate> {
            let (Some(year), Some(month), Some(day)) = (fields.year, fields.month, fields.day)
            else {
                return Err(TemporalError::r#type());
            };
            if month == 0 || day == 0 {
                return Err(TemporalError::range());
            }
            let (month, day) = match overflow {
                ArithmeticOverflow::Constrain => {
                    let month = month.min(13);
                    let max = if month == 13 {
                        (utils::iso_days_in_year(year) - 12 * 28) as u8
                    } else {
                        28
                    };
                    (month, day.min(max))
                }
                ArithmeticOverflow::Reject => (month, day),
            };
            let max = if month == 13 {
                (utils::iso_days_in_year(year) - 12 * 28) as u8
            } else {
                28
            };
            if month > 13 || day > max {
                return Err(TemporalError::range());
            }
            let first = utils::epoch_days_from_gregorian_date(year, 1, 1);
            let ordinal = i64::from(month - 1) * 28 + i64::from(day) - 1;
            Ok(IsoDate::from_epoch_days(first + ordinal))
        }

        fn year(&self, date: &IsoDate) -> i32 {
            date.year
        }

        fn era(&self, _date: &IsoDate) -> Option<TinyAsciiStr<16>> {
            None
        }

        fn month(&self, date: &IsoDate) -> u8 {
            ((Self::ordinal(date) - 1) / 28 + 1).min(13) as u8
        }

        fn day(&self, date: &IsoDate) -> u8 {
            (Self::ordinal(date) - u16::from(self.month(date) - 1) * 28) as u8
        }

        fn months_in_year(&self, _date: &IsoDate) -> u8 {
            13
        }

        fn days_in_month(&self, date: &IsoDate) -> u8 {
            if self.month(date) == 13 {
                (self.days_in_year(date) - 12 * 28) as u8
            } else {
                28
            }
        }

        fn days_in_year(&self, date: &IsoDate) -> u16 {
            utils::iso_days_in_year(date.year)
        }

        fn in_leap_year(&self, date: &IsoDate) -> bool {
            utils::iso_in_leap_year(date.year)
        }

        fn day_of_year(&self, date: &IsoDate) -> u16 {
            Self::ordinal(date)
        }
    }

    static THIRTEEN: Thirteen = Thirteen;

    fn ymd(calendar: &Calendar, date: &IsoDate) -> (i32, u8, u8) {
        (
            calendar.year(date),
            calendar.month(date),
            calendar.day(date),
        )
    }

    #[test]
    fn custom_calendar_fields() {
        let calendar = Calendar::new(&THIRTEEN);
        // 2021-02-01 is day 32 of the year, the 4th of the second month.
        let date = IsoDate::new_unchecked(2021, 2, 1);
        assert_eq!(ymd(&calendar, &date), (2021, 2, 4));
        // The last day of a leap year is the 30th of the thirteenth month.
        let date = IsoDate::new_unchecked(2020, 12, 31);
        assert_eq!(ymd(&calendar, &date), (2020, 13, 30));
        assert_eq!(calendar.days_in_month(&date), 30);
    }

    #[test]
    fn custom_calendar_add() {
        let calendar = Calendar::new(&THIRTEEN);
        let start = calendar
            .date_from_fields(
                &CalendarFields::from_ymd(2021, 12, 10),
                ArithmeticOverflow::Reject,
            )
            .unwrap();

        // Month 13 exists, so one month later stays in the same year.
        let result = calendar
            .date_add(
                &start,
                &DateDuration::new_unchecked(0, 1, 0, 0),
                ArithmeticOverflow::Reject,
            )
            .unwrap();
        assert_eq!(ymd(&calendar, &result), (2021, 13, 10));

        let result = calendar
            .date_add(
                &start,
                &DateDuration::new_unchecked(0, 2, 0, 0),
                ArithmeticOverflow::Reject,
            )
            .unwrap();
        assert_eq!(ymd(&calendar, &result), (2022, 1, 10));

        // The 29th of month 13 constrains to the 28th of the next month.
        let end_of_year = calendar
            .date_from_fields(
                &CalendarFields::from_ymd(2021, 13, 29),
                ArithmeticOverflow::Reject,
            )
            .unwrap();
        let result = calendar
            .date_add(
                &end_of_year,
                &DateDuration::new_unchecked(0, 1, 0, 0),
                ArithmeticOverflow::Constrain,
            )
            .unwrap();
        assert_eq!(ymd(&calendar, &result), (2022, 1, 28));
        assert!(calendar
            .date_add(
                &end_of_year,
                &DateDuration::new_unchecked(0, 1, 0, 0),
                ArithmeticOverflow::Reject,
            )
            .is_err());

        let result = calendar
            .date_add(
                &start,
                &DateDuration::new_unchecked(0, -25, 0, 0),
                ArithmeticOverflow::Reject,
            )
            .unwrap();
        assert_eq!(ymd(&calendar, &result), (2019, 13, 10));
    }

    #[test]
    fn custom_calendar_until() {
        let calendar = Calendar::new(&THIRTEEN);
        let date = |y, m, d| {
            calendar
                .date_from_fields(&CalendarFields::from_ymd(y, m, d), ArithmeticOverflow::Reject)
                .unwrap()
        };

        let result = calendar
            .date_until(&date(2021, 12, 10), &date(2023, 1, 12), Unit::Year)
            .unwrap();
        assert_eq!((result.years, result.months, result.days), (1, 2, 2));

        let result = calendar
            .date_until(&date(2021, 12, 10), &date(2023, 1, 12), Unit::Month)
            .unwrap();
        assert_eq!((result.years, result.months, result.days), (0, 15, 2));

        let result = calendar
            .date_until(&date(2023, 1, 12), &date(2021, 12, 10), Unit::Month)
            .unwrap();
        assert_eq!((result.years, result.months, result.days), (0, -15, -2));
    }

    #[test]
    fn iso_month_end_differences() {
        let iso = Calendar::default();
        let jan_31 = IsoDate::new_unchecked(2020, 1, 31);

        let result = iso
            .date_until(&jan_31, &IsoDate::new_unchecked(2020, 3, 1), Unit::Month)
            .unwrap();
        assert_eq!((result.months, result.days), (1, 1));

        let result = iso
            .date_until(&jan_31, &IsoDate::new_unchecked(2020, 2, 29), Unit::Month)
            .unwrap();
        assert_eq!((result.months, result.days), (0, 29));

        let result = iso
            .date_until(&jan_31, &IsoDate::new_unchecked(2021, 3, 1), Unit::Week)
            .unwrap();
        assert_eq!((result.weeks, result.days), (56, 3));
    }

    #[test]
    fn iso_add_overflow() {
        let iso = Calendar::default();
        let jan_31 = IsoDate::new_unchecked(2020, 1, 31);
        let one_month = DateDuration::new_unchecked(0, 1, 0, 0);

        let result = iso
            .date_add(&jan_31, &one_month, ArithmeticOverflow::Constrain)
            .unwrap();
        assert_eq!(result, IsoDate::new_unchecked(2020, 2, 29));
        assert!(iso
            .date_add(&jan_31, &one_month, ArithmeticOverflow::Reject)
            .is_err());

        let result = iso
            .date_add(
                &IsoDate::new_unchecked(2020, 2, 29),
                &DateDuration::new_unchecked(1, 0, 0, 0),
                ArithmeticOverflow::Constrain,
            )
            .unwrap();
        assert_eq!(result, IsoDate::new_unchecked(2021, 2, 28));

        // Month counts far beyond the representable range fail.
        assert!(iso
            .date_add(
                &jan_31,
                &DateDuration::new_unchecked(0, 4_000_000_000, 0, 0),
                ArithmeticOverflow::Constrain,
            )
            .is_err());
    }
}
