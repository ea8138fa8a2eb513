//! Utility date and time equations.
//!
//! The epoch day conversions use the Neri-Schneider Euclidean affine
//! equations over the computational calendar (March based years). All
//! arithmetic is integer arithmetic.

use crate::NS_PER_DAY;

/// The rata die of 1970-01-01 in the computational calendar.
const EPOCH_COMPUTATIONAL_RATA_DIE: i64 = 719_468;
const DAYS_IN_A_400Y_CYCLE: i64 = 146_097;
const TWO_POWER_SIXTEEN: i64 = 65_536;

/// Returns the epoch day for a proleptic Gregorian `year`, `month`, and `day`.
///
/// The month and day are not validated; out of range days count on from
/// the first of the month.
pub(crate) fn epoch_days_from_gregorian_date(year: i32, month: u8, day: u8) -> i64 {
    // Shift January and February to the end of the previous computational year.
    let j = i64::from(month <= 2);
    let computational_year = i64::from(year) - j;
    let computational_month = i64::from(month) + 12 * j;
    let computational_day = i64::from(day) - 1;
    let century = computational_year.div_euclid(100);

    let y_star = (1461 * computational_year).div_euclid(4) - century + century.div_euclid(4);
    let m_star = (979 * computational_month - 2919) / 32;
    y_star + m_star + computational_day - EPOCH_COMPUTATIONAL_RATA_DIE
}

/// Returns the proleptic Gregorian `(year, month, day)` for an epoch day.
pub(crate) fn ymd_from_epoch_days(epoch_days: i64) -> (i32, u8, u8) {
    let rata_die = epoch_days + EPOCH_COMPUTATIONAL_RATA_DIE;

    // Century and day of century
    let n_one = 4 * rata_die + 3;
    let century = n_one.div_euclid(DAYS_IN_A_400Y_CYCLE);
    let day_of_century = n_one.rem_euclid(DAYS_IN_A_400Y_CYCLE) / 4;

    // Year of century and day of year
    let n_two = 4 * day_of_century + 3;
    let year_of_century = n_two / 1461;
    let day_of_year = (n_two % 1461) / 4;

    // Month and day
    let n_three = 2141 * day_of_year + 197_913;
    let month = n_three / TWO_POWER_SIXTEEN;
    let day = (n_three % TWO_POWER_SIXTEEN) / 2141;

    let j = i64::from(day_of_year >= 306);
    let year = 100 * century + year_of_century + j;
    (year as i32, (month - 12 * j) as u8, (day + 1) as u8)
}

/// Returns whether the ISO year is a leap year.
#[inline]
pub(crate) const fn iso_in_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the amount of days in an ISO year.
#[inline]
pub(crate) const fn iso_days_in_year(year: i32) -> u16 {
    if iso_in_leap_year(year) {
        366
    } else {
        365
    }
}

/// Returns the amount of days in an ISO month.
pub(crate) const fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if iso_in_leap_year(year) => 29,
        _ => 28,
    }
}

/// Returns the ISO day of the week for an epoch day, where Monday is 1 and
/// Sunday is 7.
#[inline]
pub(crate) fn epoch_days_to_day_of_week(epoch_days: i64) -> u16 {
    // 1970-01-01 was a Thursday.
    ((epoch_days + 3).rem_euclid(7) + 1) as u16
}

/// Returns the one based ordinal day of the year.
pub(crate) fn iso_day_of_year(year: i32, month: u8, day: u8) -> u16 {
    let days = epoch_days_from_gregorian_date(year, month, day)
        - epoch_days_from_gregorian_date(year, 1, 1);
    days as u16 + 1
}

/// Returns the ISO 8601 `(week, week_year)` of a date.
pub(crate) fn iso_week_of_year(year: i32, month: u8, day: u8) -> (u8, i32) {
    let day_of_year = i32::from(iso_day_of_year(year, month, day));
    let day_of_week = i32::from(epoch_days_to_day_of_week(epoch_days_from_gregorian_date(
        year, month, day,
    )));
    let week = (day_of_year - day_of_week + 10) / 7;

    if week < 1 {
        // The date belongs to the last week of the previous year.
        let previous = year - 1;
        let dec_31 = epoch_days_from_gregorian_date(previous, 12, 31);
        let jan_1_dow = i32::from(epoch_days_to_day_of_week(
            dec_31 - i64::from(iso_days_in_year(previous)) + 1,
        ));
        let long_year = jan_1_dow == 4 || (jan_1_dow == 3 && iso_in_leap_year(previous));
        return (if long_year { 53 } else { 52 }, previous);
    }

    if week == 53 {
        let remaining = i32::from(iso_days_in_year(year)) - day_of_year;
        // Thursday of this week falls in the next year.
        if remaining < 4 - day_of_week {
            return (1, year + 1);
        }
    }

    (week as u8, year)
}

/// Splits nanoseconds from the epoch into `(epoch_days, nanoseconds_in_day)`.
#[inline]
pub(crate) fn epoch_ns_to_days_and_time(nanoseconds: i128) -> (i64, u64) {
    let ns_per_day = i128::from(NS_PER_DAY);
    (
        nanoseconds.div_euclid(ns_per_day) as i64,
        nanoseconds.rem_euclid(ns_per_day) as u64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_days_round_trip() {
        assert_eq!(epoch_days_from_gregorian_date(1970, 1, 1), 0);
        assert_eq!(ymd_from_epoch_days(0), (1970, 1, 1));
        assert_eq!(epoch_days_from_gregorian_date(2000, 3, 1), 11_017);
        assert_eq!(ymd_from_epoch_days(11_016), (2000, 2, 29));
        assert_eq!(ymd_from_epoch_days(-1), (1969, 12, 31));

        for days in [-100_000_001, -719_528, -1, 0, 59, 365, 10_957, 100_000_000] {
            let (y, m, d) = ymd_from_epoch_days(days);
            assert_eq!(epoch_days_from_gregorian_date(y, m, d), days, "{y}-{m}-{d}");
        }
    }

    #[test]
    fn epoch_days_limits() {
        assert_eq!(ymd_from_epoch_days(100_000_000), (275_760, 9, 13));
        assert_eq!(ymd_from_epoch_days(-100_000_001), (-271_821, 4, 19));
        assert_eq!(epoch_days_from_gregorian_date(-271_821, 4, 20), -100_000_000);
        assert_eq!(ymd_from_epoch_days(-719_528), (0, 1, 1));
    }

    #[test]
    fn leap_years() {
        assert!(iso_in_leap_year(2000));
        assert!(iso_in_leap_year(2024));
        assert!(!iso_in_leap_year(1900));
        assert!(!iso_in_leap_year(2023));
        assert!(iso_in_leap_year(0));
        assert!(iso_in_leap_year(-4));
        assert_eq!(iso_days_in_month(2020, 2), 29);
        assert_eq!(iso_days_in_month(2100, 2), 28);
        assert_eq!(iso_days_in_year(-100), 365);
    }

    #[test]
    fn day_of_week() {
        // Thursday
        assert_eq!(epoch_days_to_day_of_week(0), 4);
        // 2024-06-09 was a Sunday
        assert_eq!(
            epoch_days_to_day_of_week(epoch_days_from_gregorian_date(2024, 6, 9)),
            7
        );
        // 1969-12-29 was a Monday
        assert_eq!(epoch_days_to_day_of_week(-3), 1);
    }

    #[test]
    fn week_of_year() {
        assert_eq!(iso_week_of_year(1976, 11, 18), (47, 1976));
        assert_eq!(iso_day_of_year(1976, 11, 18), 323);
        // 2021-01-01 belongs to the last week of 2020
        assert_eq!(iso_week_of_year(2021, 1, 1), (53, 2020));
        // 2019-12-30 belongs to the first week of 2020
        assert_eq!(iso_week_of_year(2019, 12, 30), (1, 2020));
        assert_eq!(iso_week_of_year(2020, 12, 31), (53, 2020));
        assert_eq!(iso_week_of_year(2023, 1, 1), (52, 2022));
    }

    #[test]
    fn epoch_ns_split() {
        assert_eq!(epoch_ns_to_days_and_time(0), (0, 0));
        assert_eq!(
            epoch_ns_to_days_and_time(-1),
            (-1, NS_PER_DAY - 1)
        );
    }
}
