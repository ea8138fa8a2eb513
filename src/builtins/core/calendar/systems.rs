//! The built-in calendar system.

use crate::{iso::IsoDate, options::ArithmeticOverflow, utils, TemporalError, TemporalResult};

use super::{CalendarFields, CalendarSystem};

/// The ISO 8601 calendar, `iso8601`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iso;

impl CalendarSystem for Iso {
    fn identifier(&self) -> &'static str {
        "iso8601"
    }

    fn date_from_fields(
        &self,
        fields: &CalendarFields,
        overflow: ArithmeticOverflow,
    ) -> TemporalResult<IsoDate> {
        // The ISO calendar has no eras, so only `year` is read.
        let year = fields
            .year
            .ok_or(TemporalError::r#type().with_message("Required year field is empty."))?;
        let (month, day) = fields.required_month_day()?;
        IsoDate::regulate(year, month, day, overflow)
    }

    fn year(&self, date: &IsoDate) -> i32 {
        date.year
    }

    fn month(&self, date: &IsoDate) -> u8 {
        date.month
    }

    fn day(&self, date: &IsoDate) -> u8 {
        date.day
    }

    fn months_in_year(&self, _date: &IsoDate) -> u8 {
        12
    }

    fn days_in_month(&self, date: &IsoDate) -> u8 {
        utils::iso_days_in_month(date.year, date.month)
    }

    fn days_in_year(&self, date: &IsoDate) -> u16 {
        utils::iso_days_in_year(date.year)
    }

    fn in_leap_year(&self, date: &IsoDate) -> bool {
        utils::iso_in_leap_year(date.year)
    }

    fn day_of_year(&self, date: &IsoDate) -> u16 {
        utils::iso_day_of_year(date.year, date.month, date.day)
    }

    fn week_of_year(&self, date: &IsoDate) -> Option<u8> {
        Some(utils::iso_week_of_year(date.year, date.month, date.day).0)
    }

    fn year_of_week(&self, date: &IsoDate) -> Option<i32> {
        Some(utils::iso_week_of_year(date.year, date.month, date.day).1)
    }
}

#[cfg(test)]
mod tests {
    use super::Iso;
    use crate::{
        builtins::core::calendar::{testing::SingleEra, CalendarFields, CalendarSystem},
        error::ErrorKind,
        options::ArithmeticOverflow,
    };
    use tinystr::tinystr;

    #[test]
    fn date_from_fields_overflow() {
        let fields = CalendarFields::new().with_year(2021).with_month(2).with_day(31);
        let date = Iso
            .date_from_fields(&fields, ArithmeticOverflow::Constrain)
            .unwrap();
        assert_eq!((date.month, date.day), (2, 28));
        assert!(Iso
            .date_from_fields(&fields, ArithmeticOverflow::Reject)
            .is_err());

        let zero_day = fields.with_day(0);
        let err = Iso
            .date_from_fields(&zero_day, ArithmeticOverflow::Constrain)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        let missing = CalendarFields::new().with_year(2021).with_month(2);
        let err = Iso
            .date_from_fields(&missing, ArithmeticOverflow::Constrain)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn era_fields() {
        let fields = CalendarFields::new()
            .with_era(tinystr!(16, "ce"), 2019)
            .with_month(5)
            .with_day(1);
        let date = SingleEra
            .date_from_fields(&fields, ArithmeticOverflow::Reject)
            .unwrap();
        assert_eq!((date.year, date.month, date.day), (2019, 5, 1));

        // `year` and `era_year` must agree.
        assert!(SingleEra
            .date_from_fields(&fields.with_year(2020), ArithmeticOverflow::Reject)
            .is_err());

        let fields = fields.with_era(tinystr!(16, "bce"), 1);
        assert!(SingleEra
            .date_from_fields(&fields, ArithmeticOverflow::Reject)
            .is_err());

        // The ISO calendar ignores eras entirely.
        let fields = CalendarFields::new()
            .with_era(tinystr!(16, "ce"), 2019)
            .with_month(5)
            .with_day(1);
        let err = Iso
            .date_from_fields(&fields, ArithmeticOverflow::Reject)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
