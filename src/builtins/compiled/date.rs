use crate::{builtins::TZ_PROVIDER, PlainDate, PlainTime, TemporalResult, TimeZone, ZonedDateTime};

impl PlainDate {
    /// Converts this date to a `ZonedDateTime` at `time`, or at the start
    /// of the day when `time` is `None`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn to_zoned_date_time(
        &self,
        time_zone: TimeZone,
        time: Option<PlainTime>,
    ) -> TemporalResult<ZonedDateTime> {
        self.to_zoned_date_time_with_provider(time_zone, time, &*TZ_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::{Calendar, PlainDate, TimeZone};

    #[test]
    fn start_of_day_in_named_zone() {
        let date = PlainDate::try_new(2018, 11, 4, Calendar::default()).unwrap();
        let tz = TimeZone::try_from_identifier_str("America/Sao_Paulo").unwrap();
        let zdt = date.to_zoned_date_time(tz, None).unwrap();
        assert_eq!(zdt.hour().unwrap(), 1);
        assert_eq!(zdt.to_string(), "2018-11-04T01:00:00-02:00[America/Sao_Paulo]");
    }
}
