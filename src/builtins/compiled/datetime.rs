use crate::{
    builtins::TZ_PROVIDER, options::Disambiguation, PlainDateTime, TemporalResult, TimeZone,
    ZonedDateTime,
};

impl PlainDateTime {
    /// Resolves this local date-time in `time_zone`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn to_zoned_date_time(
        &self,
        time_zone: TimeZone,
        disambiguation: Disambiguation,
    ) -> TemporalResult<ZonedDateTime> {
        self.to_zoned_date_time_with_provider(time_zone, disambiguation, &*TZ_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use crate::{options::Disambiguation, Calendar, PlainDateTime, TimeZone};

    #[test]
    fn to_zoned_date_time_edge_cases() {
        let pdt = PlainDateTime::try_new(2020, 3, 8, 2, 30, 0, 0, 0, 0, Calendar::default()).unwrap();
        let tz = TimeZone::try_from_identifier_str("America/Los_Angeles").unwrap();

        let zdt = pdt
            .to_zoned_date_time(tz.clone(), Disambiguation::Compatible)
            .unwrap();
        assert_eq!(zdt.hour(), Ok(3));

        let zdt = pdt
            .to_zoned_date_time(tz.clone(), Disambiguation::Earlier)
            .unwrap();
        assert_eq!(zdt.hour(), Ok(1));

        assert!(pdt.to_zoned_date_time(tz, Disambiguation::Reject).is_err());
    }
}
