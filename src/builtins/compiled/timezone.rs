use crate::{builtins::TZ_PROVIDER, TemporalResult, TimeZone};

impl TimeZone {
    /// Parses a `TimeZone` from an identifier or a date-time string.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn try_from_str(source: &str) -> TemporalResult<Self> {
        Self::try_from_str_with_provider(source, &*TZ_PROVIDER)
    }

    /// Parses a `TimeZone` from a bare identifier, such as `Europe/Vienna`
    /// or `+05:30`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn try_from_identifier_str(identifier: &str) -> TemporalResult<Self> {
        Self::try_from_identifier_str_with_provider(identifier, &*TZ_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use crate::TimeZone;

    #[test]
    fn identifiers_are_normalized() {
        let tz = TimeZone::try_from_identifier_str("america/los_angeles").unwrap();
        assert_eq!(tz.identifier(), "America/Los_Angeles");

        let tz = TimeZone::try_from_identifier_str("+0530").unwrap();
        assert_eq!(tz.identifier(), "+05:30");

        assert!(TimeZone::try_from_identifier_str("Mars/Olympus_Mons").is_err());
    }
}
