use crate::{
    builtins::TZ_PROVIDER, options::ToStringRoundingOptions, Instant, TemporalResult, TimeZone,
};
use alloc::string::String;

impl Instant {
    /// Returns the RFC 9557 (IXDTF) string for this `Instant` with the
    /// provided options.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn to_ixdtf_string(
        &self,
        timezone: Option<&TimeZone>,
        options: ToStringRoundingOptions,
    ) -> TemporalResult<String> {
        self.to_ixdtf_string_with_provider(timezone, options, &*TZ_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use crate::{options::ToStringRoundingOptions, Instant, TimeZone};

    #[test]
    fn instant_string_in_named_zone() {
        let instant = Instant::try_new(1_583_658_000_000_000_000).unwrap();
        let tz = TimeZone::try_from_identifier_str("America/Los_Angeles").unwrap();
        let result = instant
            .to_ixdtf_string(Some(&tz), ToStringRoundingOptions::default())
            .unwrap();
        assert_eq!(result, "2020-03-08T01:00:00-08:00");

        let result = instant
            .to_ixdtf_string(None, ToStringRoundingOptions::default())
            .unwrap();
        assert_eq!(result, "2020-03-08T09:00:00Z");
    }
}
