use crate::builtins::{
    core::{Now, PlainDate, PlainDateTime, PlainTime, ZonedDateTime},
    TZ_PROVIDER,
};
use crate::{TemporalResult, TimeZone};

impl Now {
    /// Returns the host's time zone.
    ///
    /// Enable with the `compiled_data` and `sys` feature flags.
    pub fn time_zone() -> TemporalResult<TimeZone> {
        Now::time_zone_with_provider(&*TZ_PROVIDER)
    }

    /// Returns the current time as a `ZonedDateTime` in the ISO calendar.
    ///
    /// Enable with the `compiled_data` and `sys` feature flags.
    pub fn zoneddatetime_iso(timezone: Option<TimeZone>) -> TemporalResult<ZonedDateTime> {
        Now::zoneddatetime_iso_with_provider(timezone, &*TZ_PROVIDER)
    }

    /// Returns the current local date-time.
    ///
    /// Enable with the `compiled_data` and `sys` feature flags.
    pub fn plain_datetime_iso(timezone: Option<TimeZone>) -> TemporalResult<PlainDateTime> {
        Now::plain_datetime_iso_with_provider(timezone, &*TZ_PROVIDER)
    }

    /// Returns the current local date.
    ///
    /// Enable with the `compiled_data` and `sys` feature flags.
    pub fn plain_date_iso(timezone: Option<TimeZone>) -> TemporalResult<PlainDate> {
        Now::plain_date_iso_with_provider(timezone, &*TZ_PROVIDER)
    }

    /// Returns the current local time.
    ///
    /// Enable with the `compiled_data` and `sys` feature flags.
    pub fn plain_time_iso(timezone: Option<TimeZone>) -> TemporalResult<PlainTime> {
        Now::plain_time_iso_with_provider(timezone, &*TZ_PROVIDER)
    }
}
