use crate::time::EpochNanoseconds;
use crate::{provider::TimeZoneProvider, TemporalError, TemporalResult, TimeZone};
use web_time::{SystemTime, UNIX_EPOCH};

/// Returns the host's time zone, resolved through `provider`.
#[inline]
pub(crate) fn get_system_timezone(
    provider: &(impl TimeZoneProvider + ?Sized),
) -> TemporalResult<TimeZone> {
    let identifier = iana_time_zone::get_timezone()
        .map_err(|_| TemporalError::general("Error fetching system time zone"))?;
    #[cfg(feature = "log")]
    log::trace!("system time zone: {identifier}");
    TimeZone::try_from_identifier_str_with_provider(&identifier, provider)
}

/// Returns the system time in nanoseconds.
pub(crate) fn get_system_nanoseconds() -> TemporalResult<EpochNanoseconds> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TemporalError::general("Error fetching system time"))?
        .as_nanos();
    let nanos = i128::try_from(nanos)
        .map_err(|_| TemporalError::general("System time is out of range"))?;
    EpochNanoseconds::try_from(nanos)
}
