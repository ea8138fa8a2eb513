//! Reading the current date and time.

use crate::{provider::TimeZoneProvider, time::EpochNanoseconds, TemporalResult};

use super::{
    calendar::Calendar, timezone::TimeZone, Instant, PlainDate, PlainDateTime, PlainTime,
    ZonedDateTime,
};

/// Access to the current time.
///
/// Each `*_at` method converts an explicit clock reading taken in a known
/// time zone. With the `sys` feature the remaining methods take that
/// reading from the host.
#[derive(Debug, Clone, Copy)]
pub struct Now;

impl Now {
    /// Returns a clock reading as a `ZonedDateTime` in the ISO calendar.
    pub fn zoneddatetime_iso_at(
        epoch_nanoseconds: EpochNanoseconds,
        time_zone: TimeZone,
    ) -> ZonedDateTime {
        ZonedDateTime::new_unchecked(Instant::from(epoch_nanoseconds), Calendar::ISO, time_zone)
    }

    /// Returns the local date-time of a clock reading.
    pub fn plain_datetime_iso_at(
        epoch_nanoseconds: EpochNanoseconds,
        time_zone: TimeZone,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDateTime> {
        let iso = time_zone.get_iso_datetime_for(&epoch_nanoseconds, provider)?;
        Ok(PlainDateTime::new_unchecked(iso, Calendar::ISO))
    }

    pub fn plain_date_iso_at(
        epoch_nanoseconds: EpochNanoseconds,
        time_zone: TimeZone,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDate> {
        Self::plain_datetime_iso_at(epoch_nanoseconds, time_zone, provider)
            .map(|dt| dt.to_plain_date())
    }

    pub fn plain_time_iso_at(
        epoch_nanoseconds: EpochNanoseconds,
        time_zone: TimeZone,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainTime> {
        Self::plain_datetime_iso_at(epoch_nanoseconds, time_zone, provider)
            .map(|dt| dt.to_plain_time())
    }
}

#[cfg(feature = "sys")]
impl Now {
    /// Returns the current instant.
    pub fn instant() -> TemporalResult<Instant> {
        crate::sys::get_system_nanoseconds().map(Instant::from)
    }

    /// Returns the host's time zone.
    pub fn time_zone_with_provider(provider: &impl TimeZoneProvider) -> TemporalResult<TimeZone> {
        crate::sys::get_system_timezone(provider)
    }

    /// Returns the current time in `time_zone`, or in the host's time zone
    /// when `None`.
    pub fn zoneddatetime_iso_with_provider(
        time_zone: Option<TimeZone>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<ZonedDateTime> {
        let (epoch_nanoseconds, time_zone) = read_host(time_zone, provider)?;
        Ok(Self::zoneddatetime_iso_at(epoch_nanoseconds, time_zone))
    }

    pub fn plain_datetime_iso_with_provider(
        time_zone: Option<TimeZone>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDateTime> {
        let (epoch_nanoseconds, time_zone) = read_host(time_zone, provider)?;
        Self::plain_datetime_iso_at(epoch_nanoseconds, time_zone, provider)
    }

    pub fn plain_date_iso_with_provider(
        time_zone: Option<TimeZone>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDate> {
        let (epoch_nanoseconds, time_zone) = read_host(time_zone, provider)?;
        Self::plain_date_iso_at(epoch_nanoseconds, time_zone, provider)
    }

    pub fn plain_time_iso_with_provider(
        time_zone: Option<TimeZone>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainTime> {
        let (epoch_nanoseconds, time_zone) = read_host(time_zone, provider)?;
        Self::plain_time_iso_at(epoch_nanoseconds, time_zone, provider)
    }
}

/// Reads the host clock. The zone is resolved first.
#[cfg(feature = "sys")]
fn read_host(
    time_zone: Option<TimeZone>,
    provider: &impl TimeZoneProvider,
) -> TemporalResult<(EpochNanoseconds, TimeZone)> {
    let time_zone = match time_zone {
        Some(time_zone) => time_zone,
        None => crate::sys::get_system_timezone(provider)?,
    };
    Ok((crate::sys::get_system_nanoseconds()?, time_zone))
}

#[cfg(test)]
mod tests {
    use crate::{
        builtins::core::Now, options::DifferenceSettings, provider::NeverProvider,
        time::EpochNanoseconds, TimeZone, UtcOffset,
    };

    // 2025-03-11T22:46:28.077363694-05:00
    const READING: i128 = 1_741_751_188_077_363_694;

    fn reading(offset_ns: i128) -> EpochNanoseconds {
        EpochNanoseconds::try_from(READING + offset_ns).unwrap()
    }

    #[test]
    fn fixed_readings() {
        let zone = TimeZone::UtcOffset(UtcOffset::from_minutes(-300));

        let now = Now::plain_datetime_iso_at(reading(0), zone.clone(), &NeverProvider).unwrap();
        assert_eq!((now.year(), now.month(), now.day()), (2025, 3, 11));
        assert_eq!((now.hour(), now.minute(), now.second()), (22, 46, 28));
        assert_eq!(
            (now.millisecond(), now.microsecond(), now.nanosecond()),
            (77, 363, 694)
        );

        let later =
            Now::plain_datetime_iso_at(reading(5_000_000_000), zone.clone(), &NeverProvider)
                .unwrap();
        let elapsed = now.until(&later, DifferenceSettings::default()).unwrap();
        assert_eq!((elapsed.minutes(), elapsed.seconds()), (0, 5));

        let date = Now::plain_date_iso_at(reading(0), zone.clone(), &NeverProvider).unwrap();
        assert_eq!(date, now.to_plain_date());
        let time = Now::plain_time_iso_at(reading(0), zone.clone(), &NeverProvider).unwrap();
        assert_eq!(time, now.to_plain_time());

        // Two hours later the local date has rolled over.
        let tomorrow =
            Now::plain_date_iso_at(reading(2 * 3_600_000_000_000), zone.clone(), &NeverProvider)
                .unwrap();
        assert_eq!(tomorrow.day(), 12);

        let zoned = Now::zoneddatetime_iso_at(reading(0), zone);
        assert_eq!(zoned.epoch_nanoseconds(), &reading(0));
    }

    #[cfg(feature = "tzdb")]
    #[test]
    fn fixed_reading_in_named_zone() {
        use crate::tzdb::CompiledTzdbProvider;

        let provider = CompiledTzdbProvider::default();
        let chicago = TimeZone::try_from_str_with_provider("America/Chicago", &provider).unwrap();

        let time = Now::plain_time_iso_at(reading(0), chicago, &provider).unwrap();
        assert_eq!((time.hour(), time.minute(), time.second()), (22, 46, 28));
    }

    #[cfg(feature = "sys")]
    #[test]
    fn host_clock_advances() {
        use std::{thread, time::Duration};

        let utc = TimeZone::UtcOffset(UtcOffset::from_minutes(0));

        let before = Now::plain_datetime_iso_with_provider(Some(utc.clone()), &NeverProvider)
            .unwrap();
        thread::sleep(Duration::from_secs(2));
        let after = Now::plain_datetime_iso_with_provider(Some(utc), &NeverProvider).unwrap();

        let elapsed = after.since(&before, DifferenceSettings::default()).unwrap();
        // `sleep` only guarantees a lower bound.
        assert!((2..=7).contains(&elapsed.seconds()));
        assert_eq!((elapsed.hours(), elapsed.minutes()), (0, 0));
    }
}
