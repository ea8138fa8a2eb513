//! This module implements `TimeZone` and the offset resolver.
//!
//! A `TimeZone` is either a fixed UTC offset or a named zone whose rules
//! come from a `TimeZoneProvider`. The resolver maps instants to local
//! date-times, and local date-times back to instants with disambiguation.

use alloc::string::{String, ToString};
use alloc::{vec, vec::Vec};
use core::{fmt, str::FromStr};

use crate::{
    builtins::core::duration::normalized::NormalizedTimeDuration,
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::Disambiguation,
    parsers::{self, FormattableOffset, TimeZoneSource},
    provider::TimeZoneProvider,
    time::EpochNanoseconds,
    TemporalError, TemporalResult, TemporalUnwrap, NS_PER_DAY,
};

const NS_PER_DAY_I128: i128 = NS_PER_DAY as i128;

/// The largest epoch day a local date-time may be resolved from.
const MAX_RESOLVABLE_EPOCH_DAYS: i64 = 100_000_000;

// ==== `UtcOffset` ====

/// A fixed UTC offset with nanosecond precision.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcOffset(i64);

impl UtcOffset {
    /// Creates an offset from nanoseconds, which must be under one day in magnitude.
    pub fn from_nanoseconds(nanoseconds: i64) -> TemporalResult<Self> {
        if nanoseconds.unsigned_abs() >= NS_PER_DAY {
            return Err(TemporalError::range().with_message("UTC offset must be less than a day."));
        }
        Ok(Self(nanoseconds))
    }

    /// Creates an offset from whole minutes.
    pub fn from_minutes(minutes: i16) -> Self {
        Self(i64::from(minutes) * 60_000_000_000)
    }

    /// Returns the offset in nanoseconds.
    #[inline]
    #[must_use]
    pub fn nanoseconds(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&FormattableOffset::from_nanoseconds(self.0), f)
    }
}

impl FromStr for UtcOffset {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parsers::parse_identifier(s)? {
            TimeZoneSource::Offset(offset) => Self::from_nanoseconds(offset),
            TimeZoneSource::Name(_) => {
                Err(TemporalError::range().with_message("Expected a UTC offset."))
            }
        }
    }
}

// ==== `TimeZone` ====

/// A time zone: a named IANA zone or a fixed offset.
///
/// Named zones hold the identifier in the provider's canonical casing, so
/// two zones are equal when their identifiers are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeZone {
    IanaIdentifier(String),
    UtcOffset(UtcOffset),
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::IanaIdentifier("UTC".into())
    }
}

impl From<UtcOffset> for TimeZone {
    fn from(value: UtcOffset) -> Self {
        Self::UtcOffset(value)
    }
}

impl TimeZone {
    /// Creates a `TimeZone` from a parsed identifier, normalizing named zones.
    pub(crate) fn from_source(
        source: TimeZoneSource<'_>,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Self> {
        match source {
            TimeZoneSource::Name(name) => provider
                .normalize_identifier(name)
                .map(Self::IanaIdentifier),
            TimeZoneSource::Offset(offset) => {
                UtcOffset::from_nanoseconds(offset).map(Self::UtcOffset)
            }
        }
    }

    /// Parses a `TimeZone` from an identifier alone.
    pub fn try_from_identifier_str_with_provider(
        source: &str,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Self> {
        Self::from_source(parsers::parse_identifier(source)?, provider)
    }

    /// Parses a `TimeZone` from an identifier, or from the annotation or
    /// offset of a date-time string.
    pub fn try_from_str_with_provider(
        source: &str,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Self> {
        if let Ok(parsed) = parsers::parse_identifier(source) {
            return Self::from_source(parsed, provider);
        }
        let parsed = parsers::parse_allowed_timezone_formats(source)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))?;
        Self::from_source(parsed, provider)
    }

    /// Returns the identifier of this time zone.
    pub fn identifier(&self) -> String {
        match self {
            Self::IanaIdentifier(s) => s.clone(),
            Self::UtcOffset(offset) => offset.to_string(),
        }
    }
}

// ==== Resolver ====

impl TimeZone {
    /// Returns the UTC offset in effect at an instant.
    ///
    /// Equivalent: `GetOffsetNanosecondsFor`
    pub(crate) fn get_offset_nanos_for(
        &self,
        epoch_ns: i128,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<i128> {
        match self {
            Self::UtcOffset(offset) => Ok(i128::from(offset.0)),
            Self::IanaIdentifier(identifier) => provider
                .get_named_tz_offset_nanoseconds(identifier, epoch_ns)
                .map(|offset| i128::from(offset.offset) * 1_000_000_000),
        }
    }

    /// Returns the local date-time of an instant in this zone.
    pub(crate) fn get_iso_datetime_for(
        &self,
        epoch_ns: &EpochNanoseconds,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<IsoDateTime> {
        let offset = self.get_offset_nanos_for(epoch_ns.0, provider)?;
        Ok(IsoDateTime::from_epoch_nanos(epoch_ns.0, offset))
    }

    /// Returns every instant whose local date-time in this zone is `iso`,
    /// in ascending order.
    ///
    /// Equivalent: `GetPossibleEpochNanoseconds`
    pub(crate) fn get_possible_epoch_ns_for(
        &self,
        iso: IsoDateTime,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        // 1. Perform ? CheckISODaysRange(isoDateTime.[[ISODate]]).
        if iso.date.to_epoch_days().abs() > MAX_RESOLVABLE_EPOCH_DAYS {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateTimeOutOfRange));
        }
        let possible = match self {
            // 2. An offset zone has exactly one candidate.
            Self::UtcOffset(offset) => {
                let epoch_ns = iso.as_nanoseconds() - i128::from(offset.0);
                vec![EpochNanoseconds::try_from(epoch_ns)?]
            }
            // 3. A named zone asks the provider.
            Self::IanaIdentifier(identifier) => {
                provider.get_named_tz_epoch_nanoseconds(identifier, iso)?
            }
        };
        Ok(possible)
    }

    /// Resolves a local date-time to a single instant.
    ///
    /// Equivalent: `GetEpochNanosecondsFor`
    pub(crate) fn get_epoch_nanoseconds_for(
        &self,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<EpochNanoseconds> {
        // 1. Let possibleEpochNs be ? GetPossibleEpochNanoseconds(timeZone, isoDateTime).
        let possible = self.get_possible_epoch_ns_for(iso, provider)?;
        // 2. Return ? DisambiguatePossibleEpochNanoseconds(possibleEpochNs, timeZone, isoDateTime, disambiguation).
        self.disambiguate_possible_epoch_nanos(possible, iso, disambiguation, provider)
    }

    /// Equivalent: `DisambiguatePossibleEpochNanoseconds`
    pub(crate) fn disambiguate_possible_epoch_nanos(
        &self,
        possible: Vec<EpochNanoseconds>,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<EpochNanoseconds> {
        match (possible.as_slice(), disambiguation) {
            // 1. A single candidate is always the answer.
            ([only], _) => return Ok(*only),
            // 2. An overlap picks by policy.
            ([first, ..], Disambiguation::Compatible | Disambiguation::Earlier) => {
                return Ok(*first)
            }
            ([.., last], Disambiguation::Later) => return Ok(*last),
            ([_, ..], Disambiguation::Reject) => {
                return Err(TemporalError::range().with_enum(ErrorMessage::AmbiguousLocalTime))
            }
            ([], Disambiguation::Reject) => {
                return Err(TemporalError::range().with_enum(ErrorMessage::NonexistentLocalTime))
            }
            ([], _) => {}
        }

        // 3. The local time is in a gap. Measure the gap from the offsets a
        //    day on either side, which also covers gaps of a whole day.
        let local_ns = iso.as_nanoseconds();
        let offset_before = self.get_offset_nanos_for(local_ns - NS_PER_DAY_I128, provider)?;
        let offset_after = self.get_offset_nanos_for(local_ns + NS_PER_DAY_I128, provider)?;
        let gap = offset_after - offset_before;

        // 4. Earlier shifts back by the gap and takes the first candidate.
        if disambiguation == Disambiguation::Earlier {
            let earlier = shift_local(iso, -gap)?;
            let possible = self.get_possible_epoch_ns_for(earlier, provider)?;
            return possible.first().copied().temporal_unwrap();
        }

        // 5. Compatible and later shift forward and take the last candidate.
        let later = shift_local(iso, gap)?;
        let possible = self.get_possible_epoch_ns_for(later, provider)?;
        possible.last().copied().temporal_unwrap()
    }

    /// Returns the first instant of a calendar date in this zone.
    ///
    /// Equivalent: `GetStartOfDay`
    pub(crate) fn get_start_of_day(
        &self,
        iso_date: &IsoDate,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<EpochNanoseconds> {
        // 1. Let isoDateTime be CombineISODateAndTimeRecord(isoDate, MidnightTimeRecord()).
        let iso = IsoDateTime::new_unchecked(*iso_date, IsoTime::default());
        // 2. Let possibleEpochNs be ? GetPossibleEpochNanoseconds(timeZone, isoDateTime).
        let possible = self.get_possible_epoch_ns_for(iso, provider)?;
        // 3. If possibleEpochNs is not empty, return possibleEpochNs[0].
        if let Some(first) = possible.first() {
            return Ok(*first);
        }
        // 4. Offset zones have no gaps.
        let Self::IanaIdentifier(identifier) = self else {
            return Err(TemporalError::assert().with_message("Offset time zones have no gaps."));
        };
        // 5. Midnight was skipped, so the day starts at the transition that
        //    skipped it. Reading midnight with the earlier offset lands after
        //    that transition.
        let local_ns = iso.as_nanoseconds();
        let offset_before = self.get_offset_nanos_for(local_ns - NS_PER_DAY_I128, provider)?;
        let transition = provider
            .get_named_tz_offset_nanoseconds(identifier, local_ns - offset_before)?
            .transition_epoch
            .temporal_unwrap()?;
        EpochNanoseconds::try_from(i128::from(transition) * 1_000_000_000)
    }
}

/// Moves a local date-time by a number of nanoseconds.
fn shift_local(iso: IsoDateTime, nanoseconds: i128) -> TemporalResult<IsoDateTime> {
    let (days, time) = iso.time.add(NormalizedTimeDuration(nanoseconds));
    Ok(IsoDateTime::new_unchecked(iso.date.add_days(days)?, time))
}

#[cfg(test)]
mod tests {
    use super::{TimeZone, UtcOffset};
    use crate::provider::NeverProvider;
    use alloc::string::ToString;
    use core::str::FromStr;

    #[test]
    fn offset_identifiers() {
        let provider = &NeverProvider;
        for src in ["+09:30", "-09:30", "-12:30", "+00:00"] {
            let tz = TimeZone::try_from_identifier_str_with_provider(src, provider).unwrap();
            assert_eq!(tz.identifier(), src);
        }

        let tz = TimeZone::try_from_identifier_str_with_provider("\u{2212}0800", provider).unwrap();
        assert_eq!(tz.identifier(), "-08:00");
        assert_eq!(tz, TimeZone::from(UtcOffset::from_minutes(-480)));

        // Named zones need a provider that knows them.
        assert!(TimeZone::try_from_identifier_str_with_provider("Europe/Vienna", provider).is_err());
        assert!(UtcOffset::from_str("Europe/Vienna").is_err());
        assert_eq!(
            UtcOffset::from_str("-03:30").unwrap(),
            UtcOffset::from_minutes(-210)
        );
        assert_eq!(
            UtcOffset::from_nanoseconds(3_630_500_000_000)
                .unwrap()
                .to_string(),
            "+01:00:30.5"
        );
        assert!(UtcOffset::from_nanoseconds(86_400_000_000_000).is_err());
    }

    #[test]
    fn offset_zone_resolution() {
        use crate::iso::{IsoDate, IsoDateTime, IsoTime};
        use crate::options::Disambiguation;

        let provider = &NeverProvider;
        let tz = TimeZone::from(UtcOffset::from_minutes(90));
        let local = IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(1970, 1, 1),
            IsoTime::new_unchecked(1, 30, 0, 0, 0, 0),
        );
        let epoch = tz
            .get_epoch_nanoseconds_for(local, Disambiguation::Reject, provider)
            .unwrap();
        assert_eq!(epoch.as_i128(), 0);
        assert_eq!(tz.get_iso_datetime_for(&epoch, provider).unwrap(), local);
        assert_eq!(
            tz.get_start_of_day(&local.date, provider).unwrap().as_i128(),
            -5_400_000_000_000
        );
    }

    #[cfg(feature = "compiled_data")]
    mod named {
        use crate::iso::{IsoDate, IsoDateTime, IsoTime};
        use crate::options::Disambiguation;
        use crate::tzdb::CompiledTzdbProvider;
        use crate::TimeZone;

        fn local(y: i32, mo: u8, d: u8, h: u8, mi: u8) -> IsoDateTime {
            IsoDateTime::new_unchecked(
                IsoDate::new_unchecked(y, mo, d),
                IsoTime::new_unchecked(h, mi, 0, 0, 0, 0),
            )
        }

        fn utc_ns(y: i32, mo: u8, d: u8, h: u8, mi: u8) -> i128 {
            local(y, mo, d, h, mi).as_nanoseconds()
        }

        #[test]
        fn gap_disambiguation() {
            let provider = &CompiledTzdbProvider::default();
            let tz =
                TimeZone::try_from_identifier_str_with_provider("america/los_angeles", provider)
                    .unwrap();
            assert_eq!(tz.identifier(), "America/Los_Angeles");

            let gap = local(2020, 3, 8, 2, 30);
            assert!(tz.get_possible_epoch_ns_for(gap, provider).unwrap().is_empty());

            let resolve = |d| {
                tz.get_epoch_nanoseconds_for(gap, d, provider)
                    .map(|ns| ns.as_i128())
            };
            // 03:30-07:00 and 01:30-08:00
            assert_eq!(
                resolve(Disambiguation::Compatible).unwrap(),
                utc_ns(2020, 3, 8, 10, 30)
            );
            assert_eq!(
                resolve(Disambiguation::Later).unwrap(),
                utc_ns(2020, 3, 8, 10, 30)
            );
            assert_eq!(
                resolve(Disambiguation::Earlier).unwrap(),
                utc_ns(2020, 3, 8, 9, 30)
            );
            assert!(resolve(Disambiguation::Reject).is_err());
        }

        #[test]
        fn overlap_disambiguation() {
            let provider = &CompiledTzdbProvider::default();
            let tz = TimeZone::try_from_str_with_provider("America/Los_Angeles", provider).unwrap();
            let overlap = local(2020, 11, 1, 1, 30);
            let possible = tz.get_possible_epoch_ns_for(overlap, provider).unwrap();
            assert_eq!(possible.len(), 2);

            let resolve = |d| {
                tz.get_epoch_nanoseconds_for(overlap, d, provider)
                    .map(|ns| ns.as_i128())
            };
            assert_eq!(
                resolve(Disambiguation::Compatible).unwrap(),
                utc_ns(2020, 11, 1, 8, 30)
            );
            assert_eq!(
                resolve(Disambiguation::Earlier).unwrap(),
                utc_ns(2020, 11, 1, 8, 30)
            );
            assert_eq!(
                resolve(Disambiguation::Later).unwrap(),
                utc_ns(2020, 11, 1, 9, 30)
            );
            assert!(resolve(Disambiguation::Reject).is_err());

            // An unambiguous time has one candidate for every policy.
            let ordinary = local(2020, 6, 1, 12, 0);
            for d in [
                Disambiguation::Compatible,
                Disambiguation::Earlier,
                Disambiguation::Later,
                Disambiguation::Reject,
            ] {
                assert_eq!(
                    tz.get_epoch_nanoseconds_for(ordinary, d, provider)
                        .unwrap()
                        .as_i128(),
                    utc_ns(2020, 6, 1, 19, 0)
                );
            }
        }

        #[test]
        fn start_of_day_in_gap() {
            let provider = &CompiledTzdbProvider::default();
            let tz = TimeZone::try_from_str_with_provider("America/Sao_Paulo", provider).unwrap();
            // Midnight was skipped on 2018-11-04, and the day began at 01:00-02:00.
            let start = tz
                .get_start_of_day(&IsoDate::new_unchecked(2018, 11, 4), provider)
                .unwrap();
            assert_eq!(start.as_i128(), utc_ns(2018, 11, 4, 3, 0));
        }

        #[test]
        fn time_zone_from_date_time_string() {
            let provider = &CompiledTzdbProvider::default();
            let tz = TimeZone::try_from_str_with_provider(
                "2020-01-01T00:00+01:00[europe/vienna]",
                provider,
            )
            .unwrap();
            assert_eq!(tz.identifier(), "Europe/Vienna");
            let tz =
                TimeZone::try_from_str_with_provider("2020-01-01T00:00-03:00", provider).unwrap();
            assert_eq!(tz.identifier(), "-03:00");
            assert!(TimeZone::try_from_str_with_provider("Mars/Olympus_Mons", provider).is_err());
        }
    }
}
