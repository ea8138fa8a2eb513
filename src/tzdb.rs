//! Time zone providers backed by TZif data.
//!
//! Relevant operations:
//!
//!  - `GetNamedTimeZoneEpochNanoseconds`
//!     - fn(id, isoDateTimeRecord) -> [epochNanoseconds]
//!  - `GetNamedTimeZoneOffsetNanoseconds`
//!     - fn(id, epochNanoseconds) -> offset
//!
//! Two providers are available: `CompiledTzdbProvider` reads the data that
//! `jiff-tzdb` bundles into the binary, and `FsTzdbProvider` reads a
//! zoneinfo directory on the host.

// NOTES:
//
// Transitions to DST (in march) + 1. Empty list between 2:00-3:00.
// Transitions to Std (in nov) -1. Two elements 1:00-2:00 is repeated twice.
//
// Instants past the last transition of the data block are resolved with the
// POSIX TZ string in the footer of the file.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use combine::Parser;

use tzif::{
    self,
    data::{
        posix::{PosixTzString, TransitionDay},
        tzif::{DataBlock, LocalTimeTypeRecord, TzifData, TzifHeader},
    },
};

use crate::{
    error::ErrorMessage,
    iso::IsoDateTime,
    provider::{TimeZoneOffset, TimeZoneProvider},
    time::EpochNanoseconds,
    utils, TemporalError, TemporalResult,
};

const ZONEINFO_DIR: &str = "/usr/share/zoneinfo/";

const NS_PER_SECOND: i128 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// A transition into a new UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    epoch_seconds: i64,
    offset: i64,
}

/// `TZif` stands for Time zone information format is laid out by [RFC 8536][rfc8536] and
/// laid out by the [tzdata manual][tzif-manual]
///
/// This representation extends the parsed type from the `tzif`
/// [rust crate][tzif-crate] with offset lookups in both directions.
///
/// [rfc8536]: https://datatracker.ietf.org/doc/html/rfc8536
/// [tzif-manual]: https://man7.org/linux/man-pages/man5/tzfile.5.html
/// [tzif-crate]: https://docs.rs/tzif/latest/tzif/
#[derive(Debug, Clone)]
pub struct Tzif {
    pub header2: Option<TzifHeader>,
    pub data_block2: Option<DataBlock>,
    pub footer: Option<PosixTzString>,
}

impl From<TzifData> for Tzif {
    fn from(value: TzifData) -> Self {
        let TzifData {
            header2,
            data_block2,
            footer,
            ..
        } = value;

        Self {
            header2,
            data_block2,
            footer,
        }
    }
}

impl Tzif {
    pub fn from_bytes(data: &[u8]) -> TemporalResult<Self> {
        let Ok((parse_result, _)) = tzif::parse::tzif::tzif().parse(data) else {
            return Err(TemporalError::general("Illformed Tzif data."));
        };
        Ok(Self::from(parse_result))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> TemporalResult<Self> {
        tzif::parse_tzif_file(path.as_ref())
            .map(Into::into)
            .map_err(|e| TemporalError::general(e.to_string()))
    }

    pub fn posix_tz_string(&self) -> Option<&PosixTzString> {
        self.footer.as_ref()
    }

    pub fn get_data_block2(&self) -> TemporalResult<&DataBlock> {
        self.data_block2
            .as_ref()
            .ok_or(TemporalError::general("Only Tzif V2+ is supported."))
    }

    /// Returns the offset in effect at `epoch_seconds`.
    pub fn offset_at(&self, epoch_seconds: i64) -> TemporalResult<TimeZoneOffset> {
        let db = self.get_data_block2()?;
        let times = &db.transition_times;
        let idx = times.partition_point(|s| s.0 <= epoch_seconds);

        // Past the last transition the footer describes local time, if there is one.
        if idx == times.len() {
            if let Some(posix) = self.posix_tz_string() {
                #[cfg(feature = "log")]
                log::trace!("Resolving epoch seconds {epoch_seconds} with the POSIX footer");
                let mut offset = posix_offset_at(posix, epoch_seconds);
                if let Some(last) = times.last() {
                    if offset.transition_epoch.map_or(true, |epoch| epoch < last.0) {
                        offset.transition_epoch = Some(last.0);
                    }
                }
                return Ok(offset);
            }
        }

        // Before the first transition, local time is given by time type 0.
        if idx == 0 {
            let record = db
                .local_time_type_records
                .first()
                .ok_or(TemporalError::general("Tzif data has no local time types."))?;
            return Ok(TimeZoneOffset {
                offset: record.utoff.0,
                transition_epoch: None,
            });
        }

        Ok(TimeZoneOffset {
            offset: get_local_record(db, idx - 1)?.utoff.0,
            transition_epoch: Some(times[idx - 1].0),
        })
    }

    /// Returns the transitions in `(start, end]`, in ascending order.
    fn transitions_between(&self, start: i64, end: i64) -> TemporalResult<Vec<Transition>> {
        let db = self.get_data_block2()?;
        let times = &db.transition_times;
        let lo = times.partition_point(|s| s.0 <= start);
        let hi = times.partition_point(|s| s.0 <= end);

        let mut transitions = Vec::with_capacity(hi.saturating_sub(lo));
        for idx in lo..hi {
            transitions.push(Transition {
                epoch_seconds: times[idx].0,
                offset: get_local_record(db, idx)?.utoff.0,
            });
        }

        if let Some(posix) = self.posix_tz_string() {
            let table_end = times.last().map_or(i64::MIN, |s| s.0);
            if end > table_end {
                transitions.extend(posix_transitions_between(posix, start.max(table_end), end));
            }
        }
        Ok(transitions)
    }

    /// Returns every epoch nanosecond value whose local time in this zone
    /// is `local_nanoseconds`, in ascending order.
    ///
    /// Basically, if someone provides a DateTime 2017-11-05T01:30:00 in
    /// New York, there are two instants with that wall-clock time, one on
    /// each side of the transition. On the other side of the year, the
    /// DateTime 2017-03-12T02:30:00 has no instant at all due to the +1
    /// jump from 02:00 -> 03:00.
    pub fn possible_epoch_nanoseconds(&self, local_nanoseconds: i128) -> TemporalResult<Vec<i128>> {
        let local_seconds = local_nanoseconds.div_euclid(NS_PER_SECOND) as i64;
        let window_start = local_seconds - SECONDS_PER_DAY;
        let window_end = local_seconds + SECONDS_PER_DAY;

        // 1. Every offset in effect within a day of the local time is a candidate.
        let mut offsets = Vec::from([self.offset_at(window_start)?.offset]);
        offsets.extend(
            self.transitions_between(window_start, window_end)?
                .iter()
                .map(|t| t.offset),
        );
        offsets.sort_unstable();
        offsets.dedup();

        // 2. A candidate is possible when the instant it produces is in that offset.
        let mut result = Vec::new();
        for offset in offsets {
            let epoch_nanoseconds = local_nanoseconds - i128::from(offset) * NS_PER_SECOND;
            let epoch_seconds = epoch_nanoseconds.div_euclid(NS_PER_SECOND) as i64;
            if self.offset_at(epoch_seconds)?.offset == offset {
                result.push(epoch_nanoseconds);
            }
        }
        result.sort_unstable();
        Ok(result)
    }
}

#[inline]
fn get_local_record(db: &DataBlock, idx: usize) -> TemporalResult<LocalTimeTypeRecord> {
    // NOTE: Transition type can be empty. If no transition_type exists,
    // then use 0 as the default index of local_time_type_records.
    let type_idx = db.transition_types.get(idx).copied().unwrap_or(0);
    db.local_time_type_records
        .get(type_idx)
        .copied()
        .ok_or(TemporalError::general("Tzif transition type is out of range."))
}

// ==== POSIX TZ string resolution ====

/// Returns the year that `epoch_seconds` falls in.
fn year_of(epoch_seconds: i64) -> i32 {
    utils::ymd_from_epoch_days(epoch_seconds.div_euclid(SECONDS_PER_DAY)).0
}

/// Returns the zero based day of the year that a POSIX rule date falls on.
fn transition_day_of_year(year: i32, day: &TransitionDay) -> i64 {
    match *day {
        // `Jn`: 1 based, February 29th is never counted.
        TransitionDay::NoLeap(n) => {
            let n = i64::from(n) - 1;
            if utils::iso_in_leap_year(year) && n >= 59 {
                n + 1
            } else {
                n
            }
        }
        // `n`: 0 based, February 29th is counted.
        TransitionDay::WithLeap(n) => i64::from(n),
        // `Mm.w.d`: the `d`th day of week (Sunday is 0) of week `w` of month
        // `m`, where week 5 is the last such day of the month.
        TransitionDay::Mwd(month, week, weekday) => {
            let month = month.clamp(1, 12) as u8;
            let year_start = utils::epoch_days_from_gregorian_date(year, 1, 1);
            let month_start = utils::epoch_days_from_gregorian_date(year, month, 1);
            let first_weekday = i64::from(utils::epoch_days_to_day_of_week(month_start) % 7);
            let mut day_of_month =
                (i64::from(weekday) - first_weekday).rem_euclid(7) + (i64::from(week) - 1) * 7;
            let days_in_month = i64::from(utils::iso_days_in_month(year, month));
            while day_of_month >= days_in_month {
                day_of_month -= 7;
            }
            month_start - year_start + day_of_month
        }
    }
}

/// Returns the epoch seconds of a rule transition in `year`.
///
/// Rule times are wall-clock times in the offset that precedes the transition.
fn transition_epoch_seconds(year: i32, day: &TransitionDay, time: i64, offset_before: i64) -> i64 {
    let year_start = utils::epoch_days_from_gregorian_date(year, 1, 1);
    (year_start + transition_day_of_year(year, day)) * SECONDS_PER_DAY + time - offset_before
}

/// Returns the DST start and end transitions of the rule for `year`.
fn posix_transitions(posix: &PosixTzString, year: i32) -> Option<[Transition; 2]> {
    let dst = posix.dst_info.as_ref()?;
    // POSIX offsets are positive west of Greenwich.
    let std_offset = -posix.std_info.offset.0;
    let dst_offset = -dst.variant_info.offset.0;
    Some([
        Transition {
            epoch_seconds: transition_epoch_seconds(
                year,
                &dst.start_date.day,
                dst.start_date.time.0,
                std_offset,
            ),
            offset: dst_offset,
        },
        Transition {
            epoch_seconds: transition_epoch_seconds(
                year,
                &dst.end_date.day,
                dst.end_date.time.0,
                dst_offset,
            ),
            offset: std_offset,
        },
    ])
}

/// Returns the rule transitions in `(start, end]`, in ascending order.
fn posix_transitions_between(posix: &PosixTzString, start: i64, end: i64) -> Vec<Transition> {
    let mut transitions: Vec<Transition> = (year_of(start) - 1..=year_of(end) + 1)
        .filter_map(|year| posix_transitions(posix, year))
        .flatten()
        .filter(|t| start < t.epoch_seconds && t.epoch_seconds <= end)
        .collect();
    transitions.sort_unstable_by_key(|t| t.epoch_seconds);
    transitions
}

/// Resolves the offset at `epoch_seconds` with the footer rule alone.
fn posix_offset_at(posix: &PosixTzString, epoch_seconds: i64) -> TimeZoneOffset {
    let std = TimeZoneOffset {
        offset: -posix.std_info.offset.0,
        transition_epoch: None,
    };
    let year = year_of(epoch_seconds);
    // The previous year's transitions cover instants before this year's first one.
    (year - 1..=year)
        .filter_map(|year| posix_transitions(posix, year))
        .flatten()
        .filter(|t| t.epoch_seconds <= epoch_seconds)
        .max_by_key(|t| t.epoch_seconds)
        .map_or(std, |t| TimeZoneOffset {
            offset: t.offset,
            transition_epoch: Some(t.epoch_seconds),
        })
}

// ==== Providers ====

/// A cache of parsed zones keyed by canonical identifier.
#[derive(Debug, Default)]
struct TzifCache(RwLock<BTreeMap<String, Tzif>>);

impl TzifCache {
    fn with_tzif<R>(
        &self,
        identifier: &str,
        load: impl FnOnce() -> TemporalResult<Tzif>,
        f: impl FnOnce(&Tzif) -> TemporalResult<R>,
    ) -> TemporalResult<R> {
        if let Some(tzif) = self
            .0
            .read()
            .map_err(|_| TemporalError::general("Unable to acquire lock"))?
            .get(identifier)
        {
            return f(tzif);
        }

        #[cfg(feature = "log")]
        log::debug!("Time zone cache miss for {identifier}");
        let tzif = load()?;
        let mut cache = self
            .0
            .write()
            .map_err(|_| TemporalError::general("Unable to acquire lock"))?;
        f(cache.entry(identifier.into()).or_insert(tzif))
    }
}

fn possible_epoch_nanoseconds_for(
    tzif: &Tzif,
    local_datetime: &IsoDateTime,
) -> TemporalResult<Vec<EpochNanoseconds>> {
    tzif.possible_epoch_nanoseconds(local_datetime.as_nanoseconds())?
        .into_iter()
        .map(EpochNanoseconds::try_from)
        .collect()
}

fn offset_for(tzif: &Tzif, epoch_nanoseconds: i128) -> TemporalResult<TimeZoneOffset> {
    tzif.offset_at(epoch_nanoseconds.div_euclid(NS_PER_SECOND) as i64)
}

/// A provider over the zone data bundled by `jiff-tzdb`.
///
/// Identifiers are matched without regard to ASCII case.
#[derive(Debug, Default)]
pub struct CompiledTzdbProvider {
    cache: TzifCache,
}

impl CompiledTzdbProvider {
    fn with_tzif<R>(
        &self,
        identifier: &str,
        f: impl FnOnce(&Tzif) -> TemporalResult<R>,
    ) -> TemporalResult<R> {
        let (canonical, data) = jiff_tzdb::get(identifier)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))?;
        self.cache
            .with_tzif(canonical, || Tzif::from_bytes(data), f)
    }
}

impl TimeZoneProvider for CompiledTzdbProvider {
    fn normalize_identifier(&self, identifier: &str) -> TemporalResult<String> {
        jiff_tzdb::get(identifier)
            .map(|(canonical, _)| String::from(canonical))
            .ok_or(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        local_datetime: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        self.with_tzif(identifier, |tzif| {
            possible_epoch_nanoseconds_for(tzif, &local_datetime)
        })
    }

    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> TemporalResult<TimeZoneOffset> {
        self.with_tzif(identifier, |tzif| offset_for(tzif, epoch_nanoseconds))
    }
}

/// A provider that reads TZif files from a zoneinfo directory.
#[derive(Debug)]
pub struct FsTzdbProvider {
    root: PathBuf,
    cache: TzifCache,
}

impl Default for FsTzdbProvider {
    fn default() -> Self {
        Self::new(ZONEINFO_DIR)
    }
}

impl FsTzdbProvider {
    /// Creates a provider reading from the zoneinfo directory at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cache: TzifCache::default(),
        }
    }

    fn path_for(&self, identifier: &str) -> TemporalResult<PathBuf> {
        // Identifiers are relative names made of ASCII components.
        let valid = !identifier.is_empty()
            && identifier.is_ascii()
            && !identifier.starts_with('/')
            && identifier.split('/').all(|part| !part.is_empty() && part != "." && part != "..");
        if !valid {
            return Err(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone));
        }
        Ok(self.root.join(identifier))
    }

    fn with_tzif<R>(
        &self,
        identifier: &str,
        f: impl FnOnce(&Tzif) -> TemporalResult<R>,
    ) -> TemporalResult<R> {
        let identifier = self.normalize_identifier(identifier)?;
        let path = self.path_for(&identifier)?;
        self.cache
            .with_tzif(&identifier, || Tzif::from_path(&path), f)
    }
}

impl TimeZoneProvider for FsTzdbProvider {
    fn normalize_identifier(&self, identifier: &str) -> TemporalResult<String> {
        // Prefer the canonical casing of a known zone, then the name as given.
        let candidate = jiff_tzdb::get(identifier).map_or(identifier, |(canonical, _)| canonical);
        if self.path_for(candidate)?.is_file() {
            return Ok(String::from(candidate));
        }
        Err(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone))
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        local_datetime: IsoDateTime,
    ) -> TemporalResult<Vec<EpochNanoseconds>> {
        self.with_tzif(identifier, |tzif| {
            possible_epoch_nanoseconds_for(tzif, &local_datetime)
        })
    }

    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> TemporalResult<TimeZoneOffset> {
        self.with_tzif(identifier, |tzif| offset_for(tzif, epoch_nanoseconds))
    }
}
