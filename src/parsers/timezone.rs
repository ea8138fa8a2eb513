//! Time zone identifier parsing.

use ixdtf::{
    encoding::Utf8,
    parsers::TimeZoneParser,
    records::{MinutePrecisionOffset, TimeZoneRecord, UtcOffsetRecord, UtcOffsetRecordOrZ},
};

use super::{parse_ixdtf, syntax_error, ParseVariant};
use crate::{error::ErrorMessage, TemporalError, TemporalResult};

const NS_PER_SECOND: i64 = 1_000_000_000;

/// A time zone as written in a string, before any provider lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeZoneSource<'a> {
    Name(&'a str),
    /// A fixed offset in nanoseconds.
    Offset(i64),
}

impl<'a> TimeZoneSource<'a> {
    pub(crate) fn from_record(record: TimeZoneRecord<'a, Utf8>) -> TemporalResult<Self> {
        match record {
            TimeZoneRecord::Name(name) => core::str::from_utf8(name)
                .map(Self::Name)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone)),
            TimeZoneRecord::Offset(offset) => Ok(Self::Offset(minute_offset_nanoseconds(offset))),
            _ => Err(TemporalError::range().with_enum(ErrorMessage::UnknownTimeZone)),
        }
    }
}

pub(crate) fn minute_offset_nanoseconds(offset: MinutePrecisionOffset) -> i64 {
    let minutes = i64::from(offset.hour) * 60 + i64::from(offset.minute);
    minutes * 60 * NS_PER_SECOND * i64::from(offset.sign as i8)
}

/// Returns the signed nanoseconds of a date-time offset, which may carry
/// seconds and a fraction.
pub(crate) fn offset_nanoseconds(offset: UtcOffsetRecord) -> TemporalResult<i64> {
    let fraction = match offset.fraction() {
        Some(fraction) => fraction
            .to_nanoseconds()
            .ok_or(TemporalError::range().with_enum(ErrorMessage::ParserInvalidFraction))?,
        None => 0,
    };
    let seconds = i64::from(offset.hour()) * 3600
        + i64::from(offset.minute()) * 60
        + i64::from(offset.second().unwrap_or(0));
    Ok((seconds * NS_PER_SECOND + i64::from(fraction)) * i64::from(offset.sign() as i8))
}

/// Parses a bare time zone identifier: a minute offset or an IANA name.
pub(crate) fn parse_identifier(source: &str) -> TemporalResult<TimeZoneSource<'_>> {
    let record = TimeZoneParser::from_str(source)
        .parse_identifier()
        .map_err(syntax_error)?;
    TimeZoneSource::from_record(record)
}

/// Extracts a time zone from a full date-time or time string.
///
/// The bracketed annotation is preferred over the offset, and `Z` is UTC.
/// A date-time offset names a zone only when it is a whole minute.
pub(crate) fn parse_allowed_timezone_formats(source: &str) -> Option<TimeZoneSource<'_>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)
        .or_else(|_| parse_ixdtf(source, ParseVariant::Time))
        .ok()?;

    if let Some(annotation) = record.tz {
        return TimeZoneSource::from_record(annotation.tz).ok();
    }

    match record.offset? {
        UtcOffsetRecordOrZ::Z => Some(TimeZoneSource::Name("UTC")),
        UtcOffsetRecordOrZ::Offset(offset) if offset.second().is_none() => {
            offset_nanoseconds(offset).ok().map(TimeZoneSource::Offset)
        }
        UtcOffsetRecordOrZ::Offset(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_allowed_timezone_formats, parse_identifier, TimeZoneSource};

    #[test]
    fn identifiers() {
        assert_eq!(
            parse_identifier("Europe/Vienna").unwrap(),
            TimeZoneSource::Name("Europe/Vienna")
        );
        assert_eq!(
            parse_identifier("-09:30").unwrap(),
            TimeZoneSource::Offset(-34_200_000_000_000)
        );
        assert_eq!(
            parse_identifier("+0530").unwrap(),
            TimeZoneSource::Offset(19_800_000_000_000)
        );
        assert!(parse_identifier("+25:00").is_err());
        assert!(parse_identifier("-09:30x").is_err());
        assert!(parse_identifier("").is_err());
    }

    #[test]
    fn time_zone_from_date_time_strings() {
        assert_eq!(
            parse_allowed_timezone_formats("2020-01-01T00:00+01:00[Europe/Vienna]"),
            Some(TimeZoneSource::Name("Europe/Vienna"))
        );
        assert_eq!(
            parse_allowed_timezone_formats("2020-01-01T00:00Z"),
            Some(TimeZoneSource::Name("UTC"))
        );
        assert_eq!(
            parse_allowed_timezone_formats("2020-01-01T12:00-03:00"),
            Some(TimeZoneSource::Offset(-10_800_000_000_000))
        );
        assert_eq!(
            parse_allowed_timezone_formats("2020-01-01T12:00-03:00:30"),
            None
        );
        assert_eq!(parse_allowed_timezone_formats("2020-01-01"), None);
    }
}
