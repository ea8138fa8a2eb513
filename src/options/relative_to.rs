//! The `RelativeTo` rounding anchor.

use crate::builtins::core::{PlainDate, PlainDateTime, ZonedDateTime};
use crate::options::{Disambiguation, OffsetDisambiguation};
use crate::parsers;
use crate::provider::TimeZoneProvider;
use crate::TemporalResult;

/// The anchor that calendar units of a `Duration` are measured from.
///
/// Years, months and weeks have no fixed length, so rounding or comparing
/// durations that contain them requires a starting point.
#[derive(Debug, Clone)]
pub enum RelativeTo {
    PlainDate(PlainDate),
    ZonedDateTime(ZonedDateTime),
}

impl From<PlainDate> for RelativeTo {
    fn from(value: PlainDate) -> Self {
        Self::PlainDate(value)
    }
}

impl From<PlainDateTime> for RelativeTo {
    fn from(value: PlainDateTime) -> Self {
        Self::PlainDate(value.to_plain_date())
    }
}

impl From<ZonedDateTime> for RelativeTo {
    fn from(value: ZonedDateTime) -> Self {
        Self::ZonedDateTime(value)
    }
}

impl RelativeTo {
    /// Parses an anchor from a string.
    ///
    /// Strings with a time zone annotation produce a `ZonedDateTime`, all
    /// others a `PlainDate`.
    pub fn try_from_str_with_provider(
        source: &str,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let record = parsers::parse_relative_to(source)?;
        if record.tz.is_some() {
            return ZonedDateTime::from_parse_record(
                record,
                Disambiguation::Compatible,
                OffsetDisambiguation::Reject,
                provider,
            )
            .map(Self::ZonedDateTime);
        }
        PlainDate::from_parse_record(record).map(Self::PlainDate)
    }
}
