//! This module implements the date-time string codec.
//!
//! Strings are parsed with `ixdtf` and then checked against the rules of
//! each entry point. Formatting goes through `Writeable`.

use crate::{
    error::ErrorMessage,
    iso::{IsoDate, IsoTime},
    options::{DisplayCalendar, DisplayOffset, DisplayTimeZone, Precision},
    Sign, TemporalError, TemporalResult,
};
use alloc::{format, string::String};
use core::fmt::{self, Write};
use ixdtf::{
    encoding::Utf8,
    parsers::{IsoDurationParser, IxdtfParser},
    records::{Annotation, DurationParseRecord, IxdtfParseRecord, TimeZoneRecord, UtcOffsetRecordOrZ},
    ParseError,
};
use writeable::{impl_display_with_writeable, Writeable};

mod timezone;

pub(crate) use timezone::{
    offset_nanoseconds, parse_allowed_timezone_formats, parse_identifier, TimeZoneSource,
};

/// A parse record borrowed from a UTF-8 source string.
pub(crate) type ParseRecord<'a> = IxdtfParseRecord<'a, Utf8>;

pub(crate) fn syntax_error(error: ParseError) -> TemporalError {
    TemporalError::range().with_message(format!("{error}"))
}

// ==== Parsing entry points ====

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParseVariant {
    DateTime,
    Time,
}

/// Runs the `ixdtf` parser, keeping the first calendar annotation.
///
/// Both the `u-ca` and `c` keys name a calendar. A repeated calendar is
/// ignored unless one of the repeats is critical.
fn parse_ixdtf(source: &str, variant: ParseVariant) -> TemporalResult<ParseRecord<'_>> {
    fn cast_handler<'a>(
        _: &mut IxdtfParser<'a, Utf8>,
        handler: impl FnMut(Annotation<'a, Utf8>) -> Option<Annotation<'a, Utf8>>,
    ) -> impl FnMut(Annotation<'a, Utf8>) -> Option<Annotation<'a, Utf8>> {
        handler
    }

    let mut first_calendar: Option<Annotation<'_, Utf8>> = None;
    let mut critical_duplicate_calendar = false;
    let mut parser = IxdtfParser::from_str(source);

    let handler = cast_handler(&mut parser, |annotation: Annotation<'_, Utf8>| {
        if annotation.key == b"u-ca" || annotation.key == b"c" {
            match first_calendar {
                Some(ref calendar) => {
                    critical_duplicate_calendar |= calendar.critical || annotation.critical;
                }
                None => first_calendar = Some(annotation),
            }
            return None;
        }
        // Unknown keys go back to the parser, which rejects critical ones.
        Some(annotation)
    });

    let mut record = match variant {
        ParseVariant::DateTime => parser.parse_with_annotation_handler(handler),
        ParseVariant::Time => parser.parse_time_with_annotation_handler(handler),
    }
    .map_err(syntax_error)?;

    if critical_duplicate_calendar {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserDuplicateCalendar));
    }
    if variant == ParseVariant::DateTime && record.date.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate));
    }

    record.calendar = first_calendar.map(|annotation| annotation.value);
    Ok(record)
}

fn reject_utc_designator(record: ParseRecord<'_>) -> TemporalResult<ParseRecord<'_>> {
    if matches!(record.offset, Some(UtcOffsetRecordOrZ::Z)) {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserUtcDesignator));
    }
    Ok(record)
}

/// Parses a `PlainDate` or `PlainDateTime` string.
///
/// A date is required, and the `Z` designator is rejected.
pub(crate) fn parse_date_time(source: &str) -> TemporalResult<ParseRecord<'_>> {
    parse_ixdtf(source, ParseVariant::DateTime).and_then(reject_utc_designator)
}

/// Parses an `Instant` string, which requires a time and an offset.
pub(crate) fn parse_instant(source: &str) -> TemporalResult<ParseRecord<'_>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    if record.time.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTime));
    }
    if record.offset.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsOffset));
    }
    Ok(record)
}

fn check_zoned_record(record: &ParseRecord<'_>) -> TemporalResult<()> {
    let Some(annotation) = record.tz.as_ref() else {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTimeZone));
    };
    // `Z` and a named zone are two competing sources of the offset.
    if matches!(record.offset, Some(UtcOffsetRecordOrZ::Z))
        && matches!(annotation.tz, TimeZoneRecord::Name(_))
    {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserUtcDesignator));
    }
    Ok(())
}

/// Parses a `ZonedDateTime` string, which requires a time zone annotation.
pub(crate) fn parse_zoned_date_time(source: &str) -> TemporalResult<ParseRecord<'_>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    check_zoned_record(&record)?;
    Ok(record)
}

/// Parses a `PlainTime` string: a bare time, or a date-time with a time.
pub(crate) fn parse_time(source: &str) -> TemporalResult<ParseRecord<'_>> {
    let record = match parse_ixdtf(source, ParseVariant::Time) {
        Ok(record) => record,
        Err(time_error) => {
            let Ok(record) = parse_ixdtf(source, ParseVariant::DateTime) else {
                return Err(time_error);
            };
            if record.time.is_none() {
                return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTime));
            }
            record
        }
    };
    reject_utc_designator(record)
}

/// Parses a rounding anchor: a zoned string when it carries a time zone
/// annotation, a plain date-time string otherwise.
pub(crate) fn parse_relative_to(source: &str) -> TemporalResult<ParseRecord<'_>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    if record.tz.is_some() {
        check_zoned_record(&record)?;
        return Ok(record);
    }
    reject_utc_designator(record)
}

/// Parses `±P[nY][nM][nW][nD][T[nH][nM][n[.f]S]]`.
pub(crate) fn parse_duration(source: &str) -> TemporalResult<DurationParseRecord> {
    IsoDurationParser::from_str(source).parse().map_err(syntax_error)
}

// ==== Formatting ====

/// Writes `.` and the fraction digits of `nanosecond` selected by `precision`.
///
/// `Auto` drops trailing zeros, and nothing is written when no digit remains.
fn write_fraction<W: Write + ?Sized>(
    nanosecond: u32,
    precision: Precision,
    sink: &mut W,
) -> fmt::Result {
    let digits = match precision {
        Precision::Digit(digits) => u32::from(digits.min(9)),
        Precision::Minute => 0,
        Precision::Auto if nanosecond == 0 => 0,
        Precision::Auto => 9 - decimal_trailing_zeros(nanosecond),
    };
    if digits == 0 {
        return Ok(());
    }
    let value = nanosecond / 10u32.pow(9 - digits);
    write!(sink, ".{value:0width$}", width = digits as usize)
}

fn decimal_trailing_zeros(mut value: u32) -> u32 {
    let mut zeros = 0;
    while value != 0 && value % 10 == 0 {
        value /= 10;
        zeros += 1;
    }
    zeros
}

fn write_year<W: Write + ?Sized>(year: i32, sink: &mut W) -> fmt::Result {
    if (0..=9999).contains(&year) {
        write!(sink, "{year:04}")
    } else {
        // Six digits with an explicit sign, so the sign fills the seventh column.
        write!(sink, "{year:+07}")
    }
}

fn write_time<W: Write + ?Sized>(
    time: &IsoTime,
    precision: Precision,
    sink: &mut W,
) -> fmt::Result {
    write!(sink, "{:02}:{:02}", time.hour, time.minute)?;
    if precision == Precision::Minute {
        return Ok(());
    }
    write!(sink, ":{:02}", time.second)?;
    let nanosecond = u32::from(time.millisecond) * 1_000_000
        + u32::from(time.microsecond) * 1_000
        + u32::from(time.nanosecond);
    write_fraction(nanosecond, precision, sink)
}

/// A signed `±HH:MM[:SS[.fffffffff]]` offset.
///
/// Seconds are written only when the offset is not a whole minute.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormattableOffset(i64);

impl FormattableOffset {
    pub(crate) fn from_nanoseconds(offset: i64) -> Self {
        Self(offset)
    }
}

impl Writeable for FormattableOffset {
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let magnitude = self.0.unsigned_abs();
        let nanosecond = (magnitude % 1_000_000_000) as u32;
        let seconds = magnitude / 1_000_000_000;
        write!(sink, "{sign}{:02}:{:02}", seconds / 3600, (seconds / 60) % 60)?;
        if seconds % 60 == 0 && nanosecond == 0 {
            return Ok(());
        }
        write!(sink, ":{:02}", seconds % 60)?;
        write_fraction(nanosecond, Precision::Auto, sink)
    }
}

#[derive(Debug, Clone, Copy)]
enum OffsetOrZ {
    Z,
    Offset(FormattableOffset),
}

/// A builder for annotated date-time strings.
///
/// Components are written in order: date, time, offset, time zone, calendar.
#[derive(Debug, Default)]
pub struct IxdtfStringBuilder<'a> {
    date: Option<IsoDate>,
    time: Option<(IsoTime, Precision)>,
    offset: Option<OffsetOrZ>,
    timezone: Option<&'a str>,
    calendar: Option<&'static str>,
}

impl<'a> IxdtfStringBuilder<'a> {
    pub fn with_date(mut self, iso: IsoDate) -> Self {
        self.date = Some(iso);
        self
    }

    pub fn with_time(mut self, time: IsoTime, precision: Precision) -> Self {
        self.time = Some((time, precision));
        self
    }

    /// Sets the UTC offset in nanoseconds.
    pub fn with_offset(mut self, offset: i64, show: DisplayOffset) -> Self {
        if show != DisplayOffset::Never {
            self.offset = Some(OffsetOrZ::Offset(FormattableOffset(offset)));
        }
        self
    }

    pub fn with_z(mut self, show: DisplayOffset) -> Self {
        if show != DisplayOffset::Never {
            self.offset = Some(OffsetOrZ::Z);
        }
        self
    }

    pub fn with_timezone(mut self, timezone: &'a str, show: DisplayTimeZone) -> Self {
        if show != DisplayTimeZone::Never {
            self.timezone = Some(timezone);
        }
        self
    }

    pub fn with_calendar(mut self, calendar: &'static str, show: DisplayCalendar) -> Self {
        let hidden = show == DisplayCalendar::Never
            || (show == DisplayCalendar::Auto && calendar == "iso8601");
        if !hidden {
            self.calendar = Some(calendar);
        }
        self
    }

    pub fn build(self) -> String {
        self.write_to_string().into_owned()
    }
}

impl Writeable for IxdtfStringBuilder<'_> {
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> fmt::Result {
        if let Some(date) = &self.date {
            write_year(date.year, sink)?;
            write!(sink, "-{:02}-{:02}", date.month, date.day)?;
        }
        if let Some((time, precision)) = &self.time {
            if self.date.is_some() {
                sink.write_char('T')?;
            }
            write_time(time, *precision, sink)?;
        }
        match self.offset {
            Some(OffsetOrZ::Z) => sink.write_char('Z')?,
            Some(OffsetOrZ::Offset(offset)) => offset.write_to(sink)?,
            None => {}
        }
        if let Some(timezone) = self.timezone {
            write!(sink, "[{timezone}]")?;
        }
        if let Some(calendar) = self.calendar {
            write!(sink, "[c={calendar}]")?;
        }
        Ok(())
    }
}

/// The calendar-unit fields of a duration, by magnitude.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormattableDateDuration {
    pub(crate) years: u64,
    pub(crate) months: u64,
    pub(crate) weeks: u64,
    pub(crate) days: u64,
}

/// A duration written as `±PnYnMnWnDTnHnMn.fS`.
///
/// Seconds and smaller units are combined into `seconds` and `subseconds`.
#[derive(Debug)]
pub(crate) struct FormattableDuration {
    pub(crate) precision: Precision,
    pub(crate) sign: Sign,
    pub(crate) date: Option<FormattableDateDuration>,
    pub(crate) hours: u64,
    pub(crate) minutes: u64,
    pub(crate) seconds: u64,
    pub(crate) subseconds: u32,
}

fn write_duration_part<W: Write + ?Sized>(value: u64, unit: char, sink: &mut W) -> fmt::Result {
    if value == 0 {
        return Ok(());
    }
    write!(sink, "{value}{unit}")
}

impl Writeable for FormattableDuration {
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> fmt::Result {
        if self.sign == Sign::Negative {
            sink.write_char('-')?;
        }
        sink.write_char('P')?;
        if let Some(date) = self.date {
            write_duration_part(date.years, 'Y', sink)?;
            write_duration_part(date.months, 'M', sink)?;
            write_duration_part(date.weeks, 'W', sink)?;
            write_duration_part(date.days, 'D', sink)?;
        }

        // A zero duration still writes `PT0S`.
        let is_blank = self.date.is_none() && self.hours == 0 && self.minutes == 0;
        let write_seconds = self.seconds != 0
            || self.subseconds != 0
            || is_blank
            || matches!(self.precision, Precision::Digit(_));
        if self.hours == 0 && self.minutes == 0 && !write_seconds {
            return Ok(());
        }

        sink.write_char('T')?;
        write_duration_part(self.hours, 'H', sink)?;
        write_duration_part(self.minutes, 'M', sink)?;
        if write_seconds {
            write!(sink, "{}", self.seconds)?;
            write_fraction(self.subseconds, self.precision, sink)?;
            sink.write_char('S')?;
        }
        Ok(())
    }
}

impl_display_with_writeable!(FormattableOffset);
impl_display_with_writeable!(FormattableDuration);
impl_display_with_writeable!(IxdtfStringBuilder<'_>);
