//! This module implements `TemporalError`.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// `TemporalError`'s error type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error.
    #[default]
    Generic,
    /// TypeError
    Type,
    /// RangeError
    Range,
    /// Internal assertion failure
    Assert,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => "Error",
            Self::Type => "TypeError",
            Self::Range => "RangeError",
            Self::Assert => "ImplementationError",
        }
        .fmt(f)
    }
}

/// The error type for this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalError {
    kind: ErrorKind,
    msg: ErrorMessageSource,
}

#[derive(Debug, Clone, PartialEq)]
enum ErrorMessageSource {
    Enum(ErrorMessage),
    Text(Cow<'static, str>),
}

impl TemporalError {
    #[inline]
    #[must_use]
    const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: ErrorMessageSource::Enum(ErrorMessage::None),
        }
    }

    /// Create a generic error
    #[inline]
    #[must_use]
    pub fn general<S>(msg: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self::new(ErrorKind::Generic).with_message(msg)
    }

    /// Create a range error.
    #[inline]
    #[must_use]
    pub const fn range() -> Self {
        Self::new(ErrorKind::Range)
    }

    /// Create a type error.
    #[inline]
    #[must_use]
    pub const fn r#type() -> Self {
        Self::new(ErrorKind::Type)
    }

    /// Create an assertion error.
    #[inline]
    #[must_use]
    pub const fn assert() -> Self {
        Self {
            kind: ErrorKind::Assert,
            msg: ErrorMessageSource::Enum(ErrorMessage::AssertionFailed),
        }
    }

    /// Add a message to the error.
    #[inline]
    #[must_use]
    pub fn with_message<S>(mut self, msg: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.msg = ErrorMessageSource::Text(msg.into());
        self
    }

    /// Add a known message to the error.
    #[inline]
    #[must_use]
    pub fn with_enum(mut self, msg: ErrorMessage) -> Self {
        self.msg = ErrorMessageSource::Enum(msg);
        self
    }

    /// Returns this error's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match &self.msg {
            ErrorMessageSource::Enum(msg) => msg.to_str(),
            ErrorMessageSource::Text(msg) => msg,
        }
    }

    /// Extracts the error message.
    #[inline]
    #[must_use]
    pub fn into_message(self) -> String {
        match self.msg {
            ErrorMessageSource::Enum(msg) => String::from(msg.to_str()),
            ErrorMessageSource::Text(msg) => msg.into_owned(),
        }
    }
}

impl fmt::Display for TemporalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        let msg = self.message();
        if !msg.is_empty() {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl core::error::Error for TemporalError {}

/// Messages for errors raised in more than one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorMessage {
    // Range
    InstantOutOfRange,
    IntermediateDateTimeOutOfRange,
    DateOutOfRange,
    DateTimeOutOfRange,
    DurationNotValid,
    DurationMixedSign,
    InvalidTime,
    InvalidDate,
    DateOverflowReject,
    RoundingIncrementInvalid,
    LargestUnitBelowSmallestUnit,
    SmallestUnitNotTimeUnit,
    SmallestUnitRequired,
    RelativeToRequired,
    CalendarMismatch,
    AmbiguousLocalTime,
    NonexistentLocalTime,
    OffsetMismatch,
    UnknownTimeZone,
    UnknownCalendar,

    // Parsing
    ParserNeedsDate,
    ParserNeedsTime,
    ParserNeedsOffset,
    ParserNeedsTimeZone,
    ParserUtcDesignator,
    ParserInvalidFraction,
    ParserDuplicateCalendar,

    // Other
    AssertionFailed,
    None,
}

impl ErrorMessage {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::InstantOutOfRange => "Instant nanoseconds are not within a valid epoch range.",
            Self::IntermediateDateTimeOutOfRange => {
                "Intermediate ISO datetime was not within a valid range."
            }
            Self::DateOutOfRange => "Date is not within the representable range.",
            Self::DateTimeOutOfRange => "DateTime is not within the representable range.",
            Self::DurationNotValid => "Duration was not valid.",
            Self::DurationMixedSign => "Duration fields must all share the same sign.",
            Self::InvalidTime => "Time fields are not valid.",
            Self::InvalidDate => "Date fields are not valid.",
            Self::DateOverflowReject => "Date field is out of range for the calendar.",
            Self::RoundingIncrementInvalid => "roundingIncrement is not valid for the unit.",
            Self::LargestUnitBelowSmallestUnit => {
                "smallestUnit must be smaller than or equal to largestUnit."
            }
            Self::SmallestUnitNotTimeUnit => "smallestUnit must be a valid time unit.",
            Self::SmallestUnitRequired => "smallestUnit is required.",
            Self::RelativeToRequired => "A relativeTo anchor is required for calendar units.",
            Self::CalendarMismatch => "Calendars must be the same for this operation.",
            Self::AmbiguousLocalTime => "Local time is ambiguous in the time zone.",
            Self::NonexistentLocalTime => "Local time does not exist in the time zone.",
            Self::OffsetMismatch => "Offset does not match the time zone.",
            Self::UnknownTimeZone => "Unknown time zone identifier.",
            Self::UnknownCalendar => "Unknown calendar identifier.",
            Self::ParserNeedsDate => "Could not find a valid date.",
            Self::ParserNeedsTime => "Could not find a valid time.",
            Self::ParserNeedsOffset => "A UTC offset or Z designator is required.",
            Self::ParserNeedsTimeZone => "A time zone annotation is required.",
            Self::ParserUtcDesignator => "Z designator is not allowed here.",
            Self::ParserInvalidFraction => "Fractional part exceeds nanosecond precision.",
            Self::ParserDuplicateCalendar => {
                "Duplicate calendar annotation with the critical flag."
            }
            Self::AssertionFailed => "Implementation error: assertion failed.",
            Self::None => "",
        }
    }
}
