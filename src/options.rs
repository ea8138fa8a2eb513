//! Native implementation of the engine's options.
//!
//! Various operations accept options that control how they complete:
//! overflow handling, disambiguation of local times, and rounding.

use crate::error::ErrorMessage;
use crate::{TemporalError, TemporalResult, MS_PER_DAY, NS_PER_DAY};
use core::ops::Add;
use core::{fmt, str::FromStr};

mod increment;
mod relative_to;

pub use increment::RoundingIncrement;
pub use relative_to::RelativeTo;

// ==== RoundingOptions / DifferenceSettings ====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DifferenceOperation {
    Until,
    Since,
}

/// Options for `until` and `since` operations.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy)]
pub struct DifferenceSettings {
    pub largest_unit: Option<Unit>,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
    pub increment: Option<RoundingIncrement>,
}

impl DifferenceSettings {
    /// Create difference settings with a largest unit.
    pub fn with_largest_unit(unit: Unit) -> Self {
        Self {
            largest_unit: Some(unit),
            ..Default::default()
        }
    }
}

/// Options for `round` operations.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct RoundingOptions {
    pub largest_unit: Option<Unit>,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
    pub increment: Option<RoundingIncrement>,
}

// Having both largest and smallest unit None would always throw.
impl Default for RoundingOptions {
    fn default() -> Self {
        Self {
            largest_unit: Some(Unit::Auto),
            smallest_unit: None,
            rounding_mode: None,
            increment: None,
        }
    }
}

impl RoundingOptions {
    /// Create rounding options with only a smallest unit.
    pub fn with_smallest_unit(unit: Unit) -> Self {
        Self {
            largest_unit: None,
            smallest_unit: Some(unit),
            rounding_mode: None,
            increment: None,
        }
    }
}

/// Internal options object that represents the resolved rounding options.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRoundingOptions {
    pub(crate) largest_unit: Unit,
    pub(crate) smallest_unit: Unit,
    pub(crate) increment: RoundingIncrement,
    pub(crate) rounding_mode: RoundingMode,
    /// Whether the rounded value is negated afterwards, as with `since`.
    pub(crate) negated: bool,
}

impl ResolvedRoundingOptions {
    pub(crate) fn from_diff_settings(
        options: DifferenceSettings,
        operation: DifferenceOperation,
        fallback_largest: Unit,
        fallback_smallest: Unit,
    ) -> TemporalResult<Self> {
        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or(RoundingMode::Trunc);
        let smallest_unit = match options.smallest_unit {
            Some(Unit::Auto) | None => fallback_smallest,
            Some(unit) => unit,
        };
        let largest_unit = match options.largest_unit {
            Some(Unit::Auto) | None => smallest_unit.max(fallback_largest),
            Some(unit) => unit,
        };

        if largest_unit < smallest_unit {
            return Err(TemporalError::range().with_enum(ErrorMessage::LargestUnitBelowSmallestUnit));
        }

        if let Some(max) = smallest_unit.to_maximum_rounding_increment() {
            increment.validate(max.into(), false)?;
        }

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode,
            negated: operation == DifferenceOperation::Since,
        })
    }

    pub(crate) fn from_duration_options(
        options: RoundingOptions,
        existing_largest: Unit,
    ) -> TemporalResult<Self> {
        let smallest_present = !matches!(options.smallest_unit, None | Some(Unit::Auto));
        let largest_present = options.largest_unit.is_some();
        if !smallest_present && !largest_present {
            return Err(TemporalError::range()
                .with_message("smallestUnit and largestUnit cannot both be None."));
        }

        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or_default();
        let smallest_unit = match options.smallest_unit {
            Some(Unit::Auto) | None => Unit::Nanosecond,
            Some(unit) => unit,
        };
        let default_largest = existing_largest.max(smallest_unit);
        let largest_unit = match options.largest_unit {
            Some(Unit::Auto) | None => default_largest,
            Some(unit) => unit,
        };

        if largest_unit < smallest_unit {
            return Err(TemporalError::range().with_enum(ErrorMessage::LargestUnitBelowSmallestUnit));
        }

        // Day and calendar unit increments are not bounded for durations.
        if let Some(max) = smallest_unit.to_maximum_rounding_increment() {
            increment.validate(max.into(), false)?;
        }

        if increment != RoundingIncrement::ONE
            && largest_unit != smallest_unit
            && smallest_unit.is_date_unit()
        {
            return Err(TemporalError::range().with_message(
                "roundingIncrement must be 1 when rounding to a date unit below largestUnit.",
            ));
        }

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode,
            negated: false,
        })
    }

    /// Resolves options for rounding a time or a date-time.
    pub(crate) fn from_datetime_options(options: RoundingOptions) -> TemporalResult<Self> {
        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or_default();
        let smallest_unit = match options.smallest_unit {
            Some(Unit::Auto) | None => {
                return Err(TemporalError::r#type().with_enum(ErrorMessage::SmallestUnitRequired))
            }
            Some(unit) => unit,
        };
        let (maximum, inclusive) = if smallest_unit == Unit::Day {
            (1, true)
        } else {
            let maximum = smallest_unit
                .to_maximum_rounding_increment()
                .ok_or(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?;
            (maximum, false)
        };

        increment.validate(maximum.into(), inclusive)?;

        Ok(Self {
            largest_unit: Unit::Auto,
            smallest_unit,
            increment,
            rounding_mode,
            negated: false,
        })
    }

    /// Resolves options for rounding an exact instant.
    pub(crate) fn from_instant_options(options: RoundingOptions) -> TemporalResult<Self> {
        let increment = options.increment.unwrap_or_default();
        let rounding_mode = options.rounding_mode.unwrap_or_default();
        let Some(smallest_unit) = options.smallest_unit else {
            return Err(TemporalError::r#type().with_enum(ErrorMessage::SmallestUnitRequired));
        };
        let maximum = match smallest_unit {
            Unit::Hour => 24u64,
            Unit::Minute => 24 * 60,
            Unit::Second => 24 * 3600,
            Unit::Millisecond => MS_PER_DAY as u64,
            Unit::Microsecond => MS_PER_DAY as u64 * 1000,
            Unit::Nanosecond => NS_PER_DAY,
            _ => return Err(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit)),
        };

        increment.validate(maximum, true)?;

        Ok(Self {
            largest_unit: Unit::Auto,
            smallest_unit,
            increment,
            rounding_mode,
            negated: false,
        })
    }

    /// Rounding options for formatting, which never carry past seconds.
    pub(crate) fn from_to_string_options(options: &ResolvedToStringRoundingOptions) -> Self {
        Self {
            largest_unit: Unit::Auto,
            smallest_unit: options.smallest_unit,
            increment: options.increment,
            rounding_mode: options.mode,
            negated: false,
        }
    }

    pub(crate) fn is_noop(&self) -> bool {
        self.smallest_unit == Unit::Nanosecond && self.increment == RoundingIncrement::ONE
    }

    /// Returns the unsigned rounding mode for a value with the provided sign.
    pub(crate) fn unsigned_rounding_mode(&self, is_positive: bool) -> UnsignedRoundingMode {
        self.rounding_mode
            .get_unsigned_round_mode(is_positive != self.negated)
    }
}

// ==== Options enums and methods ====

/// The relevant unit that should be used for the operation that
/// this option is provided as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    /// The `Auto` unit
    Auto = 0,
    /// The `Nanosecond` unit
    Nanosecond,
    /// The `Microsecond` unit
    Microsecond,
    /// The `Millisecond` unit
    Millisecond,
    /// The `Second` unit
    Second,
    /// The `Minute` unit
    Minute,
    /// The `Hour` unit
    Hour,
    /// The `Day` unit
    Day,
    /// The `Week` unit
    Week,
    /// The `Month` unit
    Month,
    /// The `Year` unit
    Year,
}

impl Unit {
    /// Returns the maximum rounding increment for the current `Unit`, or
    /// `None` for date units.
    #[inline]
    #[must_use]
    pub fn to_maximum_rounding_increment(self) -> Option<u32> {
        use Unit::{Auto, Day, Hour, Microsecond, Millisecond, Minute, Month, Nanosecond, Second, Week, Year};
        let max = match self {
            Year | Month | Week | Day | Auto => return None,
            Hour => 24,
            Minute | Second => 60,
            Millisecond | Microsecond | Nanosecond => 1000,
        };

        Some(max)
    }

    /// Returns the length of the unit in nanoseconds for units of fixed length.
    ///
    /// Days are treated as 24 hours.
    #[must_use]
    pub fn as_nanoseconds(&self) -> Option<u64> {
        use Unit::{Auto, Day, Hour, Microsecond, Millisecond, Minute, Month, Nanosecond, Second, Week, Year};
        match self {
            Year | Month | Week | Auto => None,
            Day => Some(NS_PER_DAY),
            Hour => Some(3_600_000_000_000),
            Minute => Some(60_000_000_000),
            Second => Some(1_000_000_000),
            Millisecond => Some(1_000_000),
            Microsecond => Some(1_000),
            Nanosecond => Some(1),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_calendar_unit(&self) -> bool {
        matches!(self, Self::Year | Self::Month | Self::Week)
    }

    #[inline]
    #[must_use]
    pub fn is_date_unit(&self) -> bool {
        matches!(self, Self::Year | Self::Month | Self::Week | Self::Day)
    }

    #[inline]
    #[must_use]
    pub fn is_time_unit(&self) -> bool {
        use Unit::{Hour, Microsecond, Millisecond, Minute, Nanosecond, Second};
        matches!(
            self,
            Hour | Minute | Second | Millisecond | Microsecond | Nanosecond
        )
    }
}

impl From<usize> for Unit {
    fn from(value: usize) -> Self {
        match value {
            10 => Self::Year,
            9 => Self::Month,
            8 => Self::Week,
            7 => Self::Day,
            6 => Self::Hour,
            5 => Self::Minute,
            4 => Self::Second,
            3 => Self::Millisecond,
            2 => Self::Microsecond,
            1 => Self::Nanosecond,
            _ => Self::Auto,
        }
    }
}

impl Add<usize> for Unit {
    type Output = Unit;

    fn add(self, rhs: usize) -> Self::Output {
        Unit::from(self as usize + rhs)
    }
}

impl FromStr for Unit {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "year" | "years" => Ok(Self::Year),
            "month" | "months" => Ok(Self::Month),
            "week" | "weeks" => Ok(Self::Week),
            "day" | "days" => Ok(Self::Day),
            "hour" | "hours" => Ok(Self::Hour),
            "minute" | "minutes" => Ok(Self::Minute),
            "second" | "seconds" => Ok(Self::Second),
            "millisecond" | "milliseconds" => Ok(Self::Millisecond),
            "microsecond" | "microseconds" => Ok(Self::Microsecond),
            "nanosecond" | "nanoseconds" => Ok(Self::Nanosecond),
            _ => Err(TemporalError::range().with_message("Unit not an accepted value.")),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Auto => "auto",
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
            Self::Microsecond => "microsecond",
            Self::Nanosecond => "nanosecond",
        }
        .fmt(f)
    }
}

/// `ArithmeticOverflow` can also be used as an
/// assignment overflow and consists of the "constrain"
/// and "reject" options.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOverflow {
    /// Constrain option
    #[default]
    Constrain,
    /// Reject option
    Reject,
}

impl FromStr for ArithmeticOverflow {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constrain" => Ok(Self::Constrain),
            "reject" => Ok(Self::Reject),
            _ => Err(TemporalError::range().with_message("overflow not an accepted value.")),
        }
    }
}

impl fmt::Display for ArithmeticOverflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Constrain => "constrain",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

/// The disambiguation options for a local date-time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Disambiguation {
    /// Compatible option
    #[default]
    Compatible,
    /// Earlier option
    Earlier,
    /// Later option
    Later,
    /// Reject option
    Reject,
}

impl FromStr for Disambiguation {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compatible" => Ok(Self::Compatible),
            "earlier" => Ok(Self::Earlier),
            "later" => Ok(Self::Later),
            "reject" => Ok(Self::Reject),
            _ => Err(TemporalError::range().with_message("disambiguation not an accepted value.")),
        }
    }
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Compatible => "compatible",
            Self::Earlier => "earlier",
            Self::Later => "later",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

/// Offset disambiguation options.
///
/// Controls how an offset written in a string is checked against the time zone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDisambiguation {
    /// Use the written offset, ignoring the time zone rules.
    Use,
    /// Use the written offset if it is valid for the zone, else the zone's.
    Prefer,
    /// Ignore the written offset.
    Ignore,
    /// Error unless the written offset is valid for the zone.
    #[default]
    Reject,
}

impl FromStr for OffsetDisambiguation {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use" => Ok(Self::Use),
            "prefer" => Ok(Self::Prefer),
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            _ => Err(TemporalError::range().with_message("offset not an accepted value.")),
        }
    }
}

impl fmt::Display for OffsetDisambiguation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Use => "use",
            Self::Prefer => "prefer",
            Self::Ignore => "ignore",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

/// Declares the specified `RoundingMode` for the operation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round toward positive infinity (later in time).
    Ceil,
    /// Round toward negative infinity (earlier in time).
    Floor,
    /// Round toward zero.
    Trunc,
    /// Round to the closer multiple, with ties toward positive infinity.
    #[default]
    Nearest,
}

/// The `UnsignedRoundingMode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsignedRoundingMode {
    /// `Infinity` `RoundingMode`
    Infinity,
    /// `Zero` `RoundingMode`
    Zero,
    /// `HalfInfinity` `RoundingMode`
    HalfInfinity,
    /// `HalfZero` `RoundingMode`
    HalfZero,
}

impl RoundingMode {
    /// Returns the `UnsignedRoundingMode` that applies to the magnitude of
    /// a value with the provided sign.
    #[inline]
    #[must_use]
    pub const fn get_unsigned_round_mode(self, is_positive: bool) -> UnsignedRoundingMode {
        match self {
            Self::Ceil if is_positive => UnsignedRoundingMode::Infinity,
            Self::Ceil | Self::Trunc => UnsignedRoundingMode::Zero,
            Self::Floor if is_positive => UnsignedRoundingMode::Zero,
            Self::Floor => UnsignedRoundingMode::Infinity,
            Self::Nearest if is_positive => UnsignedRoundingMode::HalfInfinity,
            Self::Nearest => UnsignedRoundingMode::HalfZero,
        }
    }
}

impl FromStr for RoundingMode {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ceil" => Ok(Self::Ceil),
            "floor" => Ok(Self::Floor),
            "trunc" => Ok(Self::Trunc),
            "nearest" => Ok(Self::Nearest),
            _ => Err(TemporalError::range().with_message("RoundingMode not an accepted value.")),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Trunc => "trunc",
            Self::Nearest => "nearest",
        }
        .fmt(f)
    }
}

/// Whether to show the calendar annotation in formatted strings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCalendar {
    /// Show the annotation unless the calendar is `iso8601`.
    #[default]
    Auto,
    /// Always show the annotation.
    Always,
    /// Never show the annotation.
    Never,
}

impl fmt::Display for DisplayCalendar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayCalendar::Auto => "auto",
            DisplayCalendar::Always => "always",
            DisplayCalendar::Never => "never",
        }
        .fmt(f)
    }
}

impl FromStr for DisplayCalendar {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(TemporalError::range().with_message("calendarName not an accepted value.")),
        }
    }
}

/// Whether to show the offset in formatted zoned strings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOffset {
    #[default]
    Auto,
    Never,
}

impl fmt::Display for DisplayOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayOffset::Auto => "auto",
            DisplayOffset::Never => "never",
        }
        .fmt(f)
    }
}

impl FromStr for DisplayOffset {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            _ => Err(TemporalError::range().with_message("offset display not an accepted value.")),
        }
    }
}

/// Whether to show the time zone annotation in formatted zoned strings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTimeZone {
    #[default]
    Auto,
    Never,
}

impl fmt::Display for DisplayTimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayTimeZone::Auto => "auto",
            DisplayTimeZone::Never => "never",
        }
        .fmt(f)
    }
}

impl FromStr for DisplayTimeZone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            _ => Err(TemporalError::range().with_message("timeZoneName not an accepted value.")),
        }
    }
}

// ==== Formatting precision ====

/// The precision of the seconds component in formatted strings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    /// Show seconds, and only as many fraction digits as needed.
    #[default]
    Auto,
    /// Stop at minutes.
    Minute,
    /// Show exactly this many fraction digits (0..=9).
    Digit(u8),
}

impl FromStr for Precision {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            b"auto" => Ok(Self::Auto),
            [digit @ b'0'..=b'9'] => Ok(Self::Digit(digit - b'0')),
            _ => Err(TemporalError::range()
                .with_message("fractionalSecondDigits not an accepted value.")),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Minute => f.write_str("minute"),
            Self::Digit(d) => d.fmt(f),
        }
    }
}

/// Rounding options applied before formatting a value.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy)]
pub struct ToStringRoundingOptions {
    /// The fractional second digits to display.
    pub precision: Precision,
    /// A smallest unit, which overrides `precision` when present.
    pub smallest_unit: Option<Unit>,
    /// Defaults to `Trunc`.
    pub rounding_mode: Option<RoundingMode>,
}

impl ToStringRoundingOptions {
    /// Create options that display a fixed number of fraction digits.
    pub fn with_precision(precision: Precision) -> Self {
        Self {
            precision,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedToStringRoundingOptions {
    pub(crate) precision: Precision,
    pub(crate) smallest_unit: Unit,
    pub(crate) mode: RoundingMode,
    pub(crate) increment: RoundingIncrement,
}

impl ToStringRoundingOptions {
    pub(crate) fn resolve(&self) -> TemporalResult<ResolvedToStringRoundingOptions> {
        let mode = self.rounding_mode.unwrap_or(RoundingMode::Trunc);
        match self.smallest_unit {
            Some(Unit::Minute) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Minute,
                smallest_unit: Unit::Minute,
                mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Second) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(0),
                smallest_unit: Unit::Second,
                mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Millisecond) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(3),
                smallest_unit: Unit::Millisecond,
                mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Microsecond) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(6),
                smallest_unit: Unit::Microsecond,
                mode,
                increment: RoundingIncrement::ONE,
            }),
            Some(Unit::Nanosecond) => Ok(ResolvedToStringRoundingOptions {
                precision: Precision::Digit(9),
                smallest_unit: Unit::Nanosecond,
                mode,
                increment: RoundingIncrement::ONE,
            }),
            None => match self.precision {
                Precision::Auto => Ok(ResolvedToStringRoundingOptions {
                    precision: Precision::Auto,
                    smallest_unit: Unit::Nanosecond,
                    mode,
                    increment: RoundingIncrement::ONE,
                }),
                Precision::Minute => Ok(ResolvedToStringRoundingOptions {
                    precision: Precision::Minute,
                    smallest_unit: Unit::Minute,
                    mode,
                    increment: RoundingIncrement::ONE,
                }),
                Precision::Digit(0) => Ok(ResolvedToStringRoundingOptions {
                    precision: Precision::Digit(0),
                    smallest_unit: Unit::Second,
                    mode,
                    increment: RoundingIncrement::ONE,
                }),
                Precision::Digit(d) if d <= 9 => {
                    // Round to 10^(9 - d) of the next finer sub-second unit.
                    let (smallest_unit, exponent) = match d {
                        1..=3 => (Unit::Millisecond, 3 - u32::from(d)),
                        4..=6 => (Unit::Microsecond, 6 - u32::from(d)),
                        _ => (Unit::Nanosecond, 9 - u32::from(d)),
                    };
                    Ok(ResolvedToStringRoundingOptions {
                        precision: Precision::Digit(d),
                        smallest_unit,
                        mode,
                        increment: RoundingIncrement::try_new(10u32.pow(exponent))?,
                    })
                }
                Precision::Digit(_) => Err(TemporalError::range()
                    .with_message("fractionalSecondDigits must be between 0 and 9.")),
            },
            _ => Err(TemporalError::range()
                .with_message("smallestUnit is not a valid unit for formatting.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn unit_parsing() {
        assert_eq!(Unit::from_str("years").unwrap(), Unit::Year);
        assert_eq!(Unit::from_str("minute").unwrap(), Unit::Minute);
        assert_eq!(Unit::from_str("auto").unwrap(), Unit::Auto);
        let err = Unit::from_str("fortnight").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Range);
        assert!(Unit::Hour < Unit::Day);
        assert_eq!(Unit::Hour + 1, Unit::Day);
        assert_eq!(Unit::Year + 1, Unit::Auto);
    }

    #[test]
    fn option_parsing() {
        assert_eq!(
            RoundingMode::from_str("nearest").unwrap(),
            RoundingMode::Nearest
        );
        assert!(RoundingMode::from_str("halfExpand").is_err());
        assert_eq!(
            OffsetDisambiguation::from_str("prefer").unwrap(),
            OffsetDisambiguation::Prefer
        );
        assert_eq!(OffsetDisambiguation::default(), OffsetDisambiguation::Reject);
        assert_eq!(Disambiguation::default(), Disambiguation::Compatible);
        assert!(ArithmeticOverflow::from_str("balance").is_err());
        assert_eq!(Precision::from_str("7").unwrap(), Precision::Digit(7));
        assert!(Precision::from_str("10").is_err());
        assert_eq!(DisplayCalendar::from_str("always").unwrap(), DisplayCalendar::Always);
        assert!(DisplayTimeZone::from_str("critical").is_err());
    }

    #[test]
    fn unsigned_modes() {
        use UnsignedRoundingMode::*;
        assert_eq!(RoundingMode::Ceil.get_unsigned_round_mode(true), Infinity);
        assert_eq!(RoundingMode::Ceil.get_unsigned_round_mode(false), Zero);
        assert_eq!(RoundingMode::Floor.get_unsigned_round_mode(true), Zero);
        assert_eq!(RoundingMode::Floor.get_unsigned_round_mode(false), Infinity);
        assert_eq!(RoundingMode::Trunc.get_unsigned_round_mode(false), Zero);
        assert_eq!(RoundingMode::Nearest.get_unsigned_round_mode(true), HalfInfinity);
        assert_eq!(RoundingMode::Nearest.get_unsigned_round_mode(false), HalfZero);
    }

    #[test]
    fn datetime_increment_validation() {
        let resolve = |unit, increment| {
            ResolvedRoundingOptions::from_datetime_options(RoundingOptions {
                largest_unit: None,
                smallest_unit: Some(unit),
                rounding_mode: None,
                increment: Some(RoundingIncrement::try_new(increment).unwrap()),
            })
        };

        for unit in [
            Unit::Hour,
            Unit::Minute,
            Unit::Second,
            Unit::Millisecond,
            Unit::Microsecond,
            Unit::Nanosecond,
        ] {
            assert!(resolve(unit, 29).is_err(), "29 accepted for {unit}");
        }
        assert!(resolve(Unit::Day, 1).is_ok());
        assert!(resolve(Unit::Day, 2).is_err());
        assert!(resolve(Unit::Hour, 24).is_err());
        assert!(resolve(Unit::Hour, 12).is_ok());
        assert!(resolve(Unit::Minute, 60).is_err());
        assert!(resolve(Unit::Minute, 15).is_ok());
        assert!(resolve(Unit::Millisecond, 1000).is_err());
        assert!(resolve(Unit::Nanosecond, 500).is_ok());
        assert!(resolve(Unit::Week, 1).is_err());
    }

    #[test]
    fn since_flips_unsigned_mode() {
        let options = ResolvedRoundingOptions::from_diff_settings(
            DifferenceSettings {
                rounding_mode: Some(RoundingMode::Ceil),
                ..Default::default()
            },
            DifferenceOperation::Since,
            Unit::Day,
            Unit::Day,
        )
        .unwrap();
        assert_eq!(
            options.unsigned_rounding_mode(false),
            UnsignedRoundingMode::Infinity
        );
        assert_eq!(
            options.unsigned_rounding_mode(true),
            UnsignedRoundingMode::Zero
        );
    }

    #[test]
    fn to_string_options() {
        let resolved = ToStringRoundingOptions::with_precision(Precision::Digit(2))
            .resolve()
            .unwrap();
        assert_eq!(resolved.smallest_unit, Unit::Millisecond);
        assert_eq!(resolved.increment.get(), 10);
        assert_eq!(resolved.mode, RoundingMode::Trunc);

        let resolved = ToStringRoundingOptions {
            precision: Precision::Digit(2),
            smallest_unit: Some(Unit::Microsecond),
            rounding_mode: Some(RoundingMode::Nearest),
        }
        .resolve()
        .unwrap();
        assert_eq!(resolved.precision, Precision::Digit(6));
        assert_eq!(resolved.increment, RoundingIncrement::ONE);

        assert!(ToStringRoundingOptions {
            smallest_unit: Some(Unit::Hour),
            ..Default::default()
        }
        .resolve()
        .is_err());
    }
}
