//! `temporal_engine` is a calendar-aware date and time engine.
//!
//! It provides civil dates, times, durations, exact instants and zoned
//! date-times, along with exact arithmetic, differencing and rounding over
//! them, and an ISO 8601 / RFC 9557 codec.
//!
//! ```rust
//! use temporal_engine::{Calendar, PlainDate};
//! use core::str::FromStr;
//!
//! // Create a date with the ISO calendar
//! let date = PlainDate::try_new(2025, 3, 3, Calendar::default()).unwrap();
//!
//! assert_eq!(date.week_of_year(), Some(10));
//! assert_eq!(date.day_of_week(), 1);
//!
//! // Calendar identifiers are case insensitive
//! let iso = date.with_calendar(Calendar::from_str("ISO8601").unwrap());
//! assert_eq!(iso, date);
//! ```
//!
//! Nanosecond quantities are carried as `i128` throughout, so no operation
//! routes through floating point.
#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    // Currently throws a false positive regarding dependencies that are only used in tests.
    unused_crate_dependencies,
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate,
    clippy::too_many_lines,
    clippy::cognitive_complexity,
    clippy::missing_errors_doc,
    clippy::let_unit_value,
    clippy::option_if_let_else,

    // It may be worth to look if we can fix the issues highlighted by these lints.
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
)]

extern crate alloc;
extern crate core;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod error;
pub mod iso;
pub mod options;
pub mod parsers;
pub mod provider;

#[cfg(feature = "sys")]
pub(crate) mod sys;

mod builtins;
mod epoch_nanoseconds;

#[cfg(feature = "tzdb")]
pub mod tzdb;

#[doc(hidden)]
pub(crate) mod rounding;
#[doc(hidden)]
pub(crate) mod utils;

use core::cmp::Ordering;

/// Re-export of `TinyAsciiStr` from `tinystr`.
pub use tinystr::TinyAsciiStr;

#[doc(inline)]
pub use error::TemporalError;

/// The crate's result type
pub type TemporalResult<T> = Result<T, TemporalError>;

pub mod partial {
    //! Partial field records used to build dates and durations.
    pub use crate::builtins::core::{calendar::CalendarFields, PartialDuration};
}

pub mod time {
    pub use crate::epoch_nanoseconds::EpochNanoseconds;
}

pub use crate::builtins::core::{
    calendar::{Calendar, CalendarSystem},
    timezone::{TimeZone, UtcOffset},
    DateDuration, Duration, Instant, Now, PlainDate, PlainDateTime, PlainTime, TimeDuration,
    ZonedDateTime,
};

/// A library specific trait for unwrapping assertions.
pub(crate) trait TemporalUnwrap {
    type Output;

    /// Assertion based unwrapping. This will panic in debug builds,
    /// but returns an assert error at runtime.
    fn temporal_unwrap(self) -> TemporalResult<Self::Output>;
}

impl<T> TemporalUnwrap for Option<T> {
    type Output = T;

    fn temporal_unwrap(self) -> TemporalResult<Self::Output> {
        debug_assert!(self.is_some());
        self.ok_or(TemporalError::assert())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! temporal_assert {
    ($condition:expr $(,)*) => {
        if !$condition {
            return Err(TemporalError::assert());
        }
    };
    ($condition:expr, $($args:tt)+) => {
        if !$condition {
            #[cfg(feature = "log")]
            log::error!($($args)+);
            return Err(TemporalError::assert());
        }
    };
}

/// A general Sign type.
#[repr(i8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sign {
    #[default]
    Positive = 1,
    Zero = 0,
    Negative = -1,
}

impl From<i8> for Sign {
    fn from(value: i8) -> Self {
        match value.cmp(&0) {
            Ordering::Greater => Self::Positive,
            Ordering::Equal => Self::Zero,
            Ordering::Less => Self::Negative,
        }
    }
}

impl From<Ordering> for Sign {
    fn from(value: Ordering) -> Self {
        match value {
            Ordering::Greater => Self::Positive,
            Ordering::Equal => Self::Zero,
            Ordering::Less => Self::Negative,
        }
    }
}

impl Sign {
    /// Coerces the current `Sign` to be either negative or positive.
    pub(crate) fn as_sign_multiplier(&self) -> i8 {
        if matches!(self, Self::Zero) {
            return 1;
        }
        *self as i8
    }

    pub(crate) fn negate(&self) -> Sign {
        Sign::from(-(*self as i8))
    }
}

// Relevant numeric constants
/// Nanoseconds per day constant: 8.64e+13
pub const NS_PER_DAY: u64 = MS_PER_DAY as u64 * 1_000_000;
/// Milliseconds per day constant: 8.64e+7
pub const MS_PER_DAY: u32 = 24 * 60 * 60 * 1000;
/// Nanoseconds per hour constant.
pub(crate) const NS_PER_HOUR: i128 = 3_600_000_000_000;
/// Max Instant nanosecond constant
#[doc(hidden)]
pub(crate) const NS_MAX_INSTANT: i128 = NS_PER_DAY as i128 * 100_000_000i128;
/// Min Instant nanosecond constant
#[doc(hidden)]
pub(crate) const NS_MIN_INSTANT: i128 = -NS_MAX_INSTANT;
