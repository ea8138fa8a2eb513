//! An implementation of `TimeDuration` and it's methods.

use crate::{options::Unit, Sign, TemporalResult};

use super::{duration_sign, is_valid_duration, normalized::NormalizedTimeDuration, DateDuration};

use num_traits::Euclid;

/// `TimeDuration` represents the time portion of a `Duration`: the hours
/// through nanoseconds fields.
///
/// Microseconds and nanoseconds are held as `i128`, since a balanced
/// duration may carry its entire length in either unit.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeDuration {
    /// `TimeDuration`'s internal hour value.
    pub hours: i64,
    /// `TimeDuration`'s internal minute value.
    pub minutes: i64,
    /// `TimeDuration`'s internal second value.
    pub seconds: i64,
    /// `TimeDuration`'s internal millisecond value.
    pub milliseconds: i64,
    /// `TimeDuration`'s internal microsecond value.
    pub microseconds: i128,
    /// `TimeDuration`'s internal nanosecond value.
    pub nanoseconds: i128,
}
// ==== TimeDuration Private API ====

impl TimeDuration {
    /// Creates a new `TimeDuration`.
    #[must_use]
    pub(crate) const fn new_unchecked(
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        }
    }

    /// Balances and creates `TimeDuration` from a `NormalizedTimeDuration`. This method will return
    /// a tuple (i64, TimeDuration) where i64 is the overflow day value from balancing.
    ///
    /// Equivalent: `BalanceTimeDuration`
    ///
    /// # Errors:
    ///   - Will error if provided duration is invalid
    pub(crate) fn from_normalized(
        norm: NormalizedTimeDuration,
        largest_unit: Unit,
    ) -> TemporalResult<(i64, Self)> {
        // 1. Let days, hours, minutes, seconds, milliseconds, and microseconds be 0.
        let mut days = 0;
        let mut hours = 0;
        let mut minutes = 0;
        let mut seconds = 0;
        let mut milliseconds = 0;
        let mut microseconds = 0;

        // 2. Let sign be NormalizedTimeDurationSign(norm).
        let sign = i128::from(norm.sign() as i8);
        // 3. Let nanoseconds be NormalizedTimeDurationAbs(norm).[[TotalNanoseconds]].
        let mut nanoseconds = norm.0.abs();

        // 4. Carry each unit below `largestUnit` into the next larger one.
        if largest_unit >= Unit::Microsecond {
            (microseconds, nanoseconds) = nanoseconds.div_rem_euclid(&1_000);
        }
        if largest_unit >= Unit::Millisecond {
            (milliseconds, microseconds) = microseconds.div_rem_euclid(&1_000);
        }
        if largest_unit >= Unit::Second {
            (seconds, milliseconds) = milliseconds.div_rem_euclid(&1_000);
        }
        if largest_unit >= Unit::Minute {
            (minutes, seconds) = seconds.div_rem_euclid(&60);
        }
        if largest_unit >= Unit::Hour {
            (hours, minutes) = minutes.div_rem_euclid(&60);
        }
        if largest_unit >= Unit::Day {
            (days, hours) = hours.div_rem_euclid(&24);
        }

        // 5. The magnitude of `norm` is below 2^53 seconds, so each of
        //    the carried values below fits its field.
        let result = Self::new_unchecked(
            (hours * sign) as i64,
            (minutes * sign) as i64,
            (seconds * sign) as i64,
            (milliseconds * sign) as i64,
            microseconds * sign,
            nanoseconds * sign,
        );
        let days = (days * sign) as i64;

        is_valid_duration(&DateDuration::new_unchecked(0, 0, 0, days), &result)?;

        Ok((days, result))
    }

    /// Returns this `TimeDuration` as a `NormalizedTimeDuration`.
    #[inline]
    pub(crate) fn to_normalized(self) -> TemporalResult<NormalizedTimeDuration> {
        NormalizedTimeDuration::from_time_duration(&self)
    }

    /// Returns the total of the fields in nanoseconds, if it fits in an `i128`.
    pub(crate) fn checked_total_nanoseconds(&self) -> Option<i128> {
        let hours = i128::from(self.hours).checked_mul(3_600_000_000_000)?;
        let minutes = i128::from(self.minutes).checked_mul(60_000_000_000)?;
        let seconds = i128::from(self.seconds).checked_mul(1_000_000_000)?;
        let milliseconds = i128::from(self.milliseconds).checked_mul(1_000_000)?;
        let microseconds = self.microseconds.checked_mul(1_000)?;
        hours
            .checked_add(minutes)?
            .checked_add(seconds)?
            .checked_add(milliseconds)?
            .checked_add(microseconds)?
            .checked_add(self.nanoseconds)
    }

    #[inline]
    pub(crate) fn fields(&self) -> [i128; 6] {
        [
            self.hours.into(),
            self.minutes.into(),
            self.seconds.into(),
            self.milliseconds.into(),
            self.microseconds,
            self.nanoseconds,
        ]
    }
}

// ==== TimeDuration's public API ====

impl TimeDuration {
    /// Creates a new validated `TimeDuration`.
    pub fn new(
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> TemporalResult<Self> {
        let result = Self::new_unchecked(
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        );
        is_valid_duration(&DateDuration::default(), &result)?;
        Ok(result)
    }

    /// Returns a new `TimeDuration` representing the absolute value of the current.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            hours: self.hours.saturating_abs(),
            minutes: self.minutes.saturating_abs(),
            seconds: self.seconds.saturating_abs(),
            milliseconds: self.milliseconds.saturating_abs(),
            microseconds: self.microseconds.saturating_abs(),
            nanoseconds: self.nanoseconds.saturating_abs(),
        }
    }

    /// Returns a negated `TimeDuration`.
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            hours: self.hours.saturating_neg(),
            minutes: self.minutes.saturating_neg(),
            seconds: self.seconds.saturating_neg(),
            milliseconds: self.milliseconds.saturating_neg(),
            microseconds: self.microseconds.saturating_neg(),
            nanoseconds: self.nanoseconds.saturating_neg(),
        }
    }

    /// Returns the sign for the current `TimeDuration`.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        duration_sign(self.fields().into_iter())
    }

    /// Utility function for returning if values in a valid range.
    #[inline]
    #[must_use]
    pub fn is_within_range(&self) -> bool {
        self.hours.unsigned_abs() < 24
            && self.minutes.unsigned_abs() < 60
            && self.seconds.unsigned_abs() < 60
            && self.milliseconds.unsigned_abs() < 1000
            && self.microseconds.unsigned_abs() < 1000
            && self.nanoseconds.unsigned_abs() < 1000
    }
}
