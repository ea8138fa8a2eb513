//! The rounding increment option.

use core::num::{NonZeroU128, NonZeroU32};
use core::{fmt, str::FromStr};

use crate::error::ErrorMessage;
use crate::{TemporalError, TemporalResult};

/// A positive rounding increment, at most `1_000_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundingIncrement(pub(crate) NonZeroU32);

impl Default for RoundingIncrement {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<f64> for RoundingIncrement {
    type Error = TemporalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 1.0 || value > 1_000_000_000.0 {
            return Err(TemporalError::range()
                .with_message("roundingIncrement must be between 1 and 10^9."));
        }
        // Fractional increments truncate.
        Self::try_new(value as u32)
    }
}

impl FromStr for RoundingIncrement {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<u32>().map_err(|_| {
            TemporalError::range().with_message("roundingIncrement is not a positive integer.")
        })?;
        Self::try_new(value)
    }
}

impl fmt::Display for RoundingIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl RoundingIncrement {
    /// An increment of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a new `RoundingIncrement`, failing when the value is zero or
    /// above `10^9`.
    pub fn try_new(increment: u32) -> TemporalResult<Self> {
        if !(1..=1_000_000_000).contains(&increment) {
            return Err(TemporalError::range()
                .with_message("roundingIncrement must be between 1 and 10^9."));
        }
        NonZeroU32::new(increment)
            .map(Self)
            .ok_or(TemporalError::assert())
    }

    /// Returns the increment as a `u32`.
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns the increment widened for nanosecond arithmetic.
    pub(crate) fn as_extended_increment(&self) -> NonZeroU128 {
        NonZeroU128::from(self.0)
    }

    /// Checks that the increment evenly divides `dividend`, and that it is
    /// below it (or equal to it when `inclusive`).
    pub(crate) fn validate(&self, dividend: u64, inclusive: bool) -> TemporalResult<()> {
        let max = if inclusive { dividend } else { dividend - 1 };
        let increment = u64::from(self.get());

        if increment > max || dividend % increment != 0 {
            return Err(TemporalError::range().with_enum(ErrorMessage::RoundingIncrementInvalid));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RoundingIncrement;

    #[test]
    fn increment_validation() {
        let increment = |n| RoundingIncrement::try_new(n).unwrap();

        assert!(RoundingIncrement::try_new(0).is_err());
        assert!(RoundingIncrement::try_new(1_000_000_001).is_err());

        // Equal to the next unit is only valid when inclusive
        assert!(increment(24).validate(24, false).is_err());
        assert!(increment(24).validate(24, true).is_ok());
        assert!(increment(29).validate(60, false).is_err());
        assert!(increment(30).validate(60, false).is_ok());
        assert!(increment(7).validate(1000, false).is_err());
        assert!(increment(1).validate(1, true).is_ok());
        assert!(increment(2).validate(1, true).is_err());

        assert_eq!(RoundingIncrement::try_from(2.9).unwrap().get(), 2);
        assert!(RoundingIncrement::try_from(f64::NAN).is_err());
        assert_eq!("15".parse::<RoundingIncrement>().unwrap().get(), 15);
    }
}
