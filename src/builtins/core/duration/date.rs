//! Implementation of a `DateDuration`

use crate::{
    builtins::core::PlainDate, error::ErrorMessage, options::ArithmeticOverflow, Sign,
    TemporalError, TemporalResult,
};

use super::{duration_sign, is_valid_duration, TimeDuration};

/// `DateDuration` represents the date portion of a `Duration`: the years,
/// months, weeks, and days fields.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateDuration {
    /// `DateDuration`'s internal year value.
    pub years: i64,
    /// `DateDuration`'s internal month value.
    pub months: i64,
    /// `DateDuration`'s internal week value.
    pub weeks: i64,
    /// `DateDuration`'s internal day value.
    pub days: i64,
}

impl DateDuration {
    /// Creates a new, non-validated `DateDuration`.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(years: i64, months: i64, weeks: i64, days: i64) -> Self {
        Self {
            years,
            months,
            weeks,
            days,
        }
    }

    /// Returns the fields in descending unit order.
    #[inline]
    pub(crate) fn fields(&self) -> [i64; 4] {
        [self.years, self.months, self.weeks, self.days]
    }

    /// Returns whether any of the years, months, or weeks are non-zero.
    #[inline]
    pub(crate) fn has_calendar_units(&self) -> bool {
        self.years != 0 || self.months != 0 || self.weeks != 0
    }

    /// Returns the number of days this duration spans when applied to
    /// `relative_to`.
    ///
    /// Equivalent: `DateDurationDays`
    pub(crate) fn days(&self, relative_to: &PlainDate) -> TemporalResult<i64> {
        // 1. If years, months, and weeks are all 0, return days.
        if !self.has_calendar_units() {
            return Ok(self.days);
        }
        // 2. Add the calendar units to the anchor, and measure in epoch days.
        let years_months_weeks = Self::new_unchecked(self.years, self.months, self.weeks, 0);
        let later = relative_to.calendar().date_add(
            &relative_to.iso,
            &years_months_weeks,
            ArithmeticOverflow::Constrain,
        )?;
        let epoch_days_delta = later.to_epoch_days() - relative_to.iso.to_epoch_days();
        // 3. Return days + the epoch day delta.
        self.days
            .checked_add(epoch_days_delta)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationNotValid))
    }
}

impl DateDuration {
    /// Creates a new validated `DateDuration`.
    pub fn new(years: i64, months: i64, weeks: i64, days: i64) -> TemporalResult<Self> {
        let result = Self::new_unchecked(years, months, weeks, days);
        is_valid_duration(&result, &TimeDuration::default())?;
        Ok(result)
    }

    /// Returns a negated `DateDuration`.
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            years: self.years.saturating_neg(),
            months: self.months.saturating_neg(),
            weeks: self.weeks.saturating_neg(),
            days: self.days.saturating_neg(),
        }
    }

    /// Returns a new `DateDuration` representing the absolute value of the current.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            years: self.years.saturating_abs(),
            months: self.months.saturating_abs(),
            weeks: self.weeks.saturating_abs(),
            days: self.days.saturating_abs(),
        }
    }

    /// Returns the sign for the current `DateDuration`.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        duration_sign(self.fields().into_iter().map(i128::from))
    }
}
