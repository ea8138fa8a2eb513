//! Implementation of increment rounding functionality

use crate::{
    options::{ResolvedRoundingOptions, RoundingMode, UnsignedRoundingMode},
    TemporalResult, TemporalUnwrap,
};

use core::{
    cmp::Ordering,
    num::NonZeroU128,
    ops::{Div, Neg},
};

use num_traits::{ConstZero, Euclid, NumCast, Signed};

pub(crate) trait Roundable: Euclid + Div + PartialOrd + Signed + NumCast + ConstZero + Copy {
    fn is_exact(dividend: Self, divisor: Self) -> bool;
    fn compare_remainder(dividend: Self, divisor: Self) -> Ordering;
    fn result_floor(dividend: Self, divisor: Self) -> u128;
    fn result_ceil(dividend: Self, divisor: Self) -> u128;
    fn quotient_abs(dividend: Self, divisor: Self) -> Self {
        (dividend / divisor).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub(crate) struct IncrementRounder<T: Roundable> {
    sign: bool,
    dividend: T,
    divisor: T,
}

impl<T: Roundable> IncrementRounder<T> {
    #[inline]
    pub(crate) fn from_signed_num(number: T, increment: NonZeroU128) -> TemporalResult<Self> {
        let increment = <T as NumCast>::from(increment.get()).temporal_unwrap()?;
        Ok(Self {
            sign: number >= T::ZERO,
            dividend: number,
            divisor: increment,
        })
    }
}

impl<T: Roundable> IncrementRounder<T> {
    /// Rounds the number with resolved options, honoring a negated operation.
    #[inline]
    pub fn round_with_options(&self, options: &ResolvedRoundingOptions) -> i128 {
        self.round_unsigned(options.unsigned_rounding_mode(self.sign))
    }

    fn round_unsigned(&self, unsigned_rounding_mode: UnsignedRoundingMode) -> i128 {
        let mut rounded =
            apply_unsigned_rounding_mode(self.dividend, self.divisor, unsigned_rounding_mode)
                as i128;
        if !self.sign {
            rounded = rounded.neg();
        }
        // The divisor was created from a `u128` that fit into `T`.
        rounded * <i128 as NumCast>::from(self.divisor).unwrap_or(1)
    }
}

impl Roundable for i128 {
    fn is_exact(dividend: Self, divisor: Self) -> bool {
        dividend.rem_euclid(divisor) == 0
    }

    fn compare_remainder(dividend: Self, divisor: Self) -> Ordering {
        ((dividend.abs() % divisor) * 2).cmp(&divisor)
    }

    fn result_floor(dividend: Self, divisor: Self) -> u128 {
        Roundable::quotient_abs(dividend, divisor) as u128
    }

    fn result_ceil(dividend: Self, divisor: Self) -> u128 {
        Roundable::quotient_abs(dividend, divisor) as u128 + 1
    }
}

impl Roundable for i64 {
    fn is_exact(dividend: Self, divisor: Self) -> bool {
        dividend.rem_euclid(divisor) == 0
    }

    fn compare_remainder(dividend: Self, divisor: Self) -> Ordering {
        (<i128 as From<i64>>::from(dividend.abs() % divisor) * 2)
            .cmp(&<i128 as From<i64>>::from(divisor))
    }

    fn result_floor(dividend: Self, divisor: Self) -> u128 {
        Roundable::quotient_abs(dividend, divisor) as u128
    }

    fn result_ceil(dividend: Self, divisor: Self) -> u128 {
        Roundable::quotient_abs(dividend, divisor) as u128 + 1
    }
}

/// Applies the unsigned rounding mode.
fn apply_unsigned_rounding_mode<T: Roundable>(
    dividend: T,
    divisor: T,
    unsigned_rounding_mode: UnsignedRoundingMode,
) -> u128 {
    if Roundable::is_exact(dividend, divisor) {
        return Roundable::result_floor(dividend, divisor);
    }

    match unsigned_rounding_mode {
        UnsignedRoundingMode::Zero => Roundable::result_floor(dividend, divisor),
        UnsignedRoundingMode::Infinity => Roundable::result_ceil(dividend, divisor),
        half => match Roundable::compare_remainder(dividend, divisor) {
            Ordering::Less => Roundable::result_floor(dividend, divisor),
            Ordering::Greater => Roundable::result_ceil(dividend, divisor),
            Ordering::Equal if half == UnsignedRoundingMode::HalfZero => {
                Roundable::result_floor(dividend, divisor)
            }
            Ordering::Equal => Roundable::result_ceil(dividend, divisor),
        },
    }
}

/// Decides between two bracketing candidates `r1` and `r2` from the exact
/// progress `numerator / denominator` made from `r1` toward `r2`.
///
/// Returns `true` when `r2` is selected.
pub(crate) fn round_progress(
    numerator: i128,
    denominator: i128,
    unsigned_rounding_mode: UnsignedRoundingMode,
) -> bool {
    // Progress made away from `r2` never selects it.
    if numerator == 0 || (numerator < 0) != (denominator < 0) {
        return false;
    }
    let numerator = numerator.abs();
    let denominator = denominator.abs();
    if numerator >= denominator {
        return true;
    }
    match unsigned_rounding_mode {
        UnsignedRoundingMode::Zero => false,
        UnsignedRoundingMode::Infinity => true,
        UnsignedRoundingMode::HalfZero => numerator * 2 > denominator,
        UnsignedRoundingMode::HalfInfinity => numerator * 2 >= denominator,
    }
}

/// Rounds `value` to a multiple of `increment`, applying `mode` as though
/// the value were positive.
///
/// Epoch nanoseconds have no meaningful zero, so `Trunc` and `Floor` both
/// round toward the earlier multiple.
///
/// Equivalent: `RoundNumberToIncrementAsIfPositive`
pub(crate) fn round_as_if_positive(
    value: i128,
    increment: NonZeroU128,
    mode: RoundingMode,
) -> TemporalResult<i128> {
    let increment = i128::try_from(increment.get()).ok().temporal_unwrap()?;
    let floor = value.div_euclid(increment) * increment;
    if round_progress(
        value.rem_euclid(increment),
        increment,
        mode.get_unsigned_round_mode(true),
    ) {
        return Ok(floor + increment);
    }
    Ok(floor)
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU128;

    use super::{round_as_if_positive, round_progress, IncrementRounder, Roundable, RoundingMode};
    use crate::options::UnsignedRoundingMode;
    use core::fmt::Debug;

    #[derive(Debug)]
    struct TestCase<T> {
        x: T,
        increment: u128,
        ceil: i128,
        floor: i128,
        trunc: i128,
        nearest: i128,
    }

    impl<T: Roundable + Debug> TestCase<T> {
        fn run(&self) {
            let rounder = IncrementRounder::from_signed_num(
                self.x,
                TryFrom::try_from(self.increment).unwrap(),
            )
            .unwrap();
            for (mode, expected) in [
                (RoundingMode::Ceil, self.ceil),
                (RoundingMode::Floor, self.floor),
                (RoundingMode::Trunc, self.trunc),
                (RoundingMode::Nearest, self.nearest),
            ] {
                assert_eq!(
                    expected,
                    rounder.round_unsigned(mode.get_unsigned_round_mode(rounder.sign)),
                    "Testing {:?}/{:?} with mode {mode}",
                    self.x,
                    self.increment
                );
            }
        }
    }

    #[test]
    fn test_basic_rounding_cases() {
        const CASES: &[TestCase<i128>] = &[
            TestCase {
                x: 100,
                increment: 10,
                ceil: 100,
                floor: 100,
                trunc: 100,
                nearest: 100,
            },
            TestCase {
                x: 101,
                increment: 10,
                ceil: 110,
                floor: 100,
                trunc: 100,
                nearest: 100,
            },
            TestCase {
                x: 105,
                increment: 10,
                ceil: 110,
                floor: 100,
                trunc: 100,
                nearest: 110,
            },
            TestCase {
                x: 107,
                increment: 10,
                ceil: 110,
                floor: 100,
                trunc: 100,
                nearest: 110,
            },
            TestCase {
                x: -100,
                increment: 10,
                ceil: -100,
                floor: -100,
                trunc: -100,
                nearest: -100,
            },
            TestCase {
                x: -101,
                increment: 10,
                ceil: -100,
                floor: -110,
                trunc: -100,
                nearest: -100,
            },
            TestCase {
                x: -105,
                increment: 10,
                ceil: -100,
                floor: -110,
                trunc: -100,
                nearest: -100,
            },
            TestCase {
                x: -107,
                increment: 10,
                ceil: -100,
                floor: -110,
                trunc: -100,
                nearest: -110,
            },
        ];

        for case in CASES {
            case.run();
        }
    }

    #[test]
    fn odd_increment_rounding() {
        // A remainder of one third is not a tie.
        TestCase {
            x: 4i128,
            increment: 3,
            ceil: 6,
            floor: 3,
            trunc: 3,
            nearest: 3,
        }
        .run();

        TestCase {
            x: -14i128,
            increment: 3,
            ceil: -12,
            floor: -15,
            trunc: -12,
            nearest: -15,
        }
        .run();

        TestCase {
            x: -9i64,
            increment: 2,
            ceil: -8,
            floor: -10,
            trunc: -8,
            nearest: -8,
        }
        .run();
    }

    #[test]
    fn dt_since_basic_rounding() {
        let rounder = IncrementRounder::<i128>::from_signed_num(
            -84082624864197532,
            NonZeroU128::new(1800000000000).unwrap(),
        )
        .unwrap();
        let result =
            rounder.round_unsigned(RoundingMode::Nearest.get_unsigned_round_mode(rounder.sign));

        assert_eq!(result, -84083400000000000);
    }

    #[test]
    fn progress_rounding() {
        assert!(!round_progress(0, 10, UnsignedRoundingMode::Infinity));
        assert!(round_progress(10, 10, UnsignedRoundingMode::Zero));
        assert!(round_progress(5, 10, UnsignedRoundingMode::HalfInfinity));
        assert!(!round_progress(5, 10, UnsignedRoundingMode::HalfZero));
        assert!(round_progress(-6, -10, UnsignedRoundingMode::HalfZero));
        assert!(!round_progress(1, 3, UnsignedRoundingMode::HalfInfinity));
        assert!(round_progress(1, 3, UnsignedRoundingMode::Infinity));
        assert!(!round_progress(-1, 3, UnsignedRoundingMode::Infinity));
    }

    #[test]
    fn as_if_positive_rounding() {
        let increment = NonZeroU128::new(10).unwrap();
        assert_eq!(round_as_if_positive(-15, increment, RoundingMode::Trunc).unwrap(), -20);
        assert_eq!(round_as_if_positive(-15, increment, RoundingMode::Ceil).unwrap(), -10);
        assert_eq!(round_as_if_positive(-15, increment, RoundingMode::Nearest).unwrap(), -10);
        assert_eq!(round_as_if_positive(-16, increment, RoundingMode::Nearest).unwrap(), -20);
        assert_eq!(round_as_if_positive(15, increment, RoundingMode::Floor).unwrap(), 10);
        assert_eq!(round_as_if_positive(20, increment, RoundingMode::Ceil).unwrap(), 20);
    }
}
