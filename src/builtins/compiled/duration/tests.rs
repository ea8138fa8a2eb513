use core::cmp::Ordering;

use crate::{
    options::{RelativeTo, RoundingMode, RoundingOptions, Unit},
    Calendar, PlainDate, TimeZone, ZonedDateTime,
};

use super::Duration;

struct TestCase {
    smallest_unit: Unit,
    expected: [i128; 10],
}

const fn case(smallest_unit: Unit, expected: [i128; 10]) -> TestCase {
    TestCase {
        smallest_unit,
        expected,
    }
}

fn fields(duration: &Duration) -> [i128; 10] {
    [
        duration.years().into(),
        duration.months().into(),
        duration.weeks().into(),
        duration.days().into(),
        duration.hours().into(),
        duration.minutes().into(),
        duration.seconds().into(),
        duration.milliseconds().into(),
        duration.microseconds(),
        duration.nanoseconds(),
    ]
}

fn test_duration() -> Duration {
    Duration::new(5, 6, 7, 8, 40, 30, 20, 123, 987, 500).unwrap()
}

fn run_cases(
    duration: &Duration,
    relative_to: &PlainDate,
    mode: RoundingMode,
    cases: &[TestCase],
) {
    for test in cases {
        let options = RoundingOptions {
            largest_unit: None,
            smallest_unit: Some(test.smallest_unit),
            rounding_mode: Some(mode),
            increment: None,
        };
        let result = duration
            .round(options, Some(RelativeTo::PlainDate(*relative_to)))
            .unwrap();
        assert_eq!(
            fields(&result),
            test.expected,
            "{mode:?} to {:?}",
            test.smallest_unit
        );
    }
}

// roundingmode-floor
#[test]
fn basic_positive_floor_rounding() {
    let forward = PlainDate::try_new(2020, 4, 1, Calendar::default()).unwrap();
    let cases = [
        case(Unit::Year, [5, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Month, [5, 7, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Week, [5, 7, 3, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Day, [5, 7, 0, 27, 0, 0, 0, 0, 0, 0]),
        case(Unit::Hour, [5, 7, 0, 27, 16, 0, 0, 0, 0, 0]),
        case(Unit::Minute, [5, 7, 0, 27, 16, 30, 0, 0, 0, 0]),
        case(Unit::Second, [5, 7, 0, 27, 16, 30, 20, 0, 0, 0]),
        case(Unit::Millisecond, [5, 7, 0, 27, 16, 30, 20, 123, 0, 0]),
        case(Unit::Microsecond, [5, 7, 0, 27, 16, 30, 20, 123, 987, 0]),
        case(Unit::Nanosecond, [5, 7, 0, 27, 16, 30, 20, 123, 987, 500]),
    ];
    run_cases(&test_duration(), &forward, RoundingMode::Floor, &cases);
}

#[test]
fn basic_negative_floor_rounding() {
    let backward = PlainDate::try_new(2020, 12, 1, Calendar::default()).unwrap();
    let cases = [
        case(Unit::Year, [-6, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Month, [-5, -8, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Week, [-5, -7, -4, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Day, [-5, -7, 0, -28, 0, 0, 0, 0, 0, 0]),
        case(Unit::Hour, [-5, -7, 0, -27, -17, 0, 0, 0, 0, 0]),
        case(Unit::Minute, [-5, -7, 0, -27, -16, -31, 0, 0, 0, 0]),
        case(Unit::Second, [-5, -7, 0, -27, -16, -30, -21, 0, 0, 0]),
        case(Unit::Millisecond, [-5, -7, 0, -27, -16, -30, -20, -124, 0, 0]),
        case(Unit::Microsecond, [-5, -7, 0, -27, -16, -30, -20, -123, -988, 0]),
        case(Unit::Nanosecond, [-5, -7, 0, -27, -16, -30, -20, -123, -987, -500]),
    ];
    run_cases(&test_duration().negated(), &backward, RoundingMode::Floor, &cases);
}

// roundingmode-ceil
#[test]
fn basic_positive_ceil_rounding() {
    let forward = PlainDate::try_new(2020, 4, 1, Calendar::default()).unwrap();
    let cases = [
        case(Unit::Year, [6, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Month, [5, 8, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Week, [5, 7, 4, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Day, [5, 7, 0, 28, 0, 0, 0, 0, 0, 0]),
        case(Unit::Hour, [5, 7, 0, 27, 17, 0, 0, 0, 0, 0]),
        case(Unit::Minute, [5, 7, 0, 27, 16, 31, 0, 0, 0, 0]),
        case(Unit::Second, [5, 7, 0, 27, 16, 30, 21, 0, 0, 0]),
        case(Unit::Millisecond, [5, 7, 0, 27, 16, 30, 20, 124, 0, 0]),
        case(Unit::Microsecond, [5, 7, 0, 27, 16, 30, 20, 123, 988, 0]),
        case(Unit::Nanosecond, [5, 7, 0, 27, 16, 30, 20, 123, 987, 500]),
    ];
    run_cases(&test_duration(), &forward, RoundingMode::Ceil, &cases);
}

#[test]
fn basic_negative_ceil_rounding() {
    let backward = PlainDate::try_new(2020, 12, 1, Calendar::default()).unwrap();
    let cases = [
        case(Unit::Year, [-5, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Month, [-5, -7, 0, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Week, [-5, -7, -3, 0, 0, 0, 0, 0, 0, 0]),
        case(Unit::Day, [-5, -7, 0, -27, 0, 0, 0, 0, 0, 0]),
        case(Unit::Hour, [-5, -7, 0, -27, -16, 0, 0, 0, 0, 0]),
        case(Unit::Minute, [-5, -7, 0, -27, -16, -30, 0, 0, 0, 0]),
        case(Unit::Second, [-5, -7, 0, -27, -16, -30, -20, 0, 0, 0]),
        case(Unit::Millisecond, [-5, -7, 0, -27, -16, -30, -20, -123, 0, 0]),
        case(Unit::Microsecond, [-5, -7, 0, -27, -16, -30, -20, -123, -987, 0]),
        case(Unit::Nanosecond, [-5, -7, 0, -27, -16, -30, -20, -123, -987, -500]),
    ];
    run_cases(&test_duration().negated(), &backward, RoundingMode::Ceil, &cases);
}

// days-24-hours-relative-to-zoned-date-time
#[test]
fn round_relative_to_zoned_datetime() {
    let duration = Duration::new(0, 0, 0, 0, 25, 0, 0, 0, 0, 0).unwrap();
    let zdt = ZonedDateTime::try_new(
        1_000_000_000_000_000_000,
        Calendar::default(),
        TimeZone::try_from_str("+04:30").unwrap(),
    )
    .unwrap();
    let options = RoundingOptions {
        largest_unit: Some(Unit::Day),
        smallest_unit: None,
        rounding_mode: None,
        increment: None,
    };
    let result = duration
        .round(options, Some(RelativeTo::ZonedDateTime(zdt)))
        .unwrap();
    assert_eq!(result.days(), 1);
    assert_eq!(result.hours(), 1);
}

#[test]
fn round_relative_to_zoned_datetime_across_dst() {
    // The day of the fall-back transition is 25 hours long.
    let zdt = ZonedDateTime::from_str_with_options(
        "2020-11-01T00:00-07:00[America/Los_Angeles]",
        Default::default(),
        Default::default(),
    )
    .unwrap();
    let duration = Duration::new(0, 0, 0, 0, 25, 0, 0, 0, 0, 0).unwrap();
    let options = RoundingOptions {
        largest_unit: Some(Unit::Day),
        smallest_unit: None,
        rounding_mode: None,
        increment: None,
    };
    let result = duration
        .round(options, Some(RelativeTo::ZonedDateTime(zdt)))
        .unwrap();
    assert_eq!(result.days(), 1);
    assert_eq!(result.hours(), 0);
}

#[test]
fn test_duration_compare() {
    let one = Duration::new(0, 0, 0, 0, 79, 10, 0, 0, 0, 0).unwrap();
    let two = Duration::new(0, 0, 0, 3, 7, 0, 630, 0, 0, 0).unwrap();
    let three = Duration::new(0, 0, 0, 3, 6, 50, 0, 0, 0, 0).unwrap();

    let mut arr = [&one, &two, &three];
    arr.sort_by(|a, b| Duration::compare(a, b, None).unwrap());
    assert_eq!(arr, [&three, &one, &two]);

    // Sorting relative to a date, taking DST changes into account:
    let zdt = ZonedDateTime::from_str_with_options(
        "2020-11-01T00:00-07:00[America/Los_Angeles]",
        Default::default(),
        Default::default(),
    )
    .unwrap();
    arr.sort_by(|a, b| {
        Duration::compare(a, b, Some(RelativeTo::ZonedDateTime(zdt.clone()))).unwrap()
    });
    assert_eq!(arr, [&one, &three, &two]);

    assert_eq!(
        Duration::compare(&one, &one.negated(), None).unwrap(),
        Ordering::Greater
    );
}
