//! The primary date-time components provided by `temporal_engine`.
//!
//! Operations that need time zone data take a [`TimeZoneProvider`][crate::provider::TimeZoneProvider]
//! argument; the `compiled_data` feature adds provider-free wrappers.

pub mod calendar;
pub mod duration;
pub mod timezone;

mod date;
mod datetime;
mod instant;
mod now;
mod time;
mod zoneddatetime;

#[doc(inline)]
pub use date::PlainDate;
#[doc(inline)]
pub use datetime::PlainDateTime;
#[doc(inline)]
pub use duration::{DateDuration, Duration, PartialDuration, TimeDuration};
#[doc(inline)]
pub use instant::Instant;
#[doc(inline)]
pub use now::Now;
#[doc(inline)]
pub use time::PlainTime;
#[doc(inline)]
pub use zoneddatetime::ZonedDateTime;
