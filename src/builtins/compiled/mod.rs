//! Convenience methods backed by the bundled time zone data.
//!
//! Each method here forwards to its `*_with_provider` counterpart with the
//! global `TZ_PROVIDER`.

mod date;
mod datetime;
mod duration;
mod instant;
#[cfg(feature = "sys")]
mod now;
mod timezone;
mod zoneddatetime;
