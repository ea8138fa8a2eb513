use core::cmp::Ordering;

use crate::{
    builtins::TZ_PROVIDER,
    options::{RelativeTo, RoundingOptions},
    Duration, TemporalResult,
};

#[cfg(test)]
mod tests;

impl Duration {
    /// Rounds the current [`Duration`] according to the provided [`RoundingOptions`]
    /// and an optional [`RelativeTo`] anchor.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn round(
        &self,
        options: RoundingOptions,
        relative_to: Option<RelativeTo>,
    ) -> TemporalResult<Self> {
        self.round_with_provider(options, relative_to, &*TZ_PROVIDER)
    }

    /// Compares two durations, measuring calendar units from `relative_to`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn compare(
        &self,
        other: &Duration,
        relative_to: Option<RelativeTo>,
    ) -> TemporalResult<Ordering> {
        self.compare_with_provider(other, relative_to, &*TZ_PROVIDER)
    }
}
