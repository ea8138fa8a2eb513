use crate::{error::ErrorMessage, TemporalError, TemporalResult};

/// Nanoseconds since the Unix epoch, `1970-01-01T00:00:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EpochNanoseconds(pub(crate) i128);

impl TryFrom<i128> for EpochNanoseconds {
    type Error = TemporalError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        let nanos = Self(value);
        nanos.check_validity()?;
        Ok(nanos)
    }
}

impl EpochNanoseconds {
    pub fn as_i128(&self) -> i128 {
        self.0
    }

    pub fn check_validity(&self) -> TemporalResult<()> {
        if !is_valid_epoch_nanos(&self.0) {
            return Err(TemporalError::range().with_enum(ErrorMessage::InstantOutOfRange));
        }
        Ok(())
    }

    /// Adds nanoseconds, failing when the result leaves the valid range.
    pub(crate) fn checked_add(&self, nanoseconds: i128) -> TemporalResult<Self> {
        let result = self
            .0
            .checked_add(nanoseconds)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::InstantOutOfRange))?;
        Self::try_from(result)
    }
}

/// Utility for determining if the nanos are within a valid range.
#[inline]
#[must_use]
pub(crate) fn is_valid_epoch_nanos(nanos: &i128) -> bool {
    (crate::NS_MIN_INSTANT..=crate::NS_MAX_INSTANT).contains(nanos)
}
