//! Placement error taxonomy.

use thiserror::Error;

/// Errors raised while placing or measuring content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The tracking subsystem cannot resolve a pose or anchor right now.
    #[error("tracking unavailable: {0}")]
    TrackingUnavailable(String),
    /// The object's collision shape cannot be measured as a box.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}

impl PlacementError {
    /// Transient errors clear up on their own once tracking recovers.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlacementError::TrackingUnavailable(_))
    }
}
