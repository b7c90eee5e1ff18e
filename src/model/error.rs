use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a series could not yield a point estimate. Always recoverable: the variable
/// is marked unavailable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsufficientDataError {
    #[error("Series has {found} valid points, at least 2 are required")]
    TooFewPoints { found: usize },

    #[error("Model fit did not converge to a unique solution")]
    SingularSystem,

    #[error("Model output has no row for {0}")]
    NoPredictionAt(DateTime<Utc>),

    #[error("Model produced a non-finite estimate for {0}")]
    NonFiniteEstimate(DateTime<Utc>),
}
