use crate::parsing::TreeParseError;
use thiserror::Error;

/// Library-level error type for everything under [`crate::ted`].
///
/// Mirrors the teacher's `TreeParseError`/`DatasetParseError` pattern:
/// plain `#[error("...")]` variants, `#[from]` wrapping for the
/// parser's own error type.
#[derive(Error, Debug)]
pub enum TedError {
    #[error("input tree is invalid: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    ParseError(#[from] TreeParseError),

    #[error("cost model returned a negative or non-finite cost")]
    InvalidCostModel,

    #[error("computeEditMapping called before computeEditDistance")]
    PreconditionViolated,

    #[error("oracle input exceeds the configured node-count bound ({bound}): got {actual}")]
    ResourceExceeded { bound: usize, actual: usize },
}
