use thiserror::Error;

use crate::ids::BlockId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid reference: {0}")]
    InvalidReference(BlockId),
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
    #[error("index out of bounds: {index} (len {len})")]
    BoundsError { index: usize, len: usize },
    #[error("protected block: {0}")]
    ProtectedBlock(BlockId),
    #[error("cycle detected moving {0}")]
    CycleDetected(BlockId),
    #[error("clipboard is empty")]
    EmptyClipboard,
    #[error("history boundary reached")]
    HistoryBoundary,
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result of a mutation on the interactive surface.
///
/// Mutations never fail loudly: invalid input leaves the document untouched and
/// reports why through [`Outcome::Unchanged`]. Hosts that want to surface the
/// failure can call [`Outcome::into_result`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Applied(T),
    Unchanged(Error),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Unchanged(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&Error> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Unchanged(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Applied(value) => Ok(value),
            Outcome::Unchanged(err) => Err(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(value) => Outcome::Applied(f(value)),
            Outcome::Unchanged(err) => Outcome::Unchanged(err),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(res: Result<T>) -> Self {
        match res {
            Ok(value) => Outcome::Applied(value),
            Err(err) => {
                log::debug!("mutation left document unchanged: {err}");
                Outcome::Unchanged(err)
            }
        }
    }
}
