use thiserror::Error;

/// Driver-level faults raised while talking to a document.
///
/// These never escape a field fill: the dispatcher folds them into a
/// [`FailureReason`](crate::field::FailureReason) on the outcome.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element is no longer attached to the document")]
    StaleElement,

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether the fault is a host re-render invalidating a node reference.
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleElement)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
