use thiserror::Error;

/// Error taxonomy for the stage.
///
/// `Config` is fatal to activation and is surfaced before any record is
/// processed. Every other variant is recovered at the stage boundary by
/// routing the record, content unchanged, to the failure outcome.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Invalid stage configuration: {0}")]
    Config(String),

    #[error("Failed to reach the text generation API: {0}")]
    Transport(String),

    #[error("Text generation API rejected the request: {0}")]
    Rejection(String),

    #[error("Malformed text generation response: {0}")]
    Malformed(String),

    #[error("Record processing failed: {0}")]
    Internal(String),
}

impl StageError {
    /// Stable label used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transport(_) => "transport",
            Self::Rejection(_) => "rejection",
            Self::Malformed(_) => "malformed",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for StageError {
    fn from(error: reqwest::Error) -> Self {
        StageError::Transport(error.to_string())
    }
}

// Serialization failures while building the outbound payload are structural
// processing errors, not transport or response problems.
impl From<serde_json::Error> for StageError {
    fn from(error: serde_json::Error) -> Self {
        StageError::Internal(error.to_string())
    }
}
