use crate::validator::ThreatKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("Input of {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Potentially malicious content detected: {0}")]
    DangerousContent(ThreatKind),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SanitizeError>;
