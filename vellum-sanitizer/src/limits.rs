//! Input size limits.

use crate::error::{Result, SanitizeError};
use serde::{Deserialize, Serialize};
use vellum_log::warn;

/// What to do with input over the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    /// Fail `try_sanitize`; `sanitize` yields an empty string
    #[default]
    Reject,
    /// Cut the input at the last char boundary within the limit
    Truncate,
}

/// Upper bound on the bytes a sanitizer will look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimit {
    pub max_bytes: usize,
    #[serde(default)]
    pub on_oversize: OversizePolicy,
}

impl InputLimit {
    pub fn reject_above(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            on_oversize: OversizePolicy::Reject,
        }
    }

    pub fn truncate_above(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            on_oversize: OversizePolicy::Truncate,
        }
    }

    /// Input as far as the limit allows.
    pub fn apply<'a>(&self, input: &'a str) -> Result<&'a str> {
        if input.len() <= self.max_bytes {
            return Ok(input);
        }

        match self.on_oversize {
            OversizePolicy::Reject => {
                warn!(
                    target: crate::LOG_TARGET,
                    "rejecting {} byte input, limit is {}", input.len(), self.max_bytes
                );
                Err(SanitizeError::InputTooLarge {
                    size: input.len(),
                    limit: self.max_bytes,
                })
            }
            OversizePolicy::Truncate => {
                let mut end = self.max_bytes;
                while !input.is_char_boundary(end) {
                    end -= 1;
                }
                warn!(
                    target: crate::LOG_TARGET,
                    "truncating {} byte input to {} bytes", input.len(), end
                );
                Ok(&input[..end])
            }
        }
    }
}
