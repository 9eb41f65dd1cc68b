//! Error types for FIR driver operations

use thiserror::Error;

/// Result type alias for FIR driver operations
pub type Result<T> = std::result::Result<T, FirError>;

/// Errors that can occur while driving the FIR filter window
#[derive(Debug, Error)]
pub enum FirError {
    /// The register window could not be claimed or mapped
    #[error("Resource unavailable: {resource}: {reason}")]
    ResourceUnavailable {
        /// Resource that was requested (path or backend identifier)
        resource: String,
        /// Reason the claim failed
        reason: String,
    },

    /// Register offset outside the mapped window
    #[error("Register offset {offset} out of range (window is {limit} words)")]
    OutOfRange {
        /// Offset that was attempted
        offset: usize,
        /// Window length in register-words
        limit: usize,
    },

    /// User-supplied text did not parse as a decimal integer
    #[error("Invalid input format: {input:?}")]
    InvalidFormat {
        /// The text that failed to parse (post-truncation)
        input: String,
    },

    /// Formatted output did not fit the caller's buffer
    #[error("Output needs {needed} bytes but caller buffer holds {capacity}")]
    CopyFailed {
        /// Bytes required, including the trailing NUL
        needed: usize,
        /// Capacity the caller supplied
        capacity: usize,
    },

    /// A register value could not be rendered as text (defensive)
    #[error("Failed to format register value as text")]
    FormatError,

    /// Register access after detach, or a second detach
    #[error("Register window already detached")]
    Detached,
}

impl FirError {
    /// Create a resource unavailable error
    pub fn resource_unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid format error
    pub fn invalid_format(input: impl Into<String>) -> Self {
        Self::InvalidFormat {
            input: input.into(),
        }
    }
}
