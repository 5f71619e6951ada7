// Error type shared by the storage, review and export layers
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::path::PathBuf;
use thiserror::Error;

/// `Result` alias used throughout `s3review`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reviewing buckets.
#[derive(Debug, Error)]
pub enum Error {
    /// The credentials file is missing, unreadable or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// A size unit label that isn't one of the known tiers.
    #[error("invalid size unit '{0}', expected one of: byte, kb, mb, gb, tb")]
    InvalidUnit(String),

    /// Lookup of a bucket name that the registry doesn't hold.
    #[error("bucket '{0}' not found")]
    BucketNotFound(String),

    /// The provider rejected our identity or permissions.
    #[error("{operation} failed, access denied: {message}")]
    Auth {
        /// Provider operation that failed.
        operation: &'static str,
        /// Underlying cause reported by the provider.
        message:   String,
    },

    /// The provider asked us to slow down or was temporarily unavailable.
    #[error("{operation} failed, request throttled: {message}")]
    Throttled {
        /// Provider operation that failed.
        operation: &'static str,
        /// Underlying cause reported by the provider.
        message:   String,
    },

    /// The request never got a response (timeout, connection failure).
    #[error("{operation} failed, network error: {message}")]
    Network {
        /// Provider operation that failed.
        operation: &'static str,
        /// Underlying cause reported by the SDK.
        message:   String,
    },

    /// Any other provider failure.
    #[error("{operation} failed: {message}")]
    Provider {
        /// Provider operation that failed.
        operation: &'static str,
        /// Underlying cause reported by the provider.
        message:   String,
    },

    /// Table export target couldn't be written.
    #[error("failed to write '{}': {message}", .path.display())]
    Export {
        /// Destination that was being written.
        path:    PathBuf,
        /// Underlying cause.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if repeating the failed operation later may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::Network { .. })
    }

    /// Process exit code reported for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidUnit(_)        => 2,
            Self::Network { .. } | Self::Throttled { .. } => 3,
            Self::Auth { .. }                             => 4,
            Self::BucketNotFound(_)                       => 5,
            _                                             => 1,
        }
    }
}
