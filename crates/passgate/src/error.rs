//! Hashing error types.

use thiserror::Error;

use crate::manager::HashDriver;
use crate::record::HashAlgorithm;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for hashing operations.
pub type Result<T> = std::result::Result<T, HashError>;

/// Errors produced by hashers and the hash manager.
///
/// Malformed or empty stored hashes are deliberately *not* represented here:
/// `check` fails closed to `false` for those, and the record parser never
/// fails at all. Errors are reserved for misconfiguration and for failures of
/// the underlying primitive.
#[derive(Debug, Error)]
pub enum HashError {
    /// The requested driver is not compiled into this build.
    ///
    /// Surfaced at resolution time and never silently downgraded to a
    /// different algorithm.
    #[error("hashing driver `{driver}` is not available in this build")]
    AlgorithmUnavailable {
        /// Driver that could not be resolved.
        driver: HashDriver,
    },

    /// A hash produced by one algorithm was checked under a hasher bound to
    /// another while strict verification was enabled.
    ///
    /// This signals configuration drift rather than a failed credential,
    /// which is why it is an error instead of a `false` verification result.
    #[error("hashed value uses `{found}`, hasher expects `{expected}`")]
    AlgorithmMismatch {
        /// Algorithm the hasher is bound to.
        expected: HashAlgorithm,
        /// Algorithm recovered from the hashed value.
        found: HashAlgorithm,
    },

    /// Policy parameters were rejected, either at hasher construction or on
    /// a per-call override.
    #[error("invalid hashing policy: {message}")]
    InvalidPolicy {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// The underlying primitive failed while deriving a hash.
    #[error("password hashing failed: {message}")]
    Hashing {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },
}

impl HashError {
    /// Creates a new unavailable-driver error.
    pub fn unavailable(driver: HashDriver) -> Self {
        Self::AlgorithmUnavailable { driver }
    }

    /// Creates a new algorithm mismatch error.
    pub fn mismatch(expected: HashAlgorithm, found: HashAlgorithm) -> Self {
        Self::AlgorithmMismatch { expected, found }
    }

    /// Creates a new invalid policy error.
    pub fn invalid_policy(message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new invalid policy error with source.
    pub fn invalid_policy_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidPolicy {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new hashing failure error.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new hashing failure error with source.
    pub fn hashing_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Hashing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns whether this is an algorithm mismatch error.
    pub fn is_algorithm_mismatch(&self) -> bool {
        matches!(self, Self::AlgorithmMismatch { .. })
    }

    /// Returns whether this is an unavailable-driver error.
    pub fn is_algorithm_unavailable(&self) -> bool {
        matches!(self, Self::AlgorithmUnavailable { .. })
    }
}
