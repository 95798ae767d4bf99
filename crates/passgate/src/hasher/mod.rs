//! Per-algorithm password hashers.
//!
//! Each hasher binds one algorithm backend to one immutable cost policy and
//! an optional strict-verification mode. Hashers are cheap to clone, hold no
//! mutable state, and are safe to share across threads.

#[cfg(feature = "argon2")]
mod argon;
#[cfg(feature = "bcrypt")]
mod bcrypt;

#[cfg(feature = "argon2")]
#[cfg_attr(docsrs, doc(cfg(feature = "argon2")))]
pub use argon::ArgonHasher;
#[cfg(feature = "bcrypt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bcrypt")))]
pub use bcrypt::BcryptHasher;

use crate::Result;
use crate::record::{HashAlgorithm, HashRecord};

// At least one algorithm backend must be compiled in.
#[cfg(not(any(feature = "bcrypt", feature = "argon2")))]
compile_error!("at least one of the `bcrypt` or `argon2` features must be enabled");

/// Capability contract shared by every password hasher.
///
/// Every implementation answers the rehash question explicitly; there is no
/// optional capability probing. All operations are synchronous and, apart
/// from the CPU cost of `make` and `check`, non-blocking.
pub trait Hasher: Send + Sync {
    /// Algorithm this hasher produces and verifies.
    fn algorithm(&self) -> HashAlgorithm;

    /// Structural information about the given hashed value.
    ///
    /// Never fails; unrecognized input yields an [`HashAlgorithm::Unknown`]
    /// record.
    fn info(&self, hashed_value: &str) -> HashRecord {
        HashRecord::parse(hashed_value)
    }

    /// Hashes the given plain value under the instance policy.
    ///
    /// A fresh cryptographically secure salt is drawn on every call; hashing
    /// the same value twice never yields the same string.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Hashing`] if the underlying primitive fails.
    ///
    /// [`HashError::Hashing`]: crate::HashError::Hashing
    fn make(&self, value: &str) -> Result<String>;

    /// Checks the given plain value against a stored hash.
    ///
    /// An empty `hashed_value` returns `Ok(false)` without invoking the
    /// primitive: "no credential" trivially does not match. Malformed stored
    /// hashes fail closed to `Ok(false)` as well.
    ///
    /// # Errors
    ///
    /// With strict verification enabled, a hash produced by a different
    /// algorithm (or an unrecognized string) fails with
    /// [`HashError::AlgorithmMismatch`] instead of returning `Ok(false)`.
    ///
    /// [`HashError::AlgorithmMismatch`]: crate::HashError::AlgorithmMismatch
    fn check(&self, value: &str, hashed_value: &str) -> Result<bool>;

    /// Returns whether the stored hash should be recomputed.
    ///
    /// True when any embedded cost parameter is strictly weaker than the
    /// instance policy, and always true for hashes of a different algorithm
    /// or unrecognized strings. Pure comparison; no cryptography.
    fn needs_rehash(&self, hashed_value: &str) -> bool;

    /// Returns whether the stored hash is recognized and at least as strong
    /// as the instance policy.
    ///
    /// Unlike the negation of [`needs_rehash`], this is `false` for any
    /// unrecognized string: comparing parameters on an unknown record is
    /// meaningless.
    ///
    /// [`needs_rehash`]: Hasher::needs_rehash
    fn is_acceptable(&self, hashed_value: &str) -> bool {
        self.info(hashed_value).is_known() && !self.needs_rehash(hashed_value)
    }
}
