//! Argon2 password hasher (Argon2i and Argon2id variants).

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::Result;
use crate::config::ArgonPolicy;
use crate::error::HashError;
use crate::hasher::Hasher;
use crate::record::{HashAlgorithm, HashRecord};

/// Tracing target for Argon2 hashing operations.
const TRACING_TARGET_ARGON: &str = "passgate::hasher::argon";

/// Password hasher backed by the Argon2 primitive.
///
/// One type covers both variants: [`ArgonHasher::new`] binds Argon2i,
/// [`ArgonHasher::argon2id`] binds Argon2id. The variants share the same
/// policy shape and differ only in the algorithm identifier embedded in the
/// produced PHC string.
///
/// Policy validation and primitive construction happen once here; `make`
/// reuses the prepared instance and only draws a fresh salt per call.
#[derive(Debug, Clone)]
#[must_use]
pub struct ArgonHasher {
    algorithm: Algorithm,
    argon2: Argon2<'static>,
    policy: ArgonPolicy,
    verify: bool,
}

impl ArgonHasher {
    /// Creates an Argon2i hasher bound to the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidPolicy`] if the primitive rejects the
    /// policy's parameters.
    pub fn new(policy: ArgonPolicy) -> Result<Self> {
        Self::with_algorithm(Algorithm::Argon2i, policy)
    }

    /// Creates an Argon2id hasher bound to the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidPolicy`] if the primitive rejects the
    /// policy's parameters.
    pub fn argon2id(policy: ArgonPolicy) -> Result<Self> {
        Self::with_algorithm(Algorithm::Argon2id, policy)
    }

    fn with_algorithm(algorithm: Algorithm, policy: ArgonPolicy) -> Result<Self> {
        let argon2 = build_argon2(algorithm, policy)?;

        Ok(Self {
            algorithm,
            argon2,
            policy,
            verify: false,
        })
    }

    /// Enables or disables strict algorithm verification for [`check`].
    ///
    /// [`check`]: Hasher::check
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Cost policy this hasher enforces.
    #[must_use]
    pub fn policy(&self) -> ArgonPolicy {
        self.policy
    }

    /// Returns whether strict algorithm verification is enabled.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.verify
    }

    /// Hashes the plain value under a one-off policy.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidPolicy`] if the primitive rejects the
    /// policy and [`HashError::Hashing`] if hashing itself fails.
    pub fn make_with(&self, value: &str, policy: ArgonPolicy) -> Result<String> {
        if policy == self.policy {
            return self.hash_with(value, &self.argon2);
        }

        let argon2 = build_argon2(self.algorithm, policy)?;
        self.hash_with(value, &argon2)
    }

    /// Evaluates the rehash question against a one-off policy.
    pub fn needs_rehash_with(&self, hashed_value: &str, policy: ArgonPolicy) -> bool {
        let record = HashRecord::parse(hashed_value);
        if record.algorithm() != Hasher::algorithm(self) {
            return true;
        }

        match record.params().as_argon() {
            Some(params) => {
                // Any single weaker parameter triggers a rehash.
                params.memory < policy.memory
                    || params.time < policy.time
                    || params.threads < policy.threads
            }
            None => true,
        }
    }

    fn hash_with(&self, value: &str, argon2: &Argon2<'_>) -> Result<String> {
        // Cryptographically secure salt, fresh per call.
        let salt = SaltString::try_from_rng(&mut OsRng).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_ARGON,
                error = %e,
                "failed to generate cryptographically secure salt"
            );

            HashError::hashing_with_source("salt generation failed", e)
        })?;

        let hash = argon2.hash_password(value.as_bytes(), &salt).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_ARGON,
                error = %e,
                "argon2 hashing operation failed"
            );

            HashError::hashing_with_source("argon2 hashing failed", e)
        })?;

        Ok(hash.to_string())
    }
}

impl Hasher for ArgonHasher {
    fn algorithm(&self) -> HashAlgorithm {
        if self.algorithm == Algorithm::Argon2id {
            HashAlgorithm::Argon2id
        } else {
            HashAlgorithm::Argon2i
        }
    }

    fn make(&self, value: &str) -> Result<String> {
        self.hash_with(value, &self.argon2)
    }

    fn check(&self, value: &str, hashed_value: &str) -> Result<bool> {
        if hashed_value.is_empty() {
            return Ok(false);
        }

        if self.verify {
            let record = HashRecord::parse(hashed_value);
            if record.algorithm() != Hasher::algorithm(self) {
                tracing::warn!(
                    target: TRACING_TARGET_ARGON,
                    found = %record.algorithm(),
                    "strict verification refused a foreign hash"
                );

                return Err(HashError::mismatch(
                    Hasher::algorithm(self),
                    record.algorithm(),
                ));
            }
        }

        // Verification reads its parameters from the encoded hash itself;
        // malformed input fails closed.
        let Ok(parsed) = PasswordHash::new(hashed_value) else {
            return Ok(false);
        };

        Ok(self
            .argon2
            .verify_password(value.as_bytes(), &parsed)
            .is_ok())
    }

    fn needs_rehash(&self, hashed_value: &str) -> bool {
        self.needs_rehash_with(hashed_value, self.policy)
    }
}

fn build_argon2(algorithm: Algorithm, policy: ArgonPolicy) -> Result<Argon2<'static>> {
    policy.validate()?;

    let params = Params::new(policy.memory, policy.time, policy.threads, None).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET_ARGON,
            error = %e,
            "argon2 parameters rejected by the primitive"
        );

        HashError::invalid_policy_with_source("argon2 parameters rejected by the primitive", e)
    })?;

    Ok(Argon2::new(algorithm, Version::V0x13, params))
}
