//! Driver selection and memoized hasher construction.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::Result;
use crate::config::HashConfig;
use crate::error::HashError;
#[cfg(feature = "argon2")]
use crate::hasher::ArgonHasher;
#[cfg(feature = "bcrypt")]
use crate::hasher::BcryptHasher;
use crate::hasher::Hasher;
use crate::record::{HashAlgorithm, HashRecord};

/// Tracing target for hash manager operations.
const TRACING_TARGET_MANAGER: &str = "passgate::manager";

/// Named hashing driver selectable from configuration.
///
/// A closed set: driver dispatch is resolved once per process, not
/// re-negotiated per call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HashDriver {
    /// bcrypt hasher.
    #[default]
    Bcrypt,
    /// Argon2i hasher.
    Argon,
    /// Argon2id hasher.
    Argon2id,
}

impl HashDriver {
    /// Algorithm family the driver produces.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            HashDriver::Bcrypt => HashAlgorithm::Bcrypt,
            HashDriver::Argon => HashAlgorithm::Argon2i,
            HashDriver::Argon2id => HashAlgorithm::Argon2id,
        }
    }
}

/// Resolves hashers by driver name and memoizes one instance per driver.
///
/// Construction of a hasher validates its policy and prepares the primitive,
/// so it happens at most once per driver for the lifetime of the manager.
/// The manager itself is immutable after construction and safe to share
/// across threads without locking.
#[derive(Debug, Default)]
pub struct HashManager {
    config: HashConfig,
    #[cfg(feature = "bcrypt")]
    bcrypt: OnceLock<BcryptHasher>,
    #[cfg(feature = "argon2")]
    argon: OnceLock<ArgonHasher>,
    #[cfg(feature = "argon2")]
    argon2id: OnceLock<ArgonHasher>,
}

impl HashManager {
    /// Creates a manager from resolved configuration.
    ///
    /// Hasher construction is deferred to the first [`resolve`] per driver.
    ///
    /// [`resolve`]: HashManager::resolve
    pub fn new(config: HashConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration this manager was constructed with.
    #[must_use]
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Returns the hasher for the configured default driver.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`resolve`].
    ///
    /// [`resolve`]: HashManager::resolve
    pub fn hasher(&self) -> Result<&dyn Hasher> {
        self.resolve(self.config.driver)
    }

    /// Returns the hasher for the given driver, constructing it on first
    /// use.
    ///
    /// Concurrent first access may race to construct a candidate, but every
    /// caller observes the same memoized instance afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::AlgorithmUnavailable`] if the driver's backend
    /// is compiled out and [`HashError::InvalidPolicy`] if the configured
    /// policy is rejected. Neither failure is retried with a different
    /// algorithm.
    pub fn resolve(&self, driver: HashDriver) -> Result<&dyn Hasher> {
        match driver {
            #[cfg(feature = "bcrypt")]
            HashDriver::Bcrypt => {
                if let Some(hasher) = self.bcrypt.get() {
                    return Ok(hasher);
                }

                let hasher =
                    BcryptHasher::new(self.config.bcrypt)?.with_verify(self.config.verify);
                tracing::debug!(
                    target: TRACING_TARGET_MANAGER,
                    driver = %driver,
                    "constructed hasher"
                );

                Ok(self.bcrypt.get_or_init(|| hasher))
            }

            #[cfg(feature = "argon2")]
            HashDriver::Argon => {
                if let Some(hasher) = self.argon.get() {
                    return Ok(hasher);
                }

                let hasher = ArgonHasher::new(self.config.argon)?.with_verify(self.config.verify);
                tracing::debug!(
                    target: TRACING_TARGET_MANAGER,
                    driver = %driver,
                    "constructed hasher"
                );

                Ok(self.argon.get_or_init(|| hasher))
            }

            #[cfg(feature = "argon2")]
            HashDriver::Argon2id => {
                if let Some(hasher) = self.argon2id.get() {
                    return Ok(hasher);
                }

                let hasher =
                    ArgonHasher::argon2id(self.config.argon)?.with_verify(self.config.verify);
                tracing::debug!(
                    target: TRACING_TARGET_MANAGER,
                    driver = %driver,
                    "constructed hasher"
                );

                Ok(self.argon2id.get_or_init(|| hasher))
            }

            #[allow(unreachable_patterns)]
            _ => {
                tracing::error!(
                    target: TRACING_TARGET_MANAGER,
                    driver = %driver,
                    "requested driver is not compiled into this build"
                );

                Err(HashError::unavailable(driver))
            }
        }
    }

    /// Returns whether the given string is recognized as a hash of any
    /// supported algorithm.
    ///
    /// Purely structural sniffing; no cryptography and no driver
    /// resolution.
    #[must_use]
    pub fn is_hashed(&self, value: &str) -> bool {
        HashRecord::parse(value).is_known()
    }

    /// Structural information about the given hashed value, for
    /// diagnostics.
    #[must_use]
    pub fn info(&self, hashed_value: &str) -> HashRecord {
        HashRecord::parse(hashed_value)
    }

    /// Hashes with the default driver. See [`Hasher::make`].
    ///
    /// # Errors
    ///
    /// Propagates resolution and hashing errors.
    pub fn make(&self, value: &str) -> Result<String> {
        self.hasher()?.make(value)
    }

    /// Checks with the default driver. See [`Hasher::check`].
    ///
    /// # Errors
    ///
    /// Propagates resolution errors and, in strict mode, algorithm
    /// mismatches.
    pub fn check(&self, value: &str, hashed_value: &str) -> Result<bool> {
        self.hasher()?.check(value, hashed_value)
    }

    /// Evaluates the rehash question with the default driver. See
    /// [`Hasher::needs_rehash`].
    ///
    /// # Errors
    ///
    /// Propagates resolution errors.
    pub fn needs_rehash(&self, hashed_value: &str) -> Result<bool> {
        Ok(self.hasher()?.needs_rehash(hashed_value))
    }

    /// Evaluates acceptability with the default driver. See
    /// [`Hasher::is_acceptable`].
    ///
    /// # Errors
    ///
    /// Propagates resolution errors.
    pub fn is_acceptable(&self, hashed_value: &str) -> Result<bool> {
        Ok(self.hasher()?.is_acceptable(hashed_value))
    }
}
