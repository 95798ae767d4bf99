//! Hashing policies and resolved configuration.
//!
//! Policies are the per-algorithm cost targets a hasher enforces; they are
//! immutable for the lifetime of a hasher instance. [`HashConfig`] is the
//! resolved configuration consumed by [`HashManager`]; loading it from files
//! or the environment is the caller's concern.
//!
//! [`HashManager`]: crate::HashManager

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::HashError;
use crate::manager::HashDriver;

// Cost range accepted by the bcrypt primitive.
const MIN_BCRYPT_ROUNDS: u32 = 4;
const MAX_BCRYPT_ROUNDS: u32 = 31;

/// Target cost configuration for the bcrypt hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
#[must_use]
pub struct BcryptPolicy {
    /// log2 of the number of hashing rounds (4-31).
    #[cfg_attr(
        feature = "config",
        arg(long = "bcrypt-rounds", env = "BCRYPT_ROUNDS", default_value = "12")
    )]
    pub rounds: u32,
}

impl Default for BcryptPolicy {
    fn default() -> Self {
        Self { rounds: 12 }
    }
}

impl BcryptPolicy {
    /// Creates a policy with the given number of rounds.
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    /// Sets the number of hashing rounds.
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Checks the policy against the range the primitive accepts.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidPolicy`] if `rounds` falls outside 4-31.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BCRYPT_ROUNDS..=MAX_BCRYPT_ROUNDS).contains(&self.rounds) {
            return Err(HashError::invalid_policy(format!(
                "bcrypt rounds must be between {MIN_BCRYPT_ROUNDS} and {MAX_BCRYPT_ROUNDS}, got {}",
                self.rounds
            )));
        }

        Ok(())
    }
}

/// Target cost configuration for the Argon2 hashers.
///
/// Shared by the `argon` (Argon2i) and `argon2id` drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
#[must_use]
pub struct ArgonPolicy {
    /// Memory cost in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long = "argon-memory", env = "ARGON_MEMORY", default_value = "1024")
    )]
    pub memory: u32,

    /// Number of iterations.
    #[cfg_attr(
        feature = "config",
        arg(long = "argon-time", env = "ARGON_TIME", default_value = "2")
    )]
    pub time: u32,

    /// Degree of parallelism.
    #[cfg_attr(
        feature = "config",
        arg(long = "argon-threads", env = "ARGON_THREADS", default_value = "2")
    )]
    pub threads: u32,
}

impl Default for ArgonPolicy {
    fn default() -> Self {
        Self {
            memory: 1024,
            time: 2,
            threads: 2,
        }
    }
}

impl ArgonPolicy {
    /// Creates a policy with the given memory (KiB), time, and parallelism
    /// costs.
    pub fn new(memory: u32, time: u32, threads: u32) -> Self {
        Self {
            memory,
            time,
            threads,
        }
    }

    /// Sets the memory cost in KiB.
    pub fn with_memory(mut self, memory: u32) -> Self {
        self.memory = memory;
        self
    }

    /// Sets the number of iterations.
    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    /// Sets the degree of parallelism.
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Checks the policy for values the primitive rejects outright.
    ///
    /// The primitive enforces its own finer-grained bounds when the hasher
    /// is constructed; this only catches the configurations that can never
    /// be valid.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidPolicy`] if any cost is zero.
    pub fn validate(&self) -> Result<()> {
        if self.memory == 0 || self.time == 0 || self.threads == 0 {
            return Err(HashError::invalid_policy(format!(
                "argon2 memory, time, and threads must be non-zero, got m={}, t={}, p={}",
                self.memory, self.time, self.threads
            )));
        }

        Ok(())
    }
}

/// Resolved hashing configuration consumed by [`HashManager`].
///
/// Mirrors the configuration surface `{driver, bcrypt.rounds, argon.memory,
/// argon.time, argon.threads, verify}`. Immutable once handed to a manager.
///
/// [`HashManager`]: crate::HashManager
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
#[must_use = "hashing configurations must be used to construct a manager"]
pub struct HashConfig {
    /// Driver used when no explicit driver is requested.
    #[cfg_attr(
        feature = "config",
        arg(long = "hash-driver", env = "HASH_DRIVER", default_value = "bcrypt")
    )]
    pub driver: HashDriver,

    /// bcrypt cost target.
    #[cfg_attr(feature = "config", command(flatten))]
    pub bcrypt: BcryptPolicy,

    /// Argon2 cost target (both `argon` and `argon2id` drivers).
    #[cfg_attr(feature = "config", command(flatten))]
    pub argon: ArgonPolicy,

    /// Strict verification: fail loudly when a hash produced by a different
    /// algorithm is checked, instead of returning `false`.
    #[cfg_attr(feature = "config", arg(long = "hash-verify", env = "HASH_VERIFY"))]
    pub verify: bool,
}

impl HashConfig {
    /// Creates a configuration with default policies for the given driver.
    pub fn new(driver: HashDriver) -> Self {
        Self {
            driver,
            ..Self::default()
        }
    }

    /// Sets the default driver.
    pub fn with_driver(mut self, driver: HashDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Sets the bcrypt cost target.
    pub fn with_bcrypt(mut self, bcrypt: BcryptPolicy) -> Self {
        self.bcrypt = bcrypt;
        self
    }

    /// Sets the Argon2 cost target.
    pub fn with_argon(mut self, argon: ArgonPolicy) -> Self {
        self.argon = argon;
        self
    }

    /// Enables or disables strict verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policies_match_documented_targets() {
        let config = HashConfig::default();

        assert_eq!(config.driver, HashDriver::Bcrypt);
        assert_eq!(config.bcrypt.rounds, 12);
        assert_eq!(config.argon.memory, 1024);
        assert_eq!(config.argon.time, 2);
        assert_eq!(config.argon.threads, 2);
        assert!(!config.verify);
    }

    #[test]
    fn bcrypt_policy_rejects_out_of_range_rounds() {
        assert!(BcryptPolicy::new(3).validate().is_err());
        assert!(BcryptPolicy::new(32).validate().is_err());
        assert!(BcryptPolicy::new(4).validate().is_ok());
        assert!(BcryptPolicy::new(31).validate().is_ok());
    }

    #[test]
    fn argon_policy_rejects_zero_costs() {
        assert!(ArgonPolicy::new(0, 2, 2).validate().is_err());
        assert!(ArgonPolicy::new(1024, 0, 2).validate().is_err());
        assert!(ArgonPolicy::new(1024, 2, 0).validate().is_err());
        assert!(ArgonPolicy::default().validate().is_ok());
    }

    #[test]
    fn deserializes_from_partial_document() -> anyhow::Result<()> {
        let config: HashConfig = serde_json::from_str(
            r#"{"driver": "argon2id", "argon": {"memory": 65536, "time": 4}, "verify": true}"#,
        )?;

        assert_eq!(config.driver, HashDriver::Argon2id);
        assert_eq!(config.argon.memory, 65536);
        assert_eq!(config.argon.time, 4);
        // Unspecified fields keep their defaults.
        assert_eq!(config.argon.threads, 2);
        assert_eq!(config.bcrypt.rounds, 12);
        assert!(config.verify);

        Ok(())
    }

    #[test]
    fn deserializes_empty_document_to_defaults() -> anyhow::Result<()> {
        let config: HashConfig = serde_json::from_str("{}")?;

        assert_eq!(config, HashConfig::default());

        Ok(())
    }
}
