//! bcrypt password hasher.

use bcrypt::Version;

use crate::Result;
use crate::config::BcryptPolicy;
use crate::error::HashError;
use crate::hasher::Hasher;
use crate::record::{HashAlgorithm, HashRecord};

/// Tracing target for bcrypt hashing operations.
const TRACING_TARGET_BCRYPT: &str = "passgate::hasher::bcrypt";

/// Password hasher backed by the bcrypt primitive.
///
/// Produces `$2y$` encoded hashes and verifies stored bcrypt hashes with a
/// timing-safe comparison. The cost policy is fixed at construction;
/// per-call overrides take a one-off policy copy instead of mutating the
/// instance.
#[derive(Debug, Clone)]
#[must_use]
pub struct BcryptHasher {
    policy: BcryptPolicy,
    verify: bool,
}

impl BcryptHasher {
    /// Creates a bcrypt hasher bound to the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidPolicy`] if the policy's rounds fall
    /// outside the range the primitive accepts.
    pub fn new(policy: BcryptPolicy) -> Result<Self> {
        policy.validate()?;

        Ok(Self {
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
    pub fn policy(&self) -> BcryptPolicy {
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
    /// Returns [`HashError::InvalidPolicy`] for an out-of-range policy and
    /// [`HashError::Hashing`] if the primitive fails.
    pub fn make_with(&self, value: &str, policy: BcryptPolicy) -> Result<String> {
        policy.validate()?;

        let parts = bcrypt::hash_with_result(value, policy.rounds).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_BCRYPT,
                error = %e,
                "bcrypt hashing operation failed"
            );

            HashError::hashing_with_source("bcrypt hashing failed", e)
        })?;

        Ok(parts.format_for_version(Version::TwoY))
    }

    /// Evaluates the rehash question against a one-off policy.
    pub fn needs_rehash_with(&self, hashed_value: &str, policy: BcryptPolicy) -> bool {
        match HashRecord::parse(hashed_value).params().as_bcrypt() {
            Some(params) => params.cost < policy.rounds,
            // Foreign or unrecognized hashes always need rehashing.
            None => true,
        }
    }
}

impl Hasher for BcryptHasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Bcrypt
    }

    fn make(&self, value: &str) -> Result<String> {
        self.make_with(value, self.policy)
    }

    fn check(&self, value: &str, hashed_value: &str) -> Result<bool> {
        if hashed_value.is_empty() {
            return Ok(false);
        }

        if self.verify {
            let record = HashRecord::parse(hashed_value);
            if record.algorithm() != HashAlgorithm::Bcrypt {
                tracing::warn!(
                    target: TRACING_TARGET_BCRYPT,
                    found = %record.algorithm(),
                    "strict verification refused a foreign hash"
                );

                return Err(HashError::mismatch(
                    HashAlgorithm::Bcrypt,
                    record.algorithm(),
                ));
            }
        }

        // Malformed stored hashes fail closed instead of surfacing an error.
        Ok(bcrypt::verify(value, hashed_value).unwrap_or(false))
    }

    fn needs_rehash(&self, hashed_value: &str) -> bool {
        self.needs_rehash_with(hashed_value, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HashParams;

    const ARGON2I_HASH: &str =
        "$argon2i$v=19$m=65536,t=4,p=1$eE4vbkhJTm54M0k4OU1LTw$C9JCrLeNkNHI1jWx3pBqpK2bTgFrtcVcIfARjCN0218";

    fn hasher() -> BcryptHasher {
        // Low cost keeps the test suite fast.
        BcryptHasher::new(BcryptPolicy::new(4)).unwrap()
    }

    #[test]
    fn make_and_check_round_trip() -> anyhow::Result<()> {
        let hasher = hasher();
        let hash = hasher.make("password")?;

        assert_ne!(hash, "password");
        assert!(hasher.check("password", &hash)?);
        assert!(!hasher.check("wrong_password", &hash)?);

        Ok(())
    }

    #[test]
    fn make_emits_two_y_encoding_with_padded_cost() -> anyhow::Result<()> {
        let hash = hasher().make("password")?;

        assert!(hash.starts_with("$2y$04$"));
        assert_eq!(hash.len(), 60);

        Ok(())
    }

    #[test]
    fn make_accepts_empty_secret() -> anyhow::Result<()> {
        let hasher = hasher();
        let hash = hasher.make("")?;

        assert!(hasher.check("", &hash)?);
        assert!(!hasher.check("not_empty", &hash)?);

        Ok(())
    }

    #[test]
    fn make_draws_a_fresh_salt_per_call() -> anyhow::Result<()> {
        let hasher = hasher();

        let first = hasher.make("password")?;
        let second = hasher.make("password")?;

        assert_ne!(first, second);
        assert!(hasher.check("password", &first)?);
        assert!(hasher.check("password", &second)?);

        Ok(())
    }

    #[test]
    fn empty_hashed_value_returns_false() -> anyhow::Result<()> {
        assert!(!hasher().check("password", "")?);

        Ok(())
    }

    #[test]
    fn malformed_hashed_value_fails_closed() -> anyhow::Result<()> {
        let hasher = hasher();

        assert!(!hasher.check("password", "not a hash")?);
        assert!(!hasher.check("password", "$2y$04$tooshort")?);

        Ok(())
    }

    #[test]
    fn round_trip_embeds_policy_cost() -> anyhow::Result<()> {
        let hash = hasher().make("password")?;
        let record = HashRecord::parse(&hash);

        assert_eq!(record.algorithm(), HashAlgorithm::Bcrypt);
        assert_eq!(
            record.params(),
            HashParams::Bcrypt(crate::record::BcryptParams { cost: 4 })
        );

        Ok(())
    }

    #[test]
    fn needs_rehash_only_for_weaker_cost() -> anyhow::Result<()> {
        let hasher = hasher();
        let hash = hasher.make("password")?;

        assert!(!hasher.needs_rehash(&hash));
        // A weaker target than the embedded cost does not trigger a rehash.
        assert!(!hasher.needs_rehash_with(&hash, BcryptPolicy::new(1)));
        // A stronger target does.
        assert!(hasher.needs_rehash_with(&hash, BcryptPolicy::new(31)));

        Ok(())
    }

    #[test]
    fn default_cost_scenario() -> anyhow::Result<()> {
        let hasher = BcryptHasher::new(BcryptPolicy::default())?;
        let hash = hasher.make("password")?;

        let record = HashRecord::parse(&hash);
        assert_eq!(record.algorithm().to_string(), "bcrypt");
        assert!(record.params().as_bcrypt().unwrap().cost >= 12);

        // The rehash comparison is pure; targets are not range-checked.
        assert!(!hasher.needs_rehash_with(&hash, BcryptPolicy::new(1)));
        assert!(hasher.needs_rehash_with(&hash, BcryptPolicy::new(99)));

        Ok(())
    }

    #[test]
    fn needs_rehash_for_foreign_hash() {
        let hasher = hasher();

        assert!(hasher.needs_rehash(ARGON2I_HASH));
        assert!(hasher.needs_rehash("password"));
    }

    #[test]
    fn is_acceptable_rejects_plaintext_and_foreign_hashes() -> anyhow::Result<()> {
        let hasher = hasher();
        let hash = hasher.make("password")?;

        assert!(hasher.is_acceptable(&hash));
        // A stronger embedded cost remains acceptable.
        assert!(
            hasher.is_acceptable("$2y$17$1iPpw8cxiw6.ijzD2Ry1mOvBMM2kPu6wayaIXWLMG5fhFX5ejCEa6")
        );
        assert!(!hasher.is_acceptable("password"));
        assert!(!hasher.is_acceptable(ARGON2I_HASH));
        assert!(!hasher.is_acceptable(""));

        Ok(())
    }

    #[test]
    fn strict_mode_rejects_foreign_hash() {
        let hasher = hasher().with_verify(true);

        let err = hasher.check("password", ARGON2I_HASH).unwrap_err();
        assert!(err.is_algorithm_mismatch());

        // Unrecognized input is a mismatch as well, not a negative match.
        let err = hasher.check("password", "plaintext").unwrap_err();
        assert!(err.is_algorithm_mismatch());
    }

    #[test]
    fn strict_mode_still_short_circuits_empty_input() -> anyhow::Result<()> {
        let hasher = hasher().with_verify(true);

        assert!(!hasher.check("password", "")?);

        Ok(())
    }

    #[test]
    fn non_strict_mode_returns_false_for_foreign_hash() -> anyhow::Result<()> {
        assert!(!hasher().check("password", ARGON2I_HASH)?);

        Ok(())
    }

    #[test]
    fn out_of_range_rounds_are_rejected() {
        assert!(BcryptHasher::new(BcryptPolicy::new(3)).is_err());
        assert!(BcryptHasher::new(BcryptPolicy::new(32)).is_err());

        let hasher = hasher();
        assert!(hasher.make_with("password", BcryptPolicy::new(0)).is_err());
    }
}
