//! Structural hash-string introspection.
//!
//! This module recovers the algorithm identifier and embedded cost parameters
//! from a stored hash string without invoking any cryptography. Parsing never
//! fails: anything that is not byte-for-byte one of the recognized encodings
//! yields an [`HashAlgorithm::Unknown`] record with empty parameters.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Length of the bcrypt payload after the cost segment: 22-char salt
/// followed by a 31-char digest.
const BCRYPT_BODY_LEN: usize = 53;

/// Identifier of the algorithm family a stored hash was produced with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// bcrypt, `$2y$` encoding.
    Bcrypt,
    /// Argon2i, `$argon2i$` PHC encoding.
    Argon2i,
    /// Argon2id, `$argon2id$` PHC encoding.
    Argon2id,
    /// Unrecognized or structurally invalid hash string.
    #[default]
    Unknown,
}

impl HashAlgorithm {
    /// Returns whether this is a recognized algorithm.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns whether this is one of the Argon2 variants.
    #[must_use]
    pub fn is_argon2(&self) -> bool {
        matches!(self, Self::Argon2i | Self::Argon2id)
    }
}

/// Cost parameters embedded in a bcrypt hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BcryptParams {
    /// log2 of the number of rounds.
    pub cost: u32,
}

/// Cost parameters embedded in an Argon2 hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgonParams {
    /// Argon2 version tag (`v=`); 19 for the current revision.
    pub version: u32,
    /// Memory cost in KiB (`m=`).
    pub memory: u32,
    /// Number of iterations (`t=`).
    pub time: u32,
    /// Degree of parallelism (`p=`).
    pub threads: u32,
}

/// Parameter set recovered from a hash string.
///
/// [`HashParams::Empty`] exactly when the algorithm is
/// [`HashAlgorithm::Unknown`]; comparing parameters on an unrecognized
/// record is meaningless and the parser never produces a partial set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HashParams {
    /// Parameters of a bcrypt hash.
    Bcrypt(BcryptParams),
    /// Parameters of an Argon2i or Argon2id hash.
    Argon(ArgonParams),
    /// No parameters; the hash string was not recognized.
    #[default]
    Empty,
}

impl HashParams {
    /// Returns whether no parameters were recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the bcrypt parameters, if this is a bcrypt set.
    #[must_use]
    pub fn as_bcrypt(&self) -> Option<BcryptParams> {
        match self {
            Self::Bcrypt(params) => Some(*params),
            _ => None,
        }
    }

    /// Returns the Argon2 parameters, if this is an Argon2 set.
    #[must_use]
    pub fn as_argon(&self) -> Option<ArgonParams> {
        match self {
            Self::Argon(params) => Some(*params),
            _ => None,
        }
    }
}

/// Structural information about a stored hash value.
///
/// Records are produced exclusively by [`HashRecord::parse`] and are
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashRecord {
    algorithm: HashAlgorithm,
    params: HashParams,
    raw: String,
}

impl HashRecord {
    /// Parses a stored hash string into its structural record.
    ///
    /// Pure and infallible: unrecognized input (foreign prefix, wrong
    /// segment count, non-numeric parameter, empty or malformed salt/digest
    /// segments) yields an [`HashAlgorithm::Unknown`] record with
    /// [`HashParams::Empty`]. No cryptography is performed.
    pub fn parse(raw: &str) -> Self {
        let (algorithm, params) = match parse_fields(raw) {
            Some(fields) => fields,
            None => (HashAlgorithm::Unknown, HashParams::Empty),
        };

        Self {
            algorithm,
            params,
            raw: raw.to_owned(),
        }
    }

    /// Algorithm the hash was produced with.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Cost parameters embedded in the hash.
    #[must_use]
    pub fn params(&self) -> HashParams {
        self.params
    }

    /// The hash string this record was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns whether the hash was recognized at all.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.algorithm.is_known()
    }
}

fn parse_fields(raw: &str) -> Option<(HashAlgorithm, HashParams)> {
    let mut segments = raw.strip_prefix('$')?.split('$');

    match segments.next()? {
        "2y" => parse_bcrypt(segments),
        "argon2i" => parse_argon(HashAlgorithm::Argon2i, segments),
        "argon2id" => parse_argon(HashAlgorithm::Argon2id, segments),
        _ => None,
    }
}

fn parse_bcrypt<'a>(
    mut segments: impl Iterator<Item = &'a str>,
) -> Option<(HashAlgorithm, HashParams)> {
    let cost = segments.next()?;
    let body = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    if cost.len() != 2 {
        return None;
    }
    let cost = parse_decimal(cost)?;

    if body.len() != BCRYPT_BODY_LEN || !body.bytes().all(is_bcrypt_b64) {
        return None;
    }

    Some((
        HashAlgorithm::Bcrypt,
        HashParams::Bcrypt(BcryptParams { cost }),
    ))
}

fn parse_argon<'a>(
    algorithm: HashAlgorithm,
    mut segments: impl Iterator<Item = &'a str>,
) -> Option<(HashAlgorithm, HashParams)> {
    let version = segments.next()?;
    let params = segments.next()?;
    let salt = segments.next()?;
    let digest = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    let version = parse_decimal(version.strip_prefix("v=")?)?;

    // The PHC encoding fixes the parameter order to m, t, p.
    let mut fields = params.split(',');
    let memory = parse_decimal(fields.next()?.strip_prefix("m=")?)?;
    let time = parse_decimal(fields.next()?.strip_prefix("t=")?)?;
    let threads = parse_decimal(fields.next()?.strip_prefix("p=")?)?;
    if fields.next().is_some() {
        return None;
    }

    if salt.is_empty() || !salt.bytes().all(is_b64) {
        return None;
    }
    if digest.is_empty() || !digest.bytes().all(is_b64) {
        return None;
    }

    Some((
        algorithm,
        HashParams::Argon(ArgonParams {
            version,
            memory,
            time,
            threads,
        }),
    ))
}

fn parse_decimal(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// bcrypt's base64 alphabet: `./A-Za-z0-9`.
fn is_bcrypt_b64(byte: u8) -> bool {
    byte == b'.' || byte == b'/' || byte.is_ascii_alphanumeric()
}

/// Standard base64 without padding, as used by the PHC salt and digest
/// segments.
fn is_b64(byte: u8) -> bool {
    byte == b'+' || byte == b'/' || byte.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BCRYPT_HASH: &str = "$2y$17$1iPpw8cxiw6.ijzD2Ry1mOvBMM2kPu6wayaIXWLMG5fhFX5ejCEa6";
    const ARGON2I_HASH: &str =
        "$argon2i$v=19$m=65536,t=4,p=1$eE4vbkhJTm54M0k4OU1LTw$C9JCrLeNkNHI1jWx3pBqpK2bTgFrtcVcIfARjCN0218";
    const ARGON2ID_HASH: &str =
        "$argon2id$v=19$m=4194304,t=4,p=16$WmJySGpROWJuMUJxZXQ5Rw$u96pRIoI4xsj+OfFoluc+iEng3jkDfuTFDIJOYbRml0";

    #[test]
    fn parses_bcrypt_hash() {
        let record = HashRecord::parse(BCRYPT_HASH);

        assert_eq!(record.algorithm(), HashAlgorithm::Bcrypt);
        assert_eq!(
            record.params().as_bcrypt(),
            Some(BcryptParams { cost: 17 })
        );
        assert_eq!(record.raw(), BCRYPT_HASH);
        assert!(record.is_known());
    }

    #[test]
    fn parses_argon2i_hash() {
        let record = HashRecord::parse(ARGON2I_HASH);

        assert_eq!(record.algorithm(), HashAlgorithm::Argon2i);
        assert_eq!(
            record.params().as_argon(),
            Some(ArgonParams {
                version: 19,
                memory: 65536,
                time: 4,
                threads: 1,
            })
        );
    }

    #[test]
    fn parses_argon2id_hash() {
        let record = HashRecord::parse(ARGON2ID_HASH);

        assert_eq!(record.algorithm(), HashAlgorithm::Argon2id);
        assert_eq!(
            record.params().as_argon(),
            Some(ArgonParams {
                version: 19,
                memory: 4194304,
                time: 4,
                threads: 16,
            })
        );
    }

    #[test]
    fn digest_may_contain_slash() {
        let record = HashRecord::parse(
            "$argon2i$v=19$m=4194304,t=4,p=8$Ri5lRGt5VFMvMEtiLkYxQg$sPuFc8V0SKB1gmOJXmqcXscTZ8Awdkihf7m0Y/bskSg",
        );

        assert_eq!(record.algorithm(), HashAlgorithm::Argon2i);
    }

    #[test]
    fn plaintext_is_unknown() {
        let record = HashRecord::parse("password");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
        assert!(record.params().is_empty());
        assert!(!record.is_known());
    }

    #[test]
    fn empty_string_is_unknown() {
        let record = HashRecord::parse("");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
        assert!(record.params().is_empty());
    }

    #[test]
    fn foreign_bcrypt_ident_is_unknown() {
        // Only the `$2y$` encoding is recognized.
        let record =
            HashRecord::parse("$2b$10$PCXl4nmz2z8vckcBFi2AQObDvYOIlNa99REfp0dQN/Hq7Lc1wA5qC");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn non_numeric_bcrypt_cost_is_unknown() {
        let record =
            HashRecord::parse("$2y$xx$PCXl4nmz2z8vckcBFi2AQObDvYOIlNa99REfp0dQN/Hq7Lc1wA5qC");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn truncated_bcrypt_body_is_unknown() {
        let record = HashRecord::parse("$2y$10$PCXl4nmz2z8vckcBFi2AQ");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
        assert!(record.params().is_empty());
    }

    #[test]
    fn bcrypt_with_trailing_segment_is_unknown() {
        let record = HashRecord::parse(&format!("{BCRYPT_HASH}$extra"));

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn argon_with_missing_parameter_is_unknown() {
        let record =
            HashRecord::parse("$argon2i$v=19$m=65536,t=4$eE4vbkhJTm54M0k4OU1LTw$C9JCrLeNkNHI1jWx");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn argon_with_reordered_parameters_is_unknown() {
        let record =
            HashRecord::parse("$argon2i$v=19$t=4,m=65536,p=1$eE4vbkhJTm54M0k4OU1LTw$C9JCrLeNkNHI1jWx");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn argon_with_empty_digest_is_unknown() {
        let record = HashRecord::parse("$argon2i$v=19$m=65536,t=4,p=1$eE4vbkhJTm54M0k4OU1LTw$");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn argon_with_non_numeric_parameter_is_unknown() {
        let record =
            HashRecord::parse("$argon2i$v=19$m=64M,t=4,p=1$eE4vbkhJTm54M0k4OU1LTw$C9JCrLeNkNHI1jWx");

        assert_eq!(record.algorithm(), HashAlgorithm::Unknown);
    }

    #[test]
    fn algorithm_names_match_wire_idents() {
        assert_eq!(HashAlgorithm::Bcrypt.to_string(), "bcrypt");
        assert_eq!(HashAlgorithm::Argon2i.to_string(), "argon2i");
        assert_eq!(HashAlgorithm::Argon2id.to_string(), "argon2id");
        assert_eq!(HashAlgorithm::Unknown.to_string(), "unknown");
    }
}
