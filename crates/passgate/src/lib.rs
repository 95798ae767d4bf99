#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod manager;
mod record;

pub mod hasher;

#[cfg(feature = "argon2")]
pub use hasher::ArgonHasher;
#[cfg(feature = "bcrypt")]
pub use hasher::BcryptHasher;

pub use config::{ArgonPolicy, BcryptPolicy, HashConfig};
pub use error::{BoxedError, HashError, Result};
pub use hasher::Hasher;
pub use manager::{HashDriver, HashManager};
pub use record::{ArgonParams, BcryptParams, HashAlgorithm, HashParams, HashRecord};
