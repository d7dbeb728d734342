//! # Hash Module
//!
//! This module defines the digest algorithms a signed-data container can be
//! generated with and computes payload digests for them.
//!
//! ## Algorithm Support
//!
//! - **SHA-224**: 224-bit digest (28 bytes)
//! - **SHA-256**: 256-bit digest (32 bytes) - Default
//! - **SHA-384**: 384-bit digest (48 bytes)
//! - **SHA-512**: 512-bit digest (64 bytes)
//!
//! Each algorithm knows its object identifier, which is what ends up in the
//! `digestAlgorithms` set and in every signer's `digestAlgorithm` field.
//!
//! ## Examples
//!
//! ### Parsing an algorithm name
//! ```
//! use pkcs7_gen::hash::HashAlgorithm;
//!
//! let algorithm: HashAlgorithm = "SHA-384".parse().unwrap();
//! assert_eq!(algorithm, HashAlgorithm::Sha384);
//! assert_eq!(algorithm.digest_size(), 48);
//!
//! // Anything outside the supported set is rejected
//! assert!("md5".parse::<HashAlgorithm>().is_err());
//! ```
//!
//! ### Computing a digest
//! ```
//! use pkcs7_gen::hash::{calculate_digest, HashAlgorithm};
//!
//! let digest = calculate_digest(b"Hello, World!", HashAlgorithm::Sha256);
//! assert_eq!(digest.len(), 32);
//! ```

use crate::asn1::oid;
use crate::error::{Error, Result};
use const_oid::ObjectIdentifier;
use openssl::md::{Md, MdRef};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum HashAlgorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Object identifier of the algorithm (NIST hash algorithm arc)
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            HashAlgorithm::Sha224 => oid::SHA224,
            HashAlgorithm::Sha256 => oid::SHA256,
            HashAlgorithm::Sha384 => oid::SHA384,
            HashAlgorithm::Sha512 => oid::SHA512,
        }
    }

    /// The OpenSSL digest used when signing a precomputed digest
    pub fn md(&self) -> &'static MdRef {
        match self {
            HashAlgorithm::Sha224 => Md::sha224(),
            HashAlgorithm::Sha256 => Md::sha256(),
            HashAlgorithm::Sha384 => Md::sha384(),
            HashAlgorithm::Sha512 => Md::sha512(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    /// Accepts `sha256`, `SHA256` and `SHA-256` style names.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(format!(
                "digest algorithm '{s}' is not supported, expected one of sha224, sha256, sha384, sha512"
            ))),
        }
    }
}

/// Calculate the raw digest of `data`
///
/// # Examples
///
/// ```
/// use pkcs7_gen::hash::{calculate_digest, HashAlgorithm};
///
/// let data = b"payload";
/// for algorithm in HashAlgorithm::ALL {
///     assert_eq!(calculate_digest(data, algorithm).len(), algorithm.digest_size());
/// }
/// ```
pub fn calculate_digest(data: &[u8], algorithm: HashAlgorithm) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Calculate the digest of `data` as lowercase hex
pub fn calculate_hex_digest(data: &[u8], algorithm: HashAlgorithm) -> String {
    hex::encode(calculate_digest(data, algorithm))
}
