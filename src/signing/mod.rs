//! # Signing
//!
//! The cryptographic capabilities the container assembly relies on, behind
//! the [`CryptoProvider`] trait: payload digests, private key loading,
//! key-pair matching, RSA signing of a precomputed digest and certificate
//! parsing. [`OpenSslProvider`] is the implementation used by default.

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use const_oid::ObjectIdentifier;
use openssl::pkey::{PKey, Private};
use std::fmt;
use zeroize::{ZeroizeOnDrop, Zeroizing};

pub mod provider;

pub use provider::OpenSslProvider;

/// Secure wrapper for private key data that zeroizes on drop
#[derive(ZeroizeOnDrop)]
pub struct SecurePrivateKey {
    #[zeroize(skip)]
    pkey: PKey<Private>,
    // Keep the DER the key was parsed from so it is wiped together with the key
    _key_data: Zeroizing<Vec<u8>>,
}

impl SecurePrivateKey {
    /// Parse a PKCS#8 or PKCS#1 DER private key
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        let zeroizing_der = Zeroizing::new(der);

        let pkey = PKey::private_key_from_der(&zeroizing_der)
            .map_err(|e| Error::CryptoFailure(format!("Failed to load private key: {e}")))?;

        Ok(Self {
            pkey,
            _key_data: zeroizing_der,
        })
    }

    /// Get a reference to the inner PKey
    pub fn as_pkey(&self) -> &PKey<Private> {
        &self.pkey
    }
}

impl fmt::Debug for SecurePrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecurePrivateKey(bits={})", self.pkey.bits())
    }
}

/// Public key algorithm of a certificate or private key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Other(String),
}

impl KeyAlgorithm {
    pub fn name(&self) -> &str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Other(name) => name,
        }
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self, KeyAlgorithm::Rsa)
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Certificate fields a signer-info is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerRecord {
    /// DER encoding of the issuer Name, embedded verbatim
    pub issuer_raw: Vec<u8>,
    /// Content octets of the serialNumber INTEGER
    pub serial_raw: Vec<u8>,
    /// SubjectPublicKeyInfo DER of the certificate key
    pub public_key_der: Vec<u8>,
    pub algorithm: KeyAlgorithm,
    pub key_bits: u32,
}

/// Capabilities the container assembly calls into
pub trait CryptoProvider {
    type PrivateKey;

    fn digest(&self, data: &[u8], algorithm: HashAlgorithm) -> Result<Vec<u8>>;

    fn load_private_key(&self, der: &[u8]) -> Result<Self::PrivateKey>;

    fn private_key_algorithm(&self, key: &Self::PrivateKey) -> KeyAlgorithm;

    /// Whether `private_key` belongs to the SubjectPublicKeyInfo `public_key_der`
    fn keys_match(&self, public_key_der: &[u8], private_key: &Self::PrivateKey) -> Result<bool>;

    /// Sign an already computed digest (PKCS#1 v1.5 for RSA)
    fn sign(
        &self,
        private_key: &Self::PrivateKey,
        algorithm: HashAlgorithm,
        digest: &[u8],
    ) -> Result<Vec<u8>>;

    fn parse_certificate(&self, der: &[u8]) -> Result<SignerRecord>;

    fn oid_for_digest(&self, algorithm: HashAlgorithm) -> ObjectIdentifier {
        algorithm.oid()
    }
}

/// DER INTEGER content octets for a non-negative big-endian magnitude
pub fn integer_content(magnitude: &[u8]) -> Vec<u8> {
    let first_significant = magnitude
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(magnitude.len());
    let magnitude = &magnitude[first_significant..];

    match magnitude.first() {
        None => vec![0x00],
        Some(first) if first & 0x80 != 0 => {
            let mut content = Vec::with_capacity(magnitude.len() + 1);
            content.push(0x00);
            content.extend_from_slice(magnitude);
            content
        }
        Some(_) => magnitude.to_vec(),
    }
}
