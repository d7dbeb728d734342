//! # PKCS7 Generator
//!
//! Multi-signer PKCS#7 / CMS `SignedData` generation
//!
//! Produces a detached, DER encoded PKCS#7 container in which each signer
//! contributes an RSA signature over the digest of a payload. Signatures are
//! either computed from PEM private keys or supplied precomputed, which lets
//! the actual signing happen on an HSM or another host.
//!
//! ## Installation
//!
//! ```bash
//! cargo install pkcs7-gen
//! ```
//!
//! ## Quick Start
//!
//! Sign a payload with two signers:
//! ```bash
//! pkcs7-gen generate \
//!     --cert=first.crt,second.crt \
//!     --key=first.key,second.key \
//!     --payload=firmware.bin \
//!     --hash-alg=sha256 \
//!     --output=firmware.p7
//! ```
//!
//! Embed signatures made elsewhere:
//! ```bash
//! pkcs7-gen digest --payload=firmware.bin --output=firmware.sha256
//! # sign firmware.sha256 externally, then
//! pkcs7-gen generate --cert=signer.crt --signature=firmware.sig \
//!     --payload=firmware.bin --output=firmware.p7
//! ```

#![doc(html_root_url = "https://docs.rs/pkcs7-gen/0.1.0")]

pub mod asn1;
pub mod cli;
pub mod error;
pub mod hash;
pub mod pem;
pub mod pkcs7;
pub mod signing;
#[cfg(test)]
pub(crate) mod tests;
pub mod utils;

// Re-export error types
pub use error::{Error, Result};

/// Initialize logging for the CLI
///
/// # Examples
///
/// ```
/// use pkcs7_gen::init_logging;
///
/// // Initialize with default settings
/// let result = init_logging();
/// // Note: This might fail if already initialized
/// assert!(result.is_ok() || result.is_err());
/// ```
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}

// Re-export commonly used types and traits
pub use hash::HashAlgorithm;
pub use pkcs7::{
    Container, GeneratorConfig, SignerEntry, SigningMode, SigningRequest, generate, generate_with,
};
pub use signing::{CryptoProvider, OpenSslProvider};
