//! # PKCS#7 SignedData Generation
//!
//! Builds a detached, multi-signer PKCS#7 `SignedData` container (RFC 2315)
//! from PEM certificates and either PEM private keys or precomputed RSA
//! signatures. The payload is digested (and signed, in key mode) but not
//! embedded; formats that need it next to the container append it themselves.
//!
//! The encoding is written back to front into a growing buffer, see
//! [`crate::asn1`], and trimmed to the written bytes at the end.
//!
//! ## Examples
//!
//! ```no_run
//! use pkcs7_gen::hash::HashAlgorithm;
//! use pkcs7_gen::pkcs7::{generate, SignerEntry, SigningRequest};
//!
//! let request = SigningRequest::with_keys(
//!     std::fs::read("payload.bin").unwrap(),
//!     HashAlgorithm::Sha256,
//!     vec![SignerEntry::new(
//!         std::fs::read("signer.crt").unwrap(),
//!         std::fs::read("signer.key").unwrap(),
//!     )],
//! );
//! let container = generate(&request).unwrap();
//! std::fs::write("payload.p7", container.as_der()).unwrap();
//! ```

use crate::asn1::TlvEmitter;
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::pem;
use crate::signing::{CryptoProvider, OpenSslProvider};
use std::fmt;
use zeroize::Zeroizing;

pub mod config;
pub mod container;
pub mod signer;

pub use config::GeneratorConfig;
pub use container::ContainerAssembler;
pub use signer::{PreparedSigner, SignerAssembler};

/// What the second half of every signer entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMode {
    /// PEM private keys; signatures are computed over the payload digest
    PrivateKeys,
    /// Signatures produced elsewhere, raw or PEM, embedded as given
    PrecomputedSignatures,
}

/// A certificate paired with its private key or precomputed signature
#[derive(Clone)]
pub struct SignerEntry {
    /// PEM encoded certificate
    pub certificate: Vec<u8>,
    /// PEM private key or signature, see [`SigningMode`]
    pub credential: Zeroizing<Vec<u8>>,
}

impl SignerEntry {
    pub fn new(certificate: Vec<u8>, credential: Vec<u8>) -> Self {
        Self {
            certificate,
            credential: Zeroizing::new(credential),
        }
    }
}

impl fmt::Debug for SignerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerEntry")
            .field("certificate_len", &self.certificate.len())
            .field("credential_len", &self.credential.len())
            .finish()
    }
}

/// Everything one generation call needs
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub payload: Vec<u8>,
    pub hash_algorithm: HashAlgorithm,
    pub mode: SigningMode,
    pub signers: Vec<SignerEntry>,
}

impl SigningRequest {
    pub fn with_keys(payload: Vec<u8>, hash_algorithm: HashAlgorithm, signers: Vec<SignerEntry>) -> Self {
        Self {
            payload,
            hash_algorithm,
            mode: SigningMode::PrivateKeys,
            signers,
        }
    }

    pub fn with_signatures(
        payload: Vec<u8>,
        hash_algorithm: HashAlgorithm,
        signers: Vec<SignerEntry>,
    ) -> Self {
        Self {
            payload,
            hash_algorithm,
            mode: SigningMode::PrecomputedSignatures,
            signers,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.signers.is_empty() {
            log::error!("No signers given, a certificate with a key or signature is required");
            return Err(Error::NoSigners);
        }
        Ok(())
    }
}

/// A finished DER `ContentInfo` holding the SignedData
#[derive(Clone, PartialEq, Eq)]
pub struct Container {
    der: Vec<u8>,
}

impl Container {
    pub fn from_der(der: Vec<u8>) -> Self {
        Self { der }
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn into_der(self) -> Vec<u8> {
        self.der
    }

    pub fn len(&self) -> usize {
        self.der.len()
    }

    pub fn is_empty(&self) -> bool {
        self.der.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container(len={})", self.der.len())
    }
}

/// Generate a container with OpenSSL and the default configuration
pub fn generate(request: &SigningRequest) -> Result<Container> {
    generate_with(&OpenSslProvider, request, &GeneratorConfig::default())
}

/// Generate a container with an explicit provider and configuration
pub fn generate_with<P: CryptoProvider>(
    provider: &P,
    request: &SigningRequest,
    config: &GeneratorConfig,
) -> Result<Container> {
    request.validate()?;

    log::info!(
        "Generating PKCS7 with {} signer(s) using {}",
        request.signers.len(),
        request.hash_algorithm
    );

    let signers = request
        .signers
        .iter()
        .enumerate()
        .map(|(index, entry)| prepare_signer(index, entry, request.mode))
        .collect::<Result<Vec<_>>>()?;

    let mut emitter = TlvEmitter::with_capacity(config.initial_capacity)?;
    ContainerAssembler::new(
        provider,
        &request.payload,
        request.hash_algorithm,
        request.mode,
    )
    .assemble(&mut emitter, &signers)
    .inspect_err(|e| log::error!("Failed to generate PKCS7: {e}"))?;

    let buffer = emitter.into_buffer();
    let capacity = buffer.capacity();
    let unused = buffer.leading_unused();
    let der = buffer.into_trimmed()?;
    log::info!(
        "Trimmed PKCS7 of buffer size {capacity} to actual size {} ({unused} unused)",
        der.len()
    );

    Ok(Container::from_der(der))
}

fn prepare_signer(index: usize, entry: &SignerEntry, mode: SigningMode) -> Result<PreparedSigner> {
    let certificate_der = pem::pem_to_der(&entry.certificate).map_err(|e| {
        log::error!("Conversion of certificate {index} from PEM to DER failed: {e}");
        with_signer_context(index, "certificate", e)
    })?;

    let material = match mode {
        SigningMode::PrivateKeys => pem::pem_to_der(&entry.credential),
        SigningMode::PrecomputedSignatures => pem::normalize_signature(&entry.credential),
    }
    .map_err(|e| {
        log::error!("Conversion of credential {index} failed: {e}");
        with_signer_context(index, "credential", e)
    })?;

    Ok(PreparedSigner {
        index,
        certificate_der,
        material: Zeroizing::new(material),
    })
}

fn with_signer_context(index: usize, what: &str, err: Error) -> Error {
    match err {
        Error::InvalidEnvelope(msg) => {
            Error::InvalidEnvelope(format!("signer {index} {what}: {msg}"))
        }
        other => other,
    }
}
