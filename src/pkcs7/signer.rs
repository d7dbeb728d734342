use super::SigningMode;
use crate::asn1::oid::RSA_ENCRYPTION;
use crate::asn1::{ConstructedTag, Element, TlvEmitter};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::signing::{CryptoProvider, SignerRecord};
use std::fmt;
use zeroize::Zeroizing;

/// SignerInfo version (RFC 2315 section 9.2)
pub const SIGNER_INFO_VERSION: i64 = 1;

/// One signer entry after PEM normalization
pub struct PreparedSigner {
    /// Position in the request, used in error messages
    pub index: usize,
    pub certificate_der: Vec<u8>,
    /// DER private key or raw signature, depending on the signing mode
    pub material: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for PreparedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedSigner")
            .field("index", &self.index)
            .field("certificate_len", &self.certificate_der.len())
            .field("material_len", &self.material.len())
            .finish()
    }
}

/// Produces and writes the content of one SignerInfo:
///
/// ```text
/// INTEGER version
/// SEQUENCE { issuer Name, INTEGER serial }
/// SEQUENCE { OID digest, NULL }
/// SEQUENCE { OID rsaEncryption, NULL }
/// OCTET STRING signature
/// ```
///
/// [`SignerAssembler::signature`] runs first for every signer, in input
/// order; [`SignerAssembler::assemble`] then writes the fields. The caller
/// wraps them in its SEQUENCE.
pub struct SignerAssembler<'a, P: CryptoProvider> {
    provider: &'a P,
    payload: &'a [u8],
    hash_algorithm: HashAlgorithm,
    mode: SigningMode,
}

impl<'a, P: CryptoProvider> SignerAssembler<'a, P> {
    pub fn new(
        provider: &'a P,
        payload: &'a [u8],
        hash_algorithm: HashAlgorithm,
        mode: SigningMode,
    ) -> Self {
        Self {
            provider,
            payload,
            hash_algorithm,
            mode,
        }
    }

    /// The signature this signer contributes: computed from its key, or the
    /// precomputed one. Either way it must be as long as the certificate's
    /// RSA modulus.
    pub fn signature(
        &self,
        signer: &PreparedSigner,
        record: &SignerRecord,
    ) -> Result<Zeroizing<Vec<u8>>> {
        if !record.algorithm.is_rsa() {
            log::error!(
                "Certificate of signer {} has a {} key, expected RSA",
                signer.index,
                record.algorithm
            );
            return Err(Error::UnsupportedAlgorithm(format!(
                "signer {}: certificate key is {}, expected RSA",
                signer.index, record.algorithm
            )));
        }

        let signature = match self.mode {
            SigningMode::PrecomputedSignatures => {
                log::debug!(
                    "Embedding precomputed {} byte signature for signer {}",
                    signer.material.len(),
                    signer.index
                );
                signer.material.clone()
            }
            SigningMode::PrivateKeys => Zeroizing::new(self.compute_signature(signer, record)?),
        };

        let expected = record.key_bits.div_ceil(8) as usize;
        if signature.len() != expected {
            log::error!(
                "Signature of signer {} is {} bytes, expected {expected}",
                signer.index,
                signature.len()
            );
            return Err(Error::CryptoFailure(format!(
                "signer {}: signature is {} bytes, a {}-bit RSA key signs {expected}",
                signer.index,
                signature.len(),
                record.key_bits
            )));
        }
        Ok(signature)
    }

    /// Emit the signer's fields, last field first. Returns the bytes written.
    pub fn assemble(
        &self,
        emitter: &mut TlvEmitter,
        signer: &PreparedSigner,
        record: &SignerRecord,
        signature: &[u8],
    ) -> Result<usize> {
        let mark = emitter.mark();

        emitter.emit(&Element::OctetString(signature))?;

        emitter.emit(&Element::AlgorithmIdentifier {
            oid: &RSA_ENCRYPTION,
            params_len: 0,
        })?;
        let digest_oid = self.provider.oid_for_digest(self.hash_algorithm);
        emitter.emit(&Element::AlgorithmIdentifier {
            oid: &digest_oid,
            params_len: 0,
        })?;

        emitter.wrap(ConstructedTag::Sequence, |em| {
            em.emit(&Element::LargeInteger(&record.serial_raw))?;
            em.emit(&Element::Raw(&record.issuer_raw))?;
            Ok(())
        })?;
        emitter.emit(&Element::Integer(SIGNER_INFO_VERSION))?;

        let written = emitter.written_since(mark);
        log::debug!("Signer {} info is {written} bytes", signer.index);
        Ok(written)
    }

    fn compute_signature(&self, signer: &PreparedSigner, record: &SignerRecord) -> Result<Vec<u8>> {
        let key = self.provider.load_private_key(&signer.material)?;

        let key_algorithm = self.provider.private_key_algorithm(&key);
        if !key_algorithm.is_rsa() {
            return Err(Error::UnsupportedAlgorithm(format!(
                "signer {}: private key is {key_algorithm}, expected RSA",
                signer.index
            )));
        }

        if !self.provider.keys_match(&record.public_key_der, &key)? {
            log::error!("Public and private key of signer {} are not matched", signer.index);
            return Err(Error::KeyMismatch(format!(
                "signer {}: certificate public key does not belong to the private key",
                signer.index
            )));
        }

        let digest = self.provider.digest(self.payload, self.hash_algorithm)?;
        self.provider.sign(&key, self.hash_algorithm, &digest)
    }
}
