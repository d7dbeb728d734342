use super::SigningMode;
use super::signer::{PreparedSigner, SignerAssembler};
use crate::asn1::oid::{PKCS7_DATA, PKCS7_SIGNED_DATA};
use crate::asn1::{ConstructedTag, Element, TlvEmitter};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::signing::{CryptoProvider, SignerRecord};

/// SignedData version (RFC 2315 section 9.1)
pub const SIGNED_DATA_VERSION: i64 = 1;

/// Builds the whole ContentInfo, innermost part first:
///
/// ```text
/// SEQUENCE {
///   OID signedData
///   [0] {
///     SEQUENCE {
///       INTEGER version
///       SET { SEQUENCE { OID digest, NULL } }
///       SEQUENCE { OID data }
///       [0] { certificate... }
///       SET { SignerInfo... }
///     }
///   }
/// }
/// ```
pub struct ContainerAssembler<'a, P: CryptoProvider> {
    provider: &'a P,
    hash_algorithm: HashAlgorithm,
    signer: SignerAssembler<'a, P>,
}

impl<'a, P: CryptoProvider> ContainerAssembler<'a, P> {
    pub fn new(
        provider: &'a P,
        payload: &'a [u8],
        hash_algorithm: HashAlgorithm,
        mode: SigningMode,
    ) -> Self {
        Self {
            provider,
            hash_algorithm,
            signer: SignerAssembler::new(provider, payload, hash_algorithm, mode),
        }
    }

    /// Write the complete container into `emitter`, which must be empty.
    ///
    /// Certificates are parsed and signatures produced in the order of
    /// `signers`, so the first failing signer is the one reported. Signers
    /// and certificates come out in that order too.
    pub fn assemble(&self, emitter: &mut TlvEmitter, signers: &[PreparedSigner]) -> Result<()> {
        if signers.is_empty() {
            return Err(Error::NoSigners);
        }
        if !emitter.is_empty() {
            return Err(Error::Encoding(
                "container assembly needs an empty buffer".to_string(),
            ));
        }

        let records = signers
            .iter()
            .map(|signer| self.parse_certificate(signer))
            .collect::<Result<Vec<_>>>()?;

        let signatures = signers
            .iter()
            .zip(&records)
            .map(|(signer, record)| self.signer.signature(signer, record))
            .collect::<Result<Vec<_>>>()?;

        let start = emitter.mark();

        emitter.wrap(ConstructedTag::Set, |em| {
            for ((signer, record), signature) in
                signers.iter().zip(&records).zip(&signatures).rev()
            {
                self.emit_signer_info(em, signer, record, signature)?;
            }
            Ok(())
        })?;

        emitter.wrap(ConstructedTag::ContextSpecific(0), |em| {
            for signer in signers.iter().rev() {
                em.emit(&Element::Raw(&signer.certificate_der))?;
            }
            Ok(())
        })?;

        emitter.emit(&Element::ContentType(&PKCS7_DATA))?;

        let digest_oid = self.provider.oid_for_digest(self.hash_algorithm);
        emitter.wrap(ConstructedTag::Set, |em| {
            em.emit(&Element::AlgorithmIdentifier {
                oid: &digest_oid,
                params_len: 0,
            })?;
            Ok(())
        })?;

        emitter.emit(&Element::Integer(SIGNED_DATA_VERSION))?;

        let body_len = emitter.written_since(start);
        emitter.emit(&Element::Constructed {
            tag: ConstructedTag::Sequence,
            content_len: body_len,
        })?;

        let explicit_len = emitter.written_since(start);
        emitter.emit(&Element::Constructed {
            tag: ConstructedTag::ContextSpecific(0),
            content_len: explicit_len,
        })?;

        let content_len = emitter.written_since(start);
        emitter.emit(&Element::AlgorithmIdentifier {
            oid: &PKCS7_SIGNED_DATA,
            params_len: content_len,
        })?;

        Ok(())
    }

    fn parse_certificate(&self, signer: &PreparedSigner) -> Result<SignerRecord> {
        self.provider
            .parse_certificate(&signer.certificate_der)
            .map_err(|e| {
                log::error!("Parsing the certificate of signer {} failed: {e}", signer.index);
                match e {
                    Error::CertificateParseFailure(msg) => Error::CertificateParseFailure(
                        format!("signer {}: {msg}", signer.index),
                    ),
                    other => other,
                }
            })
    }

    fn emit_signer_info(
        &self,
        emitter: &mut TlvEmitter,
        signer: &PreparedSigner,
        record: &SignerRecord,
        signature: &[u8],
    ) -> Result<()> {
        log::debug!("Adding signer {} to signed data", signer.index);
        let written = self.signer.assemble(emitter, signer, record, signature)?;
        emitter.emit(&Element::Constructed {
            tag: ConstructedTag::Sequence,
            content_len: written,
        })?;
        Ok(())
    }
}
