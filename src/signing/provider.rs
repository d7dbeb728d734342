use super::{CryptoProvider, KeyAlgorithm, SecurePrivateKey, SignerRecord, integer_content};
use crate::error::{Error, Result};
use crate::hash::{self, HashAlgorithm};
use openssl::pkey::{Id, PKey};
use openssl::pkey_ctx::PkeyCtx;
use openssl::rsa::Padding;
use openssl::x509::X509;

/// [`CryptoProvider`] backed by OpenSSL, with digests from `sha2`
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSslProvider;

impl CryptoProvider for OpenSslProvider {
    type PrivateKey = SecurePrivateKey;

    fn digest(&self, data: &[u8], algorithm: HashAlgorithm) -> Result<Vec<u8>> {
        let digest = hash::calculate_digest(data, algorithm);
        log::debug!(
            "Created {algorithm} digest of {} bytes of data, result is {} bytes",
            data.len(),
            digest.len()
        );
        Ok(digest)
    }

    fn load_private_key(&self, der: &[u8]) -> Result<SecurePrivateKey> {
        SecurePrivateKey::from_der(der.to_vec())
    }

    fn private_key_algorithm(&self, key: &SecurePrivateKey) -> KeyAlgorithm {
        key_algorithm(key.as_pkey().id())
    }

    fn keys_match(&self, public_key_der: &[u8], private_key: &SecurePrivateKey) -> Result<bool> {
        let public_key = PKey::public_key_from_der(public_key_der)
            .map_err(|e| Error::CryptoFailure(format!("Failed to load public key: {e}")))?;
        Ok(public_key.public_eq(private_key.as_pkey()))
    }

    fn sign(
        &self,
        private_key: &SecurePrivateKey,
        algorithm: HashAlgorithm,
        digest: &[u8],
    ) -> Result<Vec<u8>> {
        if digest.len() != algorithm.digest_size() {
            return Err(Error::CryptoFailure(format!(
                "{algorithm} digest must be {} bytes, got {}",
                algorithm.digest_size(),
                digest.len()
            )));
        }

        let mut ctx = PkeyCtx::new(private_key.as_pkey())
            .map_err(|e| Error::CryptoFailure(format!("Failed to create signing context: {e}")))?;
        ctx.sign_init()
            .map_err(|e| Error::CryptoFailure(format!("Failed to initialize signing: {e}")))?;
        ctx.set_rsa_padding(Padding::PKCS1)
            .map_err(|e| Error::CryptoFailure(format!("Failed to set RSA padding: {e}")))?;
        ctx.set_signature_md(algorithm.md())
            .map_err(|e| Error::CryptoFailure(format!("Failed to set signature digest: {e}")))?;

        let mut signature = Vec::new();
        ctx.sign_to_vec(digest, &mut signature)
            .map_err(|e| Error::CryptoFailure(format!("Failed to generate signature: {e}")))?;

        log::debug!(
            "Signed {} byte digest with {}-bit RSA key into {} bytes",
            digest.len(),
            private_key.as_pkey().bits(),
            signature.len()
        );
        Ok(signature)
    }

    fn parse_certificate(&self, der: &[u8]) -> Result<SignerRecord> {
        let parse_failure = |what: &str, e: openssl::error::ErrorStack| {
            Error::CertificateParseFailure(format!("{what}: {e}"))
        };

        let cert = X509::from_der(der).map_err(|e| parse_failure("Failed to parse X.509", e))?;
        let issuer_raw = cert
            .issuer_name()
            .to_der()
            .map_err(|e| parse_failure("Failed to encode issuer", e))?;

        let serial = cert
            .serial_number()
            .to_bn()
            .map_err(|e| parse_failure("Failed to read serial number", e))?;
        if serial.is_negative() {
            return Err(Error::CertificateParseFailure(
                "negative serial numbers are not supported".to_string(),
            ));
        }

        let public_key = cert
            .public_key()
            .map_err(|e| parse_failure("Failed to read public key", e))?;
        let public_key_der = public_key
            .public_key_to_der()
            .map_err(|e| parse_failure("Failed to encode public key", e))?;

        Ok(SignerRecord {
            issuer_raw,
            serial_raw: integer_content(&serial.to_vec()),
            public_key_der,
            algorithm: key_algorithm(public_key.id()),
            key_bits: public_key.bits(),
        })
    }
}

fn key_algorithm(id: Id) -> KeyAlgorithm {
    match id {
        Id::RSA => KeyAlgorithm::Rsa,
        Id::EC => KeyAlgorithm::Other("EC".to_string()),
        Id::DSA => KeyAlgorithm::Other("DSA".to_string()),
        Id::ED25519 => KeyAlgorithm::Other("ED25519".to_string()),
        Id::ED448 => KeyAlgorithm::Other("ED448".to_string()),
        other => KeyAlgorithm::Other(format!("key type #{}", other.as_raw())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{generate_ec_signer, generate_signer};
    use openssl::hash::MessageDigest;
    use openssl::sign::Verifier;

    #[test]
    fn test_parse_certificate_fields() -> Result<()> {
        let signer = generate_signer("Record Test", 0x0102)?;
        let record = OpenSslProvider.parse_certificate(&signer.cert_der)?;

        assert_eq!(record.issuer_raw, signer.cert.issuer_name().to_der()?);
        assert_eq!(record.serial_raw, vec![0x01, 0x02]);
        assert_eq!(record.algorithm, KeyAlgorithm::Rsa);
        assert_eq!(record.key_bits, 2048);
        assert_eq!(record.public_key_der, signer.key.public_key_to_der()?);
        Ok(())
    }

    #[test]
    fn test_serial_with_high_bit_gets_padding() -> Result<()> {
        let signer = generate_signer("High Serial", 0x8000_0001)?;
        let record = OpenSslProvider.parse_certificate(&signer.cert_der)?;
        assert_eq!(record.serial_raw, vec![0x00, 0x80, 0x00, 0x00, 0x01]);
        Ok(())
    }

    #[test]
    fn test_parse_certificate_rejects_garbage() {
        match OpenSslProvider.parse_certificate(&[0x30, 0x03, 0x02, 0x01, 0x01]) {
            Err(Error::CertificateParseFailure(_)) => {}
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_ec_certificate_is_not_rsa() -> Result<()> {
        let signer = generate_ec_signer("EC Signer")?;
        let record = OpenSslProvider.parse_certificate(&signer.cert_der)?;
        assert_eq!(record.algorithm, KeyAlgorithm::Other("EC".to_string()));
        Ok(())
    }

    #[test]
    fn test_keys_match() -> Result<()> {
        let first = generate_signer("First", 1)?;
        let second = generate_signer("Second", 2)?;
        let provider = OpenSslProvider;

        let record = provider.parse_certificate(&first.cert_der)?;
        let own_key = provider.load_private_key(&first.key.private_key_to_pkcs8()?)?;
        let other_key = provider.load_private_key(&second.key.private_key_to_pkcs8()?)?;

        assert!(provider.keys_match(&record.public_key_der, &own_key)?);
        assert!(!provider.keys_match(&record.public_key_der, &other_key)?);
        Ok(())
    }

    #[test]
    fn test_sign_digest_verifies_over_payload() -> Result<()> {
        let signer = generate_signer("Verify", 7)?;
        let provider = OpenSslProvider;
        let key = provider.load_private_key(&signer.key.private_key_to_pkcs8()?)?;
        let payload = b"data to be attested";

        for (algorithm, md) in [
            (HashAlgorithm::Sha224, MessageDigest::sha224()),
            (HashAlgorithm::Sha256, MessageDigest::sha256()),
            (HashAlgorithm::Sha384, MessageDigest::sha384()),
            (HashAlgorithm::Sha512, MessageDigest::sha512()),
        ] {
            let digest = provider.digest(payload, algorithm)?;
            let signature = provider.sign(&key, algorithm, &digest)?;
            assert_eq!(signature.len(), 256);

            let mut verifier = Verifier::new(md, &signer.key)?;
            verifier.update(payload)?;
            assert!(verifier.verify(&signature)?, "{algorithm} signature must verify");
        }
        Ok(())
    }

    #[test]
    fn test_sign_rejects_wrong_digest_length() -> Result<()> {
        let signer = generate_signer("Short Digest", 3)?;
        let provider = OpenSslProvider;
        let key = provider.load_private_key(&signer.key.private_key_to_pkcs8()?)?;

        match provider.sign(&key, HashAlgorithm::Sha256, &[0u8; 20]) {
            Err(Error::CryptoFailure(_)) => Ok(()),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_private_key_algorithm() -> Result<()> {
        let rsa = generate_signer("Rsa", 4)?;
        let ec = generate_ec_signer("Ec")?;
        let provider = OpenSslProvider;

        let rsa_key = provider.load_private_key(&rsa.key.private_key_to_pkcs8()?)?;
        let ec_key = provider.load_private_key(&ec.key.private_key_to_pkcs8()?)?;
        assert!(provider.private_key_algorithm(&rsa_key).is_rsa());
        assert_eq!(provider.private_key_algorithm(&ec_key).name(), "EC");
        Ok(())
    }
}
