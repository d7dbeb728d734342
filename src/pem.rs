//! # PEM Normalization
//!
//! Certificates, keys and signatures arrive in a textual envelope:
//!
//! ```text
//! -----BEGIN CERTIFICATE-----
//! MIIC...base64...
//! -----END CERTIFICATE-----
//! ```
//!
//! [`pem_to_der`] decodes the base64 body of the first block in a file. The
//! BEGIN and END labels must agree, but the label itself is not interpreted.
//!
//! ```
//! use pkcs7_gen::pem::pem_to_der;
//!
//! let pem = b"-----BEGIN SIGNATURE-----\nAQID\n-----END SIGNATURE-----\n";
//! assert_eq!(pem_to_der(pem).unwrap(), vec![1, 2, 3]);
//! ```

use crate::error::{Error, Result};

const BEGIN_MARKER: &[u8] = b"-----BEGIN";

/// Decode the first PEM block in `input` to its binary content.
pub fn pem_to_der(input: &[u8]) -> Result<Vec<u8>> {
    let block = pem::parse(input).map_err(|e| Error::InvalidEnvelope(e.to_string()))?;
    if block.contents().is_empty() {
        return Err(Error::InvalidEnvelope(format!(
            "empty {} PEM body",
            block.tag()
        )));
    }
    Ok(block.contents().to_vec())
}

/// Whether `input` carries a PEM envelope.
pub fn is_pem(input: &[u8]) -> bool {
    input
        .windows(BEGIN_MARKER.len())
        .any(|window| window == BEGIN_MARKER)
}

/// Signatures may be handed over raw or enveloped; only the latter is decoded.
pub fn normalize_signature(input: &[u8]) -> Result<Vec<u8>> {
    if is_pem(input) {
        pem_to_der(input)
    } else {
        Ok(input.to_vec())
    }
}
