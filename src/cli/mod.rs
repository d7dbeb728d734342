pub mod commands;
pub mod handlers;
use crate::error::Error;

pub use commands::Pkcs7Commands;
pub use handlers::{generate_from_files, handle_pkcs7_command};

pub fn format_error(error: &Error) -> String {
    match error {
        Error::Io(err) => format!("IO error: {err}"),
        Error::AllocationFailure(msg) => format!("Out of memory: {msg}"),
        Error::InvalidEnvelope(msg) => format!("PEM error: {msg}"),
        Error::CertificateParseFailure(msg) => format!("Certificate error: {msg}"),
        Error::UnsupportedAlgorithm(msg) => format!("Unsupported algorithm: {msg}"),
        Error::KeyMismatch(msg) => format!("Key mismatch: {msg}"),
        Error::CryptoFailure(msg) => format!("Crypto error: {msg}"),
        Error::Encoding(msg) => format!("Encoding error: {msg}"),
        Error::NoSigners => {
            "Missing signers: use --cert <file> with --key <file> or --signature <file>".to_string()
        }
        Error::Validation(msg) => format!("Validation error: {msg}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        assert_eq!(
            format_error(&Error::KeyMismatch("signer 0".to_string())),
            "Key mismatch: signer 0"
        );
        assert!(format_error(&Error::NoSigners).contains("--cert"));
    }
}
