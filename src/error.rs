use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Certificate parse failure: {0}")]
    CertificateParseFailure(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    #[error("Crypto failure: {0}")]
    CryptoFailure(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("No signers given, at least one certificate with a key or signature is required")]
    NoSigners,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),
}

impl From<openssl::error::ErrorStack> for Error {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Error::CryptoFailure(err.to_string())
    }
}

impl Error {
    /// Whether a caller can reasonably retry with different inputs.
    ///
    /// Allocation failures abort generation outright; everything
    /// else only rejects the inputs of the current call.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::AllocationFailure(_))
    }
}
