use crate::hash::HashAlgorithm;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum Pkcs7Commands {
    /// Generate a detached PKCS#7 SignedData container for a payload
    Generate {
        /// Signer certificates in PEM format, one per signer
        #[arg(long = "cert", num_args = 1.., value_delimiter = ',', required = true)]
        certs: Vec<PathBuf>,

        /// Private keys in PEM format, in the same order as the certificates
        #[arg(
            long = "key",
            num_args = 1..,
            value_delimiter = ',',
            conflicts_with = "signatures",
            required_unless_present = "signatures"
        )]
        keys: Vec<PathBuf>,

        /// Precomputed signatures (raw or PEM), in the same order as the certificates
        #[arg(long = "signature", num_args = 1.., value_delimiter = ',')]
        signatures: Vec<PathBuf>,

        /// File whose contents are attested
        #[arg(long = "payload")]
        payload: PathBuf,

        /// Digest algorithm (default: sha256)
        #[arg(long = "hash-alg", value_enum, default_value = "sha256")]
        hash_alg: HashAlgorithm,

        /// Where to write the DER container
        #[arg(long = "output")]
        output: Option<PathBuf>,

        /// Print the container as hex to stdout
        #[arg(long = "print")]
        print: bool,
    },
    /// Compute the digest of a payload, for signing it elsewhere
    Digest {
        /// File to digest
        #[arg(long = "payload")]
        payload: PathBuf,

        /// Digest algorithm (default: sha256)
        #[arg(long = "hash-alg", value_enum, default_value = "sha256")]
        hash_alg: HashAlgorithm,

        /// Write the raw digest here instead of printing it as hex
        #[arg(long = "output")]
        output: Option<PathBuf>,
    },
}
