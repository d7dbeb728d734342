use crate::error::{Error, Result};

use super::commands::Pkcs7Commands;
use crate::hash::{self, HashAlgorithm};
use crate::pkcs7::{self, Container, SignerEntry, SigningMode, SigningRequest};
use crate::utils::{safe_read_file, safe_write_file};
use std::path::{Path, PathBuf};

pub fn handle_pkcs7_command(cmd: Pkcs7Commands) -> Result<()> {
    match cmd {
        Pkcs7Commands::Generate {
            certs,
            keys,
            signatures,
            payload,
            hash_alg,
            output,
            print,
        } => {
            if output.is_none() && !print {
                return Err(Error::Validation(
                    "nothing to do, pass --output and/or --print".to_string(),
                ));
            }

            let (mode, credentials) = if keys.is_empty() {
                (SigningMode::PrecomputedSignatures, signatures)
            } else {
                (SigningMode::PrivateKeys, keys)
            };

            let container = generate_from_files(&certs, &credentials, mode, &payload, hash_alg)?;

            if let Some(output) = output {
                safe_write_file(&output, container.as_der())?;
                println!(
                    "Wrote {} byte PKCS7 to {}",
                    container.len(),
                    output.display()
                );
            }
            if print {
                println!("{}", hex::encode(container.as_der()));
            }
            Ok(())
        }
        Pkcs7Commands::Digest {
            payload,
            hash_alg: algorithm,
            output,
        } => {
            let data = safe_read_file(&payload)?;
            let digest = hash::calculate_digest(&data, algorithm);

            match output {
                Some(output) => {
                    safe_write_file(&output, &digest)?;
                    println!("Wrote {algorithm} digest to {}", output.display());
                }
                None => println!("{}", hex::encode(&digest)),
            }
            Ok(())
        }
    }
}

/// Read all inputs from disk and generate the container
pub fn generate_from_files(
    certs: &[PathBuf],
    credentials: &[PathBuf],
    mode: SigningMode,
    payload: &Path,
    hash_algorithm: HashAlgorithm,
) -> Result<Container> {
    if certs.len() != credentials.len() {
        let kind = match mode {
            SigningMode::PrivateKeys => "private key(s)",
            SigningMode::PrecomputedSignatures => "signature(s)",
        };
        return Err(Error::Validation(format!(
            "{} certificate(s) given but {} {kind}, every certificate needs exactly one",
            certs.len(),
            credentials.len()
        )));
    }

    let signers = certs
        .iter()
        .zip(credentials)
        .map(|(cert, credential)| {
            Ok(SignerEntry::new(
                safe_read_file(cert)?,
                safe_read_file(credential)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let request = SigningRequest {
        payload: safe_read_file(payload)?,
        hash_algorithm,
        mode,
        signers,
    };
    pkcs7::generate(&request)
}
