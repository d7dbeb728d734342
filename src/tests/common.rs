use crate::error::{Error, Result};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509, X509NameBuilder};

/// A self-signed signer with its key, in the encodings the generator takes
pub struct TestSigner {
    pub key: PKey<Private>,
    pub cert: X509,
    pub cert_der: Vec<u8>,
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl TestSigner {
    pub fn entry(&self) -> crate::pkcs7::SignerEntry {
        crate::pkcs7::SignerEntry::new(self.cert_pem.clone(), self.key_pem.clone())
    }
}

/// Generate an RSA 2048 signer with a self-signed certificate
pub fn generate_signer(common_name: &str, serial: u32) -> Result<TestSigner> {
    let key = PKey::from_rsa(Rsa::generate(2048)?)?;
    build_signer(common_name, serial, key)
}

/// Generate a P-256 signer, which the generator must refuse
pub fn generate_ec_signer(common_name: &str) -> Result<TestSigner> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1)?;
    let key = PKey::from_ec_key(EcKey::generate(&group)?)?;
    build_signer(common_name, 1, key)
}

fn build_signer(common_name: &str, serial: u32, key: PKey<Private>) -> Result<TestSigner> {
    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_text("C", "US")?;
    name.append_entry_by_text("O", "Test Signers")?;
    name.append_entry_by_text("CN", common_name)?;
    let name = name.build();

    let mut builder = X509::builder()?;
    builder.set_version(2)?;
    let serial = BigNum::from_u32(serial)?.to_asn1_integer()?;
    builder.set_serial_number(&serial)?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;
    builder.set_pubkey(&key)?;
    builder.set_not_before(Asn1Time::days_from_now(0)?.as_ref())?;
    builder.set_not_after(Asn1Time::days_from_now(365)?.as_ref())?;
    builder.sign(&key, MessageDigest::sha256())?;
    let cert = builder.build();

    Ok(TestSigner {
        cert_der: cert.to_der()?,
        cert_pem: cert.to_pem()?,
        key_pem: key.private_key_to_pem_pkcs8()?,
        key,
        cert,
    })
}

pub mod tag {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const CONTEXT_0: u8 = 0xA0;
}

/// One decoded TLV; `raw` covers header and content
#[derive(Debug, Clone, Copy)]
pub struct Tlv<'a> {
    pub tag: u8,
    pub content: &'a [u8],
    pub raw: &'a [u8],
}

impl Tlv<'_> {
    pub fn is_constructed(&self) -> bool {
        self.tag & 0x20 != 0
    }
}

/// Decode the TLV at the start of `input`, returning it and the remainder
pub fn read_tlv(input: &[u8]) -> Result<(Tlv<'_>, &[u8])> {
    let malformed = |what: &str| Error::Encoding(format!("malformed DER: {what}"));

    let (&tag, rest) = input.split_first().ok_or_else(|| malformed("missing tag"))?;
    let (&first, rest) = rest.split_first().ok_or_else(|| malformed("missing length"))?;

    let (len, rest) = if first < 0x80 {
        (first as usize, rest)
    } else {
        let count = (first & 0x7F) as usize;
        if count == 0 || count > std::mem::size_of::<usize>() || rest.len() < count {
            return Err(malformed("bad long form length"));
        }
        let (bytes, rest) = rest.split_at(count);
        if bytes[0] == 0 || (count == 1 && bytes[0] < 0x80) {
            return Err(malformed("non-minimal length"));
        }
        let len = bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (len, rest)
    };

    if rest.len() < len {
        return Err(malformed("content runs past the end"));
    }
    let header_len = input.len() - rest.len();
    let (content, remainder) = rest.split_at(len);
    Ok((
        Tlv {
            tag,
            content,
            raw: &input[..header_len + len],
        },
        remainder,
    ))
}

/// Decode exactly one TLV spanning all of `input`
pub fn read_single(input: &[u8]) -> Result<Tlv<'_>> {
    let (tlv, rest) = read_tlv(input)?;
    if !rest.is_empty() {
        return Err(Error::Encoding(format!(
            "{} trailing bytes after element",
            rest.len()
        )));
    }
    Ok(tlv)
}

/// Decode the consecutive TLVs making up a constructed element's content
pub fn read_children(mut content: &[u8]) -> Result<Vec<Tlv<'_>>> {
    let mut children = Vec::new();
    while !content.is_empty() {
        let (tlv, rest) = read_tlv(content)?;
        children.push(tlv);
        content = rest;
    }
    Ok(children)
}

/// Walk every constructed element and check that lengths nest exactly
pub fn assert_well_formed(der: &[u8]) -> Result<()> {
    fn walk(tlv: &Tlv<'_>) -> Result<()> {
        if tlv.is_constructed() {
            for child in read_children(tlv.content)? {
                walk(&child)?;
            }
        }
        Ok(())
    }
    walk(&read_single(der)?)
}
