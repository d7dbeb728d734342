//! # TLV Emitter
//!
//! Writes single DER elements into a [`ReverseBuffer`]. Each [`Element`]
//! variant carries exactly what it needs to be encoded; constructed wrappers
//! carry the length of their already-written content, measured with
//! [`TlvEmitter::mark`] and [`TlvEmitter::written_since`] (or with
//! [`TlvEmitter::wrap`], which does both).
//!
//! Every emission is retried after growth when the buffer runs out of room.
//! Anything else that goes wrong is returned without retrying.

use super::buffer::{InsufficientSpace, Mark, ReverseBuffer};
use crate::error::{Error, Result};
use const_oid::ObjectIdentifier;

pub mod tag {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const CONTEXT_SPECIFIC_CONSTRUCTED: u8 = 0xA0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructedTag {
    Sequence,
    Set,
    /// `[n]` with the constructed bit set; `n` must be below 31.
    ContextSpecific(u8),
}

impl ConstructedTag {
    pub fn to_u8(self) -> u8 {
        match self {
            ConstructedTag::Sequence => tag::SEQUENCE,
            ConstructedTag::Set => tag::SET,
            ConstructedTag::ContextSpecific(n) => tag::CONTEXT_SPECIFIC_CONSTRUCTED | (n & 0x1F),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    /// Small INTEGER, minimal two's complement.
    Integer(i64),
    /// Tag and length header for content that is already in the buffer.
    Constructed {
        tag: ConstructedTag,
        content_len: usize,
    },
    /// `SEQUENCE { OID, params }`. With `params_len == 0` an explicit NULL is
    /// written as the parameters; otherwise the parameters are the
    /// `params_len` bytes already in the buffer.
    AlgorithmIdentifier {
        oid: &'a ObjectIdentifier,
        params_len: usize,
    },
    /// `SEQUENCE { OID }`, a content type without content.
    ContentType(&'a ObjectIdentifier),
    OctetString(&'a [u8]),
    /// Bytes that are already DER (certificates, names), copied verbatim.
    Raw(&'a [u8]),
    /// INTEGER from its content octets, for values wider than `i64` such as
    /// certificate serial numbers.
    LargeInteger(&'a [u8]),
}

impl Element<'_> {
    // Reject declarations that no amount of growth can satisfy.
    fn check(&self, written: usize) -> Result<()> {
        match self {
            Element::Constructed { tag, content_len } if *content_len > written => {
                Err(Error::Encoding(format!(
                    "{tag:?} declares {content_len} content bytes but only {written} are written"
                )))
            }
            Element::AlgorithmIdentifier { params_len, .. } if *params_len > written => {
                Err(Error::Encoding(format!(
                    "algorithm identifier declares {params_len} parameter bytes but only {written} are written"
                )))
            }
            Element::LargeInteger(content) if content.is_empty() => Err(Error::Encoding(
                "INTEGER content must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn write(&self, buf: &mut ReverseBuffer) -> std::result::Result<(), InsufficientSpace> {
        match *self {
            Element::Integer(value) => {
                let bytes = value.to_be_bytes();
                write_tlv(buf, tag::INTEGER, &bytes[redundant_prefix(&bytes)..])
            }
            Element::Constructed { tag, content_len } => {
                write_len(buf, content_len)?;
                buf.try_prepend(&[tag.to_u8()])
            }
            Element::AlgorithmIdentifier { oid, params_len } => {
                let before = buf.len();
                if params_len == 0 {
                    buf.try_prepend(&[tag::NULL, 0x00])?;
                }
                write_tlv(buf, tag::OID, oid.as_bytes())?;
                let content_len = buf.len() - before + params_len;
                write_len(buf, content_len)?;
                buf.try_prepend(&[tag::SEQUENCE])
            }
            Element::ContentType(oid) => {
                let before = buf.len();
                write_tlv(buf, tag::OID, oid.as_bytes())?;
                let content_len = buf.len() - before;
                write_len(buf, content_len)?;
                buf.try_prepend(&[tag::SEQUENCE])
            }
            Element::OctetString(content) => write_tlv(buf, tag::OCTET_STRING, content),
            Element::Raw(bytes) => buf.try_prepend(bytes),
            Element::LargeInteger(content) => write_tlv(buf, tag::INTEGER, content),
        }
    }
}

/// Owns the buffer for one generation call and writes elements into it.
pub struct TlvEmitter {
    buffer: ReverseBuffer,
}

impl TlvEmitter {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            buffer: ReverseBuffer::with_capacity(capacity)?,
        })
    }

    /// Write one element in front of everything written so far.
    ///
    /// Returns the number of bytes the element added.
    pub fn emit(&mut self, element: &Element<'_>) -> Result<usize> {
        element.check(self.buffer.len())?;
        self.buffer.write_retrying(|buf| element.write(buf))
    }

    pub fn mark(&self) -> Mark {
        self.buffer.mark()
    }

    pub fn written_since(&self, mark: Mark) -> usize {
        self.buffer.written_since(mark)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Emit the content with `children`, then the `tag` header declaring
    /// exactly the bytes `children` wrote.
    ///
    /// Returns the size of the whole wrapped element.
    pub fn wrap<F>(&mut self, tag: ConstructedTag, children: F) -> Result<usize>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mark = self.mark();
        children(self)?;
        let content_len = self.written_since(mark);
        self.emit(&Element::Constructed { tag, content_len })?;
        Ok(self.written_since(mark))
    }

    pub fn into_buffer(self) -> ReverseBuffer {
        self.buffer
    }
}

fn write_tlv(
    buf: &mut ReverseBuffer,
    tag: u8,
    content: &[u8],
) -> std::result::Result<(), InsufficientSpace> {
    buf.try_prepend(content)?;
    write_len(buf, content.len())?;
    buf.try_prepend(&[tag])
}

fn write_len(buf: &mut ReverseBuffer, len: usize) -> std::result::Result<(), InsufficientSpace> {
    if len < 0x80 {
        return buf.try_prepend(&[len as u8]);
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    buf.try_prepend(significant)?;
    buf.try_prepend(&[0x80 | significant.len() as u8])
}

// Leading octets a minimal two's complement encoding drops.
fn redundant_prefix(bytes: &[u8]) -> usize {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let next_negative = bytes[start + 1] & 0x80 != 0;
        let redundant = (bytes[start] == 0x00 && !next_negative)
            || (bytes[start] == 0xFF && next_negative);
        if !redundant {
            break;
        }
        start += 1;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::oid;

    fn encode(element: &Element<'_>) -> Result<Vec<u8>> {
        let mut emitter = TlvEmitter::with_capacity(2)?;
        emitter.emit(element)?;
        emitter.into_buffer().into_trimmed()
    }

    #[test]
    fn test_small_integers() -> Result<()> {
        assert_eq!(encode(&Element::Integer(1))?, vec![0x02, 0x01, 0x01]);
        assert_eq!(encode(&Element::Integer(0))?, vec![0x02, 0x01, 0x00]);
        assert_eq!(encode(&Element::Integer(128))?, vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(encode(&Element::Integer(256))?, vec![0x02, 0x02, 0x01, 0x00]);
        assert_eq!(encode(&Element::Integer(-1))?, vec![0x02, 0x01, 0xFF]);
        assert_eq!(encode(&Element::Integer(-129))?, vec![0x02, 0x02, 0xFF, 0x7F]);
        Ok(())
    }

    #[test]
    fn test_algorithm_identifier_with_null_params() -> Result<()> {
        let der = encode(&Element::AlgorithmIdentifier {
            oid: &oid::SHA256,
            params_len: 0,
        })?;
        let mut expected = vec![0x30, 0x0D, 0x06, 0x09];
        expected.extend_from_slice(oid::SHA256.as_bytes());
        expected.extend_from_slice(&[0x05, 0x00]);
        assert_eq!(der, expected);
        Ok(())
    }

    #[test]
    fn test_algorithm_identifier_wraps_written_params() -> Result<()> {
        let mut emitter = TlvEmitter::with_capacity(2)?;
        emitter.emit(&Element::Raw(&[0xA0, 0x00]))?;
        let params_len = emitter.len();
        emitter.emit(&Element::AlgorithmIdentifier {
            oid: &oid::PKCS7_SIGNED_DATA,
            params_len,
        })?;
        let der = emitter.into_buffer().into_trimmed()?;

        let mut expected = vec![0x30, 0x0D, 0x06, 0x09];
        expected.extend_from_slice(oid::PKCS7_SIGNED_DATA.as_bytes());
        expected.extend_from_slice(&[0xA0, 0x00]);
        assert_eq!(der, expected);
        Ok(())
    }

    #[test]
    fn test_content_type_has_no_params() -> Result<()> {
        let der = encode(&Element::ContentType(&oid::PKCS7_DATA))?;
        let mut expected = vec![0x30, 0x0B, 0x06, 0x09];
        expected.extend_from_slice(oid::PKCS7_DATA.as_bytes());
        assert_eq!(der, expected);
        Ok(())
    }

    #[test]
    fn test_long_form_lengths() -> Result<()> {
        let content = vec![0xAB; 300];
        let der = encode(&Element::OctetString(&content))?;
        assert_eq!(&der[..4], &[0x04, 0x82, 0x01, 0x2C]);
        assert_eq!(der.len(), 304);

        let content = vec![0xCD; 200];
        let der = encode(&Element::OctetString(&content))?;
        assert_eq!(&der[..3], &[0x04, 0x81, 0xC8]);
        Ok(())
    }

    #[test]
    fn test_raw_and_large_integer() -> Result<()> {
        assert_eq!(encode(&Element::Raw(&[1, 2, 3]))?, vec![1, 2, 3]);
        assert_eq!(
            encode(&Element::LargeInteger(&[0x00, 0x80, 0x01]))?,
            vec![0x02, 0x03, 0x00, 0x80, 0x01]
        );
        assert!(matches!(
            encode(&Element::LargeInteger(&[])),
            Err(Error::Encoding(_))
        ));
        Ok(())
    }

    #[test]
    fn test_wrap_measures_children() -> Result<()> {
        let mut emitter = TlvEmitter::with_capacity(2)?;
        let total = emitter.wrap(ConstructedTag::Set, |em| {
            em.emit(&Element::Integer(2))?;
            em.emit(&Element::Integer(1))?;
            Ok(())
        })?;
        assert_eq!(total, 8);

        emitter.wrap(ConstructedTag::ContextSpecific(0), |_| Ok(()))?;
        let der = emitter.into_buffer().into_trimmed()?;
        assert_eq!(
            der,
            vec![0xA0, 0x00, 0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]
        );
        Ok(())
    }

    #[test]
    fn test_overlong_declaration_is_rejected() -> Result<()> {
        let mut emitter = TlvEmitter::with_capacity(16)?;
        emitter.emit(&Element::Integer(5))?;
        let err = emitter
            .emit(&Element::Constructed {
                tag: ConstructedTag::Sequence,
                content_len: 4,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(emitter.len(), 3);
        Ok(())
    }
}
