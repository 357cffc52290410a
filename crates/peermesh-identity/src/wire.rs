//! Protobuf wire codec for the peer public-key envelope.
//!
//! The on-wire form of a public key is the two-field protobuf message
//!
//! ```text
//! message PublicKey { required KeyType Type = 1; required bytes Data = 2; }
//! ```
//!
//! encoded as `0x08 <type varint> 0x12 <len varint> <data…>`. Encoding is
//! deterministic (field 1, then field 2). Decoding accepts the two fields in
//! either order but rejects any other tag, so a certificate extension cannot
//! smuggle extra fields past the codec.
//!
//! The varint helpers implement unsigned LEB128 as used by protobuf and by
//! the multihash length prefix.

use bytes::Buf;

use crate::error::{IdentityError, Result};

/// Protobuf field number of the key-type enum.
const FIELD_KEY_TYPE: u64 = 1;
/// Protobuf field number of the key material.
const FIELD_DATA: u64 = 2;

const WIRE_VARINT: u64 = 0;
const WIRE_LENGTH_DELIMITED: u64 = 2;

/// Key-type discriminants, wire-compatible with the libp2p `KeyType` enum.
///
/// RSA and Secp256k1 are understood on the wire but carry no signing or
/// verification support; operations on them fail with
/// [`IdentityError::UnsupportedKeyType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyType {
    Rsa = 0,
    Ed25519 = 1,
    Secp256k1 = 2,
    Ecdsa = 3,
}

impl TryFrom<u64> for KeyType {
    type Error = IdentityError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(KeyType::Rsa),
            1 => Ok(KeyType::Ed25519),
            2 => Ok(KeyType::Secp256k1),
            3 => Ok(KeyType::Ecdsa),
            other => Err(IdentityError::UnknownKeyType(other)),
        }
    }
}

/// Append an unsigned LEB128 varint to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Read an unsigned LEB128 varint, advancing the cursor past it.
///
/// Fails with [`IdentityError::MalformedVarint`] on truncation or when the
/// encoding would overflow 64 bits.
pub fn read_varint(buf: &mut &[u8]) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        if !buf.has_remaining() {
            return Err(IdentityError::MalformedVarint);
        }
        let byte = buf.get_u8();
        if shift == 63 && byte > 1 {
            return Err(IdentityError::MalformedVarint);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(IdentityError::MalformedVarint);
        }
    }
}

/// The decoded `PublicKey` protobuf message.
///
/// `data` is the raw key material for Ed25519 (32 bytes) and either the
/// SubjectPublicKeyInfo DER or the legacy 64-byte X‖Y form for ECDSA; the
/// higher identity layer normalizes it. This type only guarantees wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyProto {
    pub key_type: KeyType,
    pub data: Vec<u8>,
}

impl PublicKeyProto {
    /// Deterministic encoding: field 1 (varint), then field 2 (bytes).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.data.len());
        write_varint(&mut buf, (FIELD_KEY_TYPE << 3) | WIRE_VARINT);
        write_varint(&mut buf, self.key_type as u64);
        write_varint(&mut buf, (FIELD_DATA << 3) | WIRE_LENGTH_DELIMITED);
        write_varint(&mut buf, self.data.len() as u64);
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Strict decoder: both fields required, unknown tags rejected, trailing
    /// bytes impossible (the loop consumes the whole input or fails).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buf = bytes;
        let mut key_type = None;
        let mut data = None;

        while !buf.is_empty() {
            let key = read_varint(&mut buf)?;
            match (key >> 3, key & 0x7) {
                (FIELD_KEY_TYPE, WIRE_VARINT) => {
                    key_type = Some(KeyType::try_from(read_varint(&mut buf)?)?);
                }
                (FIELD_DATA, WIRE_LENGTH_DELIMITED) => {
                    let len = read_varint(&mut buf)? as usize;
                    if buf.len() < len {
                        return Err(IdentityError::Truncated {
                            expected: len,
                            actual: buf.len(),
                        });
                    }
                    data = Some(buf[..len].to_vec());
                    buf.advance(len);
                }
                _ => return Err(IdentityError::UnknownFieldTag(key)),
            }
        }

        let key_type = key_type.ok_or(IdentityError::MissingField("Type"))?;
        let data = data.ok_or(IdentityError::MissingField("Data"))?;
        Ok(Self { key_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_single_byte_values() {
        for value in [0u64, 1, 127] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.len(), 1);
            assert_eq!(read_varint(&mut buf.as_slice()).unwrap(), value);
        }
    }

    #[test]
    fn varint_multi_byte_roundtrip() {
        for value in [128u64, 300, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            let mut cursor = buf.as_slice();
            assert_eq!(read_varint(&mut cursor).unwrap(), value);
            assert!(cursor.is_empty());
        }
    }

    #[test]
    fn varint_known_encoding() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 300);
        assert_eq!(buf, vec![0xac, 0x02]);
    }

    #[test]
    fn varint_rejects_truncation() {
        let mut cursor: &[u8] = &[0x80];
        assert!(matches!(
            read_varint(&mut cursor),
            Err(IdentityError::MalformedVarint)
        ));
    }

    #[test]
    fn varint_rejects_overflow() {
        // Eleven continuation bytes cannot fit in 64 bits.
        let mut cursor: &[u8] = &[0xff; 11];
        assert!(matches!(
            read_varint(&mut cursor),
            Err(IdentityError::MalformedVarint)
        ));
    }

    #[test]
    fn proto_encode_is_deterministic() {
        let proto = PublicKeyProto {
            key_type: KeyType::Ed25519,
            data: vec![0xab; 32],
        };
        let encoded = proto.encode();
        assert_eq!(encoded[0], 0x08);
        assert_eq!(encoded[1], 0x01);
        assert_eq!(encoded[2], 0x12);
        assert_eq!(encoded[3], 32);
        assert_eq!(encoded.len(), 36);
        assert_eq!(proto.encode(), encoded);
    }

    #[test]
    fn proto_decode_roundtrip() {
        let proto = PublicKeyProto {
            key_type: KeyType::Ecdsa,
            data: vec![1, 2, 3, 4],
        };
        assert_eq!(PublicKeyProto::decode(&proto.encode()).unwrap(), proto);
    }

    #[test]
    fn proto_decode_accepts_reversed_field_order() {
        // Field 2 first, then field 1.
        let mut buf = vec![0x12, 0x03, 0xaa, 0xbb, 0xcc];
        buf.extend_from_slice(&[0x08, 0x01]);
        let proto = PublicKeyProto::decode(&buf).unwrap();
        assert_eq!(proto.key_type, KeyType::Ed25519);
        assert_eq!(proto.data, vec![0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn proto_rejects_unknown_tag() {
        // Field 3, varint wire type.
        let buf = [0x08, 0x01, 0x12, 0x01, 0xaa, 0x18, 0x05];
        assert!(matches!(
            PublicKeyProto::decode(&buf),
            Err(IdentityError::UnknownFieldTag(0x18))
        ));
    }

    #[test]
    fn proto_rejects_missing_fields() {
        assert!(matches!(
            PublicKeyProto::decode(&[0x08, 0x01]),
            Err(IdentityError::MissingField("Data"))
        ));
        assert!(matches!(
            PublicKeyProto::decode(&[0x12, 0x01, 0xaa]),
            Err(IdentityError::MissingField("Type"))
        ));
        assert!(matches!(
            PublicKeyProto::decode(&[]),
            Err(IdentityError::MissingField(_))
        ));
    }

    #[test]
    fn proto_rejects_truncated_data() {
        let buf = [0x08, 0x01, 0x12, 0x20, 0xaa];
        assert!(matches!(
            PublicKeyProto::decode(&buf),
            Err(IdentityError::Truncated { .. })
        ));
    }

    #[test]
    fn proto_rejects_unknown_key_type() {
        let buf = [0x08, 0x07, 0x12, 0x01, 0xaa];
        assert!(matches!(
            PublicKeyProto::decode(&buf),
            Err(IdentityError::UnknownKeyType(7))
        ));
    }
}
