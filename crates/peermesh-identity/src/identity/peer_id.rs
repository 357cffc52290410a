//! PeerId: the canonical identifier a peer derives from its public key.
//!
//! The binary form is a multihash over the protobuf-encoded public key:
//! the identity multihash (`0x00 ‖ varint(len) ‖ proto`) for curve keys,
//! and the SHA-256 multihash (`0x12 0x20 ‖ digest`) for RSA, whose keys are
//! too large to inline.
//!
//! The modern string form wraps the multihash in a CIDv1 with the
//! `libp2p-key` codec and renders it as multibase base32:
//! `'b' ‖ base32(0x01 0x72 ‖ multihash)`. The legacy form is the base58btc
//! encoding of the bare multihash.
//!
//! SHA-256 reference: `sha2` crate (RustCrypto, MIT/Apache-2.0)

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{IdentityError, Result};
use crate::identity::keypair::{PublicKey, RawKey};
use crate::multibase;
use crate::wire::{read_varint, write_varint, KeyType, PublicKeyProto};

/// CID version 1 marker.
const CIDV1: u8 = 0x01;
/// Multicodec for `libp2p-key`.
const CODEC_LIBP2P_KEY: u8 = 0x72;
/// Multihash code for the identity (no-hash) passthrough.
const MULTIHASH_IDENTITY: u8 = 0x00;
/// Multihash code for SHA-256.
const MULTIHASH_SHA2_256: u8 = 0x12;
/// SHA-256 digest length.
const SHA2_256_LENGTH: u8 = 0x20;

/// A peer identifier derived from a public key.
///
/// Carries the raw public key bytes for curve keys and the SHA-256 of the
/// protobuf encoding for RSA. Two PeerIds are equal iff they have the same
/// key type and the same bytes; the comparison is constant-time.
#[derive(Clone)]
pub struct PeerId {
    key_type: KeyType,
    /// Raw key material (Ed25519 32 B, ECDSA 64 B, Secp256k1 33 B) or, for
    /// RSA, the 32-byte SHA-256 of the protobuf encoding.
    key_bytes: Vec<u8>,
    /// The protobuf encoding wrapped by the identity multihash. Preserved
    /// verbatim so reparsed ids render back to the exact same string. Empty
    /// for ids recovered from a SHA-256 multihash.
    proto: Vec<u8>,
}

impl PeerId {
    /// Derive the PeerId of a public key.
    pub fn from_public_key(key: &PublicKey) -> Result<Self> {
        let proto = key.to_protobuf()?;
        let key_bytes = match key {
            PublicKey::Ed25519(pk) => pk.to_bytes().to_vec(),
            PublicKey::Ecdsa(pk) => pk.to_raw_bytes().to_vec(),
        };
        Ok(Self {
            key_type: key.key_type(),
            key_bytes,
            proto,
        })
    }

    /// Derive a PeerId from protobuf-encoded public-key bytes.
    ///
    /// Curve keys are length-validated and inlined; RSA keys are identified
    /// by the SHA-256 of the encoding.
    pub fn from_protobuf_bytes(bytes: &[u8]) -> Result<Self> {
        let proto = PublicKeyProto::decode(bytes)?;
        if proto.key_type == KeyType::Rsa {
            return Ok(Self {
                key_type: KeyType::Rsa,
                key_bytes: Sha256::digest(bytes).to_vec(),
                proto: bytes.to_vec(),
            });
        }
        let raw = RawKey::from_protobuf(bytes)?;
        Ok(Self {
            key_type: raw.key_type(),
            key_bytes: raw.as_bytes().to_vec(),
            proto: bytes.to_vec(),
        })
    }

    /// Parse the modern multibase string form.
    ///
    /// Only the base32-lowercase prefix `'b'` is accepted; any other leading
    /// character fails with [`IdentityError::NotMultibase32`].
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(multibase::MULTIBASE_BASE32_PREFIX)
            .ok_or(IdentityError::NotMultibase32)?;
        let bytes = multibase::base32_decode(rest)?;

        if bytes.len() < 2 || bytes[0] != CIDV1 || bytes[1] != CODEC_LIBP2P_KEY {
            return Err(IdentityError::InvalidCid(format!(
                "expected CIDv1 libp2p-key header 01 72, got {:02x?}",
                &bytes[..bytes.len().min(2)]
            )));
        }

        let mut multihash = &bytes[2..];
        match multihash.first() {
            Some(&MULTIHASH_IDENTITY) => {
                multihash = &multihash[1..];
                let len = read_varint(&mut multihash)? as usize;
                if multihash.len() != len {
                    return Err(IdentityError::InvalidCid(format!(
                        "identity multihash length {len} does not match payload {}",
                        multihash.len()
                    )));
                }
                Self::from_protobuf_bytes(multihash)
            }
            Some(&MULTIHASH_SHA2_256) => {
                let digest = &multihash[1..];
                if digest.first() != Some(&SHA2_256_LENGTH)
                    || digest.len() != 1 + SHA2_256_LENGTH as usize
                {
                    return Err(IdentityError::InvalidCid(
                        "malformed sha2-256 multihash".into(),
                    ));
                }
                Ok(Self {
                    key_type: KeyType::Rsa,
                    key_bytes: digest[1..].to_vec(),
                    proto: Vec::new(),
                })
            }
            _ => Err(IdentityError::InvalidCid(
                "unsupported multihash code".into(),
            )),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Raw key bytes (curve keys) or the protobuf digest (RSA).
    pub fn as_bytes(&self) -> &[u8] {
        &self.key_bytes
    }

    /// The multihash this id renders from.
    pub fn to_multihash(&self) -> Vec<u8> {
        match self.key_type {
            KeyType::Rsa => {
                let mut out = Vec::with_capacity(2 + self.key_bytes.len());
                out.push(MULTIHASH_SHA2_256);
                out.push(SHA2_256_LENGTH);
                out.extend_from_slice(&self.key_bytes);
                out
            }
            _ => {
                let mut out = Vec::with_capacity(2 + self.proto.len());
                out.push(MULTIHASH_IDENTITY);
                write_varint(&mut out, self.proto.len() as u64);
                out.extend_from_slice(&self.proto);
                out
            }
        }
    }

    /// Legacy string form: base58btc of the bare multihash.
    pub fn to_legacy_string(&self) -> String {
        multibase::base58_encode(&self.to_multihash())
    }
}

impl std::fmt::Display for PeerId {
    /// Modern string form: `'b' ‖ base32(0x01 0x72 ‖ multihash)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let multihash = self.to_multihash();
        let mut cid = Vec::with_capacity(2 + multihash.len());
        cid.push(CIDV1);
        cid.push(CODEC_LIBP2P_KEY);
        cid.extend_from_slice(&multihash);
        write!(
            f,
            "{}{}",
            multibase::MULTIBASE_BASE32_PREFIX,
            multibase::base32_encode(&cid)
        )
    }
}

impl std::fmt::Debug for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PeerId({self})")
    }
}

impl PartialEq for PeerId {
    fn eq(&self, other: &Self) -> bool {
        self.key_type == other.key_type && bool::from(self.key_bytes.ct_eq(&other.key_bytes))
    }
}

impl Eq for PeerId {}

impl std::hash::Hash for PeerId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.key_type as u8).hash(state);
        self.key_bytes.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::keypair::Keypair;

    /// A fixed Ed25519 public-key protobuf for deterministic tests.
    fn fixed_ed25519_proto() -> Vec<u8> {
        hex::decode("080112203fe927b823dd7dd796ff052e31d0a6e736caf05764e5ecc2ab8588f307c06179")
            .unwrap()
    }

    #[test]
    fn modern_string_starts_with_b() {
        let id = PeerId::from_protobuf_bytes(&fixed_ed25519_proto()).unwrap();
        assert!(id.to_string().starts_with('b'));
    }

    #[test]
    fn modern_string_wraps_cid_and_identity_multihash() {
        let proto = fixed_ed25519_proto();
        let id = PeerId::from_protobuf_bytes(&proto).unwrap();
        let decoded = multibase::base32_decode(&id.to_string()[1..]).unwrap();

        let mut expected = vec![0x01, 0x72, 0x00, proto.len() as u8];
        expected.extend_from_slice(&proto);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn parse_roundtrip_ed25519() {
        let kp = Keypair::generate_ed25519();
        let id = kp.public().to_peer_id().unwrap();
        let parsed = PeerId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), id.to_string());
    }

    #[test]
    fn parse_roundtrip_ecdsa() {
        let kp = Keypair::generate_ecdsa();
        let id = kp.public().to_peer_id().unwrap();
        let parsed = PeerId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), id.to_string());
    }

    #[test]
    fn spki_and_legacy_ecdsa_encodings_name_the_same_peer() {
        let kp = Keypair::generate_ecdsa();
        let canonical = PeerId::from_protobuf_bytes(&kp.public().to_protobuf().unwrap()).unwrap();
        let legacy = PeerId::from_protobuf_bytes(&kp.public().to_protobuf_legacy()).unwrap();
        // Different strings (the wrapped protobuf differs), same identity.
        assert_ne!(canonical.to_string(), legacy.to_string());
        assert_eq!(canonical, legacy);
    }

    #[test]
    fn rejects_non_base32_prefix() {
        let kp = Keypair::generate_ed25519();
        let s = kp.public().to_peer_id().unwrap().to_string();
        for prefix in ['z', 'B', 'Q', 'f'] {
            let mutated = format!("{prefix}{}", &s[1..]);
            assert!(matches!(
                PeerId::parse(&mutated),
                Err(IdentityError::NotMultibase32)
            ));
        }
    }

    #[test]
    fn rejects_bad_cid_header() {
        // Valid base32 payload, wrong CID bytes.
        let payload = multibase::base32_encode(&[0x02, 0x72, 0x00, 0x00]);
        assert!(matches!(
            PeerId::parse(&format!("b{payload}")),
            Err(IdentityError::InvalidCid(_))
        ));
    }

    #[test]
    fn rejects_length_mismatch_in_identity_multihash() {
        let mut cid = vec![0x01, 0x72, 0x00, 0x05];
        cid.extend_from_slice(&[0xaa; 3]);
        let s = format!("b{}", multibase::base32_encode(&cid));
        assert!(matches!(
            PeerId::parse(&s),
            Err(IdentityError::InvalidCid(_))
        ));
    }

    #[test]
    fn legacy_string_for_ed25519_uses_identity_multihash() {
        let id = PeerId::from_protobuf_bytes(&fixed_ed25519_proto()).unwrap();
        // base58 of a multihash starting 0x00 0x24 0x08 0x01 0x12 0x20 — the
        // well-known "12D3KooW" shape of Ed25519 peer ids.
        assert!(id.to_legacy_string().starts_with("12D3KooW"));
    }

    #[test]
    fn rsa_peer_id_is_sha256_of_protobuf() {
        let proto = PublicKeyProto {
            key_type: KeyType::Rsa,
            data: vec![0x30, 0x0d, 0x06, 0x09], // placeholder DER material
        }
        .encode();
        let id = PeerId::from_protobuf_bytes(&proto).unwrap();
        let mut expected = vec![0x12, 0x20];
        expected.extend_from_slice(&Sha256::digest(&proto));
        assert_eq!(id.to_multihash(), expected);
        assert!(id.to_legacy_string().starts_with("Qm"));
    }

    #[test]
    fn rsa_parse_roundtrip() {
        let proto = PublicKeyProto {
            key_type: KeyType::Rsa,
            data: vec![0xaa; 16],
        }
        .encode();
        let id = PeerId::from_protobuf_bytes(&proto).unwrap();
        let parsed = PeerId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), id.to_string());
    }

    #[test]
    fn equality_across_key_types_is_false() {
        let ed = Keypair::generate_ed25519().public().to_peer_id().unwrap();
        let ec = Keypair::generate_ecdsa().public().to_peer_id().unwrap();
        assert_ne!(ed, ec);
    }

    #[test]
    fn different_keys_produce_different_ids() {
        let a = Keypair::generate_ed25519().public().to_peer_id().unwrap();
        let b = Keypair::generate_ed25519().public().to_peer_id().unwrap();
        assert_ne!(a, b);
    }
}
