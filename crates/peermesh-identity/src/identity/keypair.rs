//! Keypair, public-key, and raw-key sum types over the supported curves.
//!
//! Exactly one curve per value, matched exhaustively. RSA and Secp256k1 exist
//! in [`KeyType`] for wire compatibility: their material can be decoded and
//! turned into a PeerId, but signing and verification fail with
//! [`IdentityError::UnsupportedKeyType`].

use subtle::ConstantTimeEq;

use crate::error::{IdentityError, Result};
use crate::identity::ecdsa::{self, EcdsaKeypair, EcdsaPublicKey};
use crate::identity::ed25519::{self, Ed25519Keypair, Ed25519PublicKey};
use crate::identity::peer_id::PeerId;
use crate::wire::{KeyType, PublicKeyProto};

/// Compressed SEC1 length of a secp256k1 public key, accepted on decode.
const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;

/// A signing keypair: the long-term host identity or an ephemeral
/// per-connection certificate key.
pub enum Keypair {
    Ed25519(Ed25519Keypair),
    Ecdsa(EcdsaKeypair),
}

impl Keypair {
    /// Generate a fresh Ed25519 keypair.
    pub fn generate_ed25519() -> Self {
        Keypair::Ed25519(Ed25519Keypair::generate())
    }

    /// Generate a fresh ECDSA-P-256 keypair.
    pub fn generate_ecdsa() -> Self {
        Keypair::Ecdsa(EcdsaKeypair::generate())
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            Keypair::Ed25519(_) => KeyType::Ed25519,
            Keypair::Ecdsa(_) => KeyType::Ecdsa,
        }
    }

    /// Returns the public half.
    pub fn public(&self) -> PublicKey {
        match self {
            Keypair::Ed25519(kp) => PublicKey::Ed25519(kp.public()),
            Keypair::Ecdsa(kp) => PublicKey::Ecdsa(kp.public()),
        }
    }

    /// Sign a message with the curve's native signature format: 64 raw bytes
    /// for Ed25519, DER for ECDSA.
    pub fn sign(&self, msg: &[u8]) -> Result<Signature> {
        match self {
            Keypair::Ed25519(kp) => Ok(Signature::from(kp.sign(msg)?.to_vec())),
            Keypair::Ecdsa(kp) => Ok(Signature::from(kp.sign(msg)?)),
        }
    }

    /// Returns the PKCS#8 DER encoding for certificate generation.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        match self {
            Keypair::Ed25519(kp) => kp.to_pkcs8_der(),
            Keypair::Ecdsa(kp) => kp.to_pkcs8_der(),
        }
    }
}

/// The public half of a [`Keypair`], or a peer key parsed off the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519(Ed25519PublicKey),
    Ecdsa(EcdsaPublicKey),
}

impl PublicKey {
    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::Ed25519(_) => KeyType::Ed25519,
            PublicKey::Ecdsa(_) => KeyType::Ecdsa,
        }
    }

    /// Verify a signature over `msg`. Malformed signatures return `false`.
    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        match self {
            PublicKey::Ed25519(pk) => pk.verify(msg, sig),
            PublicKey::Ecdsa(pk) => pk.verify(msg, sig),
        }
    }

    /// Canonical protobuf encoding of this key.
    ///
    /// ECDSA keys encode their SubjectPublicKeyInfo DER as the `Data` field,
    /// matching the libp2p peer-identity registry. Implementations that
    /// predate that clarification put the raw X‖Y bytes there instead; see
    /// [`PublicKey::to_protobuf_legacy`].
    pub fn to_protobuf(&self) -> Result<Vec<u8>> {
        let data = match self {
            PublicKey::Ed25519(pk) => pk.to_bytes().to_vec(),
            PublicKey::Ecdsa(pk) => pk.to_spki_der()?,
        };
        Ok(PublicKeyProto {
            key_type: self.key_type(),
            data,
        }
        .encode())
    }

    /// Compatibility encoding: ECDSA `Data` is the raw 64-byte X‖Y form.
    /// Identical to [`PublicKey::to_protobuf`] for Ed25519.
    pub fn to_protobuf_legacy(&self) -> Vec<u8> {
        let data = match self {
            PublicKey::Ed25519(pk) => pk.to_bytes().to_vec(),
            PublicKey::Ecdsa(pk) => pk.to_raw_bytes().to_vec(),
        };
        PublicKeyProto {
            key_type: self.key_type(),
            data,
        }
        .encode()
    }

    /// Decode a protobuf-encoded public key. Both the SPKI and the raw X‖Y
    /// `Data` forms are accepted for ECDSA. RSA and Secp256k1 material is
    /// rejected with [`IdentityError::UnsupportedKeyType`]; use
    /// [`RawKey::from_protobuf`] to identify such peers without verifying
    /// their signatures.
    pub fn from_protobuf(bytes: &[u8]) -> Result<Self> {
        let proto = PublicKeyProto::decode(bytes)?;
        match proto.key_type {
            KeyType::Ed25519 => {
                let raw: &[u8; ed25519::PUBLIC_KEY_LENGTH] =
                    proto.data.as_slice().try_into().map_err(|_| {
                        IdentityError::InvalidKeyLength {
                            key_type: KeyType::Ed25519,
                            expected: ed25519::PUBLIC_KEY_LENGTH,
                            actual: proto.data.len(),
                        }
                    })?;
                Ok(PublicKey::Ed25519(Ed25519PublicKey::from_bytes(raw)?))
            }
            KeyType::Ecdsa => {
                let pk = if proto.data.len() == ecdsa::RAW_PUBLIC_KEY_LENGTH {
                    EcdsaPublicKey::from_raw_bytes(&proto.data)?
                } else {
                    EcdsaPublicKey::from_spki_der(&proto.data)?
                };
                Ok(PublicKey::Ecdsa(pk))
            }
            other => Err(IdentityError::UnsupportedKeyType(other)),
        }
    }

    /// Returns the SubjectPublicKeyInfo DER encoding.
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        match self {
            PublicKey::Ed25519(pk) => pk.to_spki_der(),
            PublicKey::Ecdsa(pk) => pk.to_spki_der(),
        }
    }

    /// Derive the PeerId naming this key.
    pub fn to_peer_id(&self) -> Result<PeerId> {
        PeerId::from_public_key(self)
    }
}

/// Length-validated raw key material, as recovered from a verified
/// certificate or a decoded protobuf.
///
/// Holds the raw public bytes (Ed25519 32 B, ECDSA 64 B X‖Y, Secp256k1 33 B
/// compressed) or, for RSA, the DER key material as found on the wire.
/// Comparison is constant-time.
#[derive(Debug, Clone)]
pub struct RawKey {
    key_type: KeyType,
    data: Vec<u8>,
}

impl RawKey {
    /// Decode and length-validate a protobuf-encoded public key. Unlike
    /// [`PublicKey::from_protobuf`] this accepts RSA and Secp256k1 material,
    /// which can name a peer but not verify signatures.
    pub fn from_protobuf(bytes: &[u8]) -> Result<Self> {
        let proto = PublicKeyProto::decode(bytes)?;
        let data = match proto.key_type {
            KeyType::Ed25519 => {
                check_length(KeyType::Ed25519, ed25519::PUBLIC_KEY_LENGTH, &proto.data)?;
                proto.data
            }
            KeyType::Ecdsa => {
                if proto.data.len() == ecdsa::RAW_PUBLIC_KEY_LENGTH {
                    proto.data
                } else {
                    // SPKI form; normalize to raw X‖Y.
                    EcdsaPublicKey::from_spki_der(&proto.data)?
                        .to_raw_bytes()
                        .to_vec()
                }
            }
            KeyType::Secp256k1 => {
                check_length(KeyType::Secp256k1, SECP256K1_PUBLIC_KEY_LENGTH, &proto.data)?;
                proto.data
            }
            KeyType::Rsa => proto.data,
        };
        Ok(Self {
            key_type: proto.key_type,
            data,
        })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Raw key bytes (curve keys) or DER material (RSA).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Re-encode as the canonical protobuf form.
    pub fn to_protobuf(&self) -> Result<Vec<u8>> {
        match self.key_type {
            KeyType::Ed25519 | KeyType::Ecdsa => self.to_public_key()?.to_protobuf(),
            KeyType::Secp256k1 | KeyType::Rsa => Ok(PublicKeyProto {
                key_type: self.key_type,
                data: self.data.clone(),
            }
            .encode()),
        }
    }

    /// Lift into a verifying [`PublicKey`]. RSA and Secp256k1 fail with
    /// [`IdentityError::UnsupportedKeyType`].
    pub fn to_public_key(&self) -> Result<PublicKey> {
        match self.key_type {
            KeyType::Ed25519 => {
                let raw: &[u8; ed25519::PUBLIC_KEY_LENGTH] = self
                    .data
                    .as_slice()
                    .try_into()
                    .expect("length validated at construction");
                Ok(PublicKey::Ed25519(Ed25519PublicKey::from_bytes(raw)?))
            }
            KeyType::Ecdsa => Ok(PublicKey::Ecdsa(EcdsaPublicKey::from_raw_bytes(
                &self.data,
            )?)),
            other => Err(IdentityError::UnsupportedKeyType(other)),
        }
    }

    /// Derive the PeerId naming this key.
    pub fn to_peer_id(&self) -> Result<PeerId> {
        PeerId::from_protobuf_bytes(&self.to_protobuf()?)
    }
}

impl PartialEq for RawKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_type == other.key_type && bool::from(self.data.ct_eq(&other.data))
    }
}

impl Eq for RawKey {}

/// An owned signature: 64 raw bytes for Ed25519, DER (≤ 72 bytes) for ECDSA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for Signature {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

fn check_length(key_type: KeyType, expected: usize, data: &[u8]) -> Result<()> {
    if data.len() != expected {
        return Err(IdentityError::InvalidKeyLength {
            key_type,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}
