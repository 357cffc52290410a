//! Ed25519 keypair generation and signing.
//!
//! Reference implementation: `ed25519-dalek` (MIT/Apache-2.0)
//! <https://github.com/dalek-cryptography/curve25519-dalek>
//!
//! Ed25519 is PureEdDSA: messages are signed directly, with no pre-hash, and
//! signatures are a fixed 64 bytes. The inner [`SigningKey`] is zeroized on
//! drop.

use ed25519_dalek::pkcs8::{DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::error::{IdentityError, Result};

/// Raw Ed25519 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// Raw Ed25519 secret key length.
pub const SECRET_KEY_LENGTH: usize = 32;
/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;
/// SubjectPublicKeyInfo DER length for an Ed25519 key.
pub const SPKI_LENGTH: usize = 44;

/// An Ed25519 keypair, used either as a long-term host identity or as a
/// per-connection certificate key.
pub struct Ed25519Keypair {
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a persisted 32-byte secret key.
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Returns the 32-byte secret key for persistence.
    ///
    /// **Security:** the caller is responsible for storing this securely.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Returns the public half.
    pub fn public(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key())
    }

    /// Sign a message. Deterministic; always 64 bytes.
    pub fn sign(&self, msg: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
        let sig = self
            .signing_key
            .try_sign(msg)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        Ok(sig.to_bytes())
    }

    /// Returns the PKCS#8 DER encoding of the keypair (RFC 8410), the form
    /// the certificate builder hands to `rcgen`.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .signing_key
            .to_pkcs8_der()
            .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }
}

/// An Ed25519 public key, either derived from a local keypair or parsed from
/// a remote peer's certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey(VerifyingKey);

impl Ed25519PublicKey {
    /// Parse a raw 32-byte public key. Fails if the bytes are not a valid
    /// curve point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self> {
        let key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| IdentityError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self(key))
    }

    /// Returns the raw 32-byte public key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Verify a signature over `msg`. Malformed signatures return `false`,
    /// never an error.
    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        let Ok(sig) = Signature::try_from(sig) else {
            return false;
        };
        self.0.verify(msg, &sig).is_ok()
    }

    /// Returns the SubjectPublicKeyInfo DER encoding (44 bytes).
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .0
            .to_public_key_der()
            .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Parse a SubjectPublicKeyInfo DER encoding.
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        let key = VerifyingKey::from_public_key_der(der)
            .map_err(|e| IdentityError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self(key))
    }
}
