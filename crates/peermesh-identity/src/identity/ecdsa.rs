//! ECDSA keypairs on NIST P-256 with SHA-256.
//!
//! Reference implementation: `p256` (RustCrypto, MIT/Apache-2.0)
//! <https://github.com/RustCrypto/elliptic-curves>
//!
//! Signatures are ASN.1 DER `SEQUENCE { r INTEGER, s INTEGER }`, variable
//! length up to 72 bytes. The raw public form used by the identity layer is
//! the 64-byte X‖Y concatenation: the uncompressed SEC1 point with its 0x04
//! prefix stripped.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use p256::SecretKey;
use rand::rngs::OsRng;

use crate::error::{IdentityError, Result};

/// Raw public key length: X‖Y, no point-format prefix.
pub const RAW_PUBLIC_KEY_LENGTH: usize = 64;
/// Upper bound on the DER signature length.
pub const MAX_SIGNATURE_LENGTH: usize = 72;
/// SubjectPublicKeyInfo DER length for a named-curve P-256 key.
pub const SPKI_LENGTH: usize = 91;

/// An ECDSA-P-256 keypair.
pub struct EcdsaKeypair {
    signing_key: SigningKey,
}

impl EcdsaKeypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Parse a SEC1 `ECPrivateKey` DER structure and derive the public key.
    ///
    /// Used when loading a persisted identity. Malformed DER, or a structure
    /// naming a curve other than P-256, fails with
    /// [`IdentityError::InvalidKeyBytes`].
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_sec1_der(der)
            .map_err(|e| IdentityError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self {
            signing_key: SigningKey::from(secret),
        })
    }

    /// Returns the public half.
    pub fn public(&self) -> EcdsaPublicKey {
        EcdsaPublicKey(*self.signing_key.verifying_key())
    }

    /// Sign a message: SHA-256 digest, DER-encoded signature (≤ 72 bytes).
    ///
    /// ECDSA uses a random nonce, so two signatures over the same message
    /// need not be bit-identical.
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let sig: Signature = self
            .signing_key
            .try_sign(msg)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        Ok(sig.to_der().as_bytes().to_vec())
    }

    /// Returns the PKCS#8 DER encoding of the keypair for `rcgen`.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .signing_key
            .to_pkcs8_der()
            .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }
}

/// An ECDSA-P-256 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EcdsaPublicKey(VerifyingKey);

impl EcdsaPublicKey {
    /// Parse the raw 64-byte X‖Y form. Fails if the coordinates are not a
    /// point on P-256.
    pub fn from_raw_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RAW_PUBLIC_KEY_LENGTH {
            return Err(IdentityError::InvalidKeyLength {
                key_type: crate::wire::KeyType::Ecdsa,
                expected: RAW_PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut sec1 = [0u8; RAW_PUBLIC_KEY_LENGTH + 1];
        sec1[0] = 0x04; // uncompressed point
        sec1[1..].copy_from_slice(bytes);
        let key = VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|e| IdentityError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self(key))
    }

    /// Returns the raw 64-byte X‖Y concatenation.
    pub fn to_raw_bytes(&self) -> [u8; RAW_PUBLIC_KEY_LENGTH] {
        let point = self.0.to_encoded_point(false);
        let mut raw = [0u8; RAW_PUBLIC_KEY_LENGTH];
        raw.copy_from_slice(&point.as_bytes()[1..]);
        raw
    }

    /// Parse a SEC1 point (with format prefix) as presented in an X.509
    /// SubjectPublicKeyInfo BIT STRING.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let key = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| IdentityError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self(key))
    }

    /// Verify a DER-encoded signature over `msg` (SHA-256 digest). Malformed
    /// DER returns `false`, never an error.
    pub fn verify(&self, msg: &[u8], der_sig: &[u8]) -> bool {
        let Ok(sig) = Signature::from_der(der_sig) else {
            return false;
        };
        self.0.verify(msg, &sig).is_ok()
    }

    /// Returns the SubjectPublicKeyInfo DER encoding (91 bytes, named-curve
    /// form).
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .0
            .to_public_key_der()
            .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Parse a SubjectPublicKeyInfo DER encoding. Keys on other curves are
    /// rejected.
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        let key = VerifyingKey::from_public_key_der(der)
            .map_err(|e| IdentityError::InvalidKeyBytes(e.to_string()))?;
        Ok(Self(key))
    }
}
