//! Error types for the peer-identity layer.
//!
//! Every fallible operation in this crate returns [`IdentityError`]. Boolean
//! signature checks (`verify`) report malformed input as `false` rather than
//! an error; structural and cryptographic failures during certificate
//! verification are split into distinct variants so callers can tell a bad
//! certificate signature from a bad identity proof.

use thiserror::Error;

use crate::wire::KeyType;

/// Errors that can occur within the `peermesh-identity` crate.
#[derive(Debug, Error)]
pub enum IdentityError {
    // --- Wire codec ---
    #[error("malformed varint")]
    MalformedVarint,

    #[error("unknown protobuf field tag: {0:#x}")]
    UnknownFieldTag(u64),

    #[error("missing required protobuf field: {0}")]
    MissingField(&'static str),

    #[error("truncated message: expected {expected} more bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unknown key type discriminant: {0}")]
    UnknownKeyType(u64),

    // --- Keys ---
    #[error("invalid key length for {key_type:?}: expected {expected}, got {actual}")]
    InvalidKeyLength {
        key_type: KeyType,
        expected: usize,
        actual: usize,
    },

    #[error("invalid key bytes: {0}")]
    InvalidKeyBytes(String),

    #[error("key type {0:?} is not supported for this operation")]
    UnsupportedKeyType(KeyType),

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("EC key is not on the P-256 curve")]
    WrongCurve,

    #[error("failed to encode key: {0}")]
    KeyEncoding(String),

    #[error("signing failed: {0}")]
    Signing(String),

    // --- PeerId ---
    #[error("peer id string does not start with the base32 multibase prefix 'b'")]
    NotMultibase32,

    #[error("invalid multibase payload: {0}")]
    InvalidMultibase(String),

    #[error("invalid CID: {0}")]
    InvalidCid(String),

    // --- Certificate ---
    #[error("failed to generate X.509 certificate: {0}")]
    CertificateGeneration(String),

    #[error("X.509 parse error: {0}")]
    X509Parse(String),

    #[error("certificate carries no peer-identity extension")]
    ExtensionNotFound,

    #[error("peer-identity extension is not marked critical")]
    ExtensionNotCritical,

    #[error("certificate carries more than one peer-identity extension")]
    DuplicateExtension,

    #[error("malformed peer-identity extension: {0}")]
    BadExtension(String),

    #[error("certificate signature does not verify against its own public key")]
    CertSigInvalid,

    #[error("identity proof in the extension does not verify against the host key")]
    ExtensionSigInvalid,
}

/// Result type alias using [`IdentityError`].
pub type Result<T> = std::result::Result<T, IdentityError>;
