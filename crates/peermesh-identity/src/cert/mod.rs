//! Self-signed certificates carrying the peer-identity extension.
//!
//! [`Certificate::generate`] builds a certificate whose ephemeral key signs
//! the certificate while the long-term host key signs the ephemeral key;
//! [`verify_certificate`] runs the same binding in reverse and recovers the
//! authenticated host key.

pub mod builder;
pub mod extension;
pub mod verifier;

pub use builder::Certificate;
pub use verifier::{extract_peer_id, verify_certificate, VerifyMode};
