//! Peer-identity layer for TLS-authenticated p2p connections.
//!
//! Two peers authenticate each other during a standard TLS handshake by
//! exchanging self-signed certificates whose critical extension carries a
//! signed proof of the long-term host identity, following the libp2p TLS
//! handshake design:
//!
//! - Ed25519 and ECDSA-P-256 keypairs ([`identity`])
//! - The protobuf public-key envelope ([`wire`])
//! - PeerId derivation and its multibase string forms ([`identity::peer_id`])
//! - Certificate construction and self-contained verification ([`cert`])
//!
//! The TLS record layer, session plumbing, and trust decisions about the
//! recovered identity belong to the transport built on top of this crate.

pub mod cert;
pub mod error;
pub mod identity;
pub mod multibase;
pub mod wire;

pub use cert::{extract_peer_id, verify_certificate, Certificate, VerifyMode};
pub use error::{IdentityError, Result};
pub use identity::{Keypair, PeerId, PublicKey, RawKey, Signature};
pub use wire::{KeyType, PublicKeyProto};
