//! Peer identity primitives: keypairs, public keys, and PeerIds.
//!
//! A node holds a long-term host [`Keypair`] (its permanent identity) and
//! generates an ephemeral certificate keypair per connection. The [`PeerId`]
//! is derived from the host public key and is what peers exchange and pin.

pub mod ecdsa;
pub mod ed25519;
pub mod keypair;
pub mod peer_id;

pub use ecdsa::{EcdsaKeypair, EcdsaPublicKey};
pub use ed25519::{Ed25519Keypair, Ed25519PublicKey};
pub use keypair::{Keypair, PublicKey, RawKey, Signature};
pub use peer_id::PeerId;
