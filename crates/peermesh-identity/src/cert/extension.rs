//! The peer-identity X.509 extension: a signed proof binding the ephemeral
//! certificate key to the long-term host key.
//!
//! The extension value is the DER structure
//!
//! ```text
//! SEQUENCE {
//!     OCTET STRING hostPubKey   -- protobuf-encoded host public key
//!     OCTET STRING signature    -- host-key signature, see below
//! }
//! ```
//!
//! under OID `1.3.6.1.4.1.53594.1.1`, marked critical. The signature covers
//! the exact byte string `"libp2p-tls-handshake:" ‖ SPKI_DER(cert_pub_key)`:
//! the prefix domain-separates this signature from any other use of the host
//! key.
//!
//! DER reference: `yasna` crate (MIT/Apache-2.0)

use crate::error::{IdentityError, Result};
use crate::identity::Keypair;

/// Extension OID: 1.3.6.1.4.1.53594.1.1 (IANA PEN 53594, libp2p).
pub const EXTENSION_OID: &[u64] = &[1, 3, 6, 1, 4, 1, 53594, 1, 1];

/// Domain-separation prefix for the identity proof.
pub const SIGNING_PREFIX: &[u8] = b"libp2p-tls-handshake:";

/// The message the host key signs: `prefix ‖ SPKI_DER(cert_pub_key)`, with no
/// separators or length prefixes.
pub fn signed_payload(cert_spki_der: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(SIGNING_PREFIX.len() + cert_spki_der.len());
    payload.extend_from_slice(SIGNING_PREFIX);
    payload.extend_from_slice(cert_spki_der);
    payload
}

/// Encode the extension value.
pub fn encode_extension(host_pub_proto: &[u8], signature: &[u8]) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|writer| {
            writer.next().write_bytes(host_pub_proto);
            writer.next().write_bytes(signature);
        })
    })
}

/// Decode an extension value into `(hostPubKey, signature)`.
///
/// Anything other than a SEQUENCE of exactly two OCTET STRINGs fails with
/// [`IdentityError::BadExtension`].
pub fn decode_extension(value: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    yasna::parse_der(value, |reader| {
        reader.read_sequence(|reader| {
            let host_pub = reader.next().read_bytes()?;
            let signature = reader.next().read_bytes()?;
            Ok((host_pub, signature))
        })
    })
    .map_err(|e| IdentityError::BadExtension(e.to_string()))
}

/// Build the critical `rcgen` extension for a certificate: sign the cert
/// key's SPKI with the host key and wrap proof and host key together.
pub(crate) fn build_extension(
    host: &Keypair,
    cert_spki_der: &[u8],
) -> Result<rcgen::CustomExtension> {
    let payload = signed_payload(cert_spki_der);
    let signature = host.sign(&payload)?;
    let host_pub_proto = host.public().to_protobuf()?;

    let content = encode_extension(&host_pub_proto, signature.as_bytes());
    let mut ext = rcgen::CustomExtension::from_oid_content(EXTENSION_OID, content);
    ext.set_criticality(true);
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let host_pub = vec![0x08, 0x01, 0x12, 0x03, 0xaa, 0xbb, 0xcc];
        let sig = vec![0xde; 64];
        let der = encode_extension(&host_pub, &sig);
        let (decoded_pub, decoded_sig) = decode_extension(&der).unwrap();
        assert_eq!(decoded_pub, host_pub);
        assert_eq!(decoded_sig, sig);
    }

    #[test]
    fn decode_rejects_non_sequence() {
        // Bare OCTET STRING.
        let der = yasna::construct_der(|writer| writer.write_bytes(&[1, 2, 3]));
        assert!(matches!(
            decode_extension(&der),
            Err(IdentityError::BadExtension(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_element() {
        let der = yasna::construct_der(|writer| {
            writer.write_sequence(|writer| {
                writer.next().write_bytes(&[1, 2, 3]);
            })
        });
        assert!(decode_extension(&der).is_err());
    }

    #[test]
    fn decode_rejects_extra_element() {
        let der = yasna::construct_der(|writer| {
            writer.write_sequence(|writer| {
                writer.next().write_bytes(&[1]);
                writer.next().write_bytes(&[2]);
                writer.next().write_bytes(&[3]);
            })
        });
        assert!(decode_extension(&der).is_err());
    }

    #[test]
    fn decode_rejects_trailing_garbage() {
        let mut der = encode_extension(&[1, 2], &[3, 4]);
        der.push(0x00);
        assert!(decode_extension(&der).is_err());
    }

    #[test]
    fn signed_payload_is_exact_concatenation() {
        let spki = [0x30, 0x2a, 0x05, 0x06];
        let payload = signed_payload(&spki);
        assert_eq!(&payload[..21], b"libp2p-tls-handshake:");
        assert_eq!(&payload[21..], &spki);
    }
}
