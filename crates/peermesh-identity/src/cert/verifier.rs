//! Self-contained verification of peer certificates.
//!
//! Verification inverts the builder: check the certificate's own signature
//! with the certificate key it advertises, then check the identity proof in
//! the extension with the host key it carries. No CA, no chain, no clock —
//! the identity binding is the sole trust anchor. The caller derives a PeerId
//! from the returned host key and decides whether to admit the peer.
//!
//! Expected failures (malformed or mis-signed certificates from remote
//! peers) are logged at `debug` level.
//!
//! X.509 parsing reference: `x509-parser` crate (rusticata, MIT/Apache-2.0)

use x509_parser::prelude::*;

use crate::cert::extension::{decode_extension, signed_payload, EXTENSION_OID};
use crate::error::{IdentityError, Result};
use crate::identity::ecdsa::EcdsaPublicKey;
use crate::identity::ed25519::Ed25519PublicKey;
use crate::identity::peer_id::PeerId;
use crate::identity::RawKey;

/// Ed25519 signature / key algorithm OID: 1.3.101.112.
const ED25519_OID: &[u64] = &[1, 3, 101, 112];
/// id-ecPublicKey OID: 1.2.840.10045.2.1.
const EC_PUBLIC_KEY_OID: &[u64] = &[1, 2, 840, 10045, 2, 1];
/// prime256v1 (NIST P-256) curve OID: 1.2.840.10045.3.1.7.
const PRIME256V1_OID: &[u64] = &[1, 2, 840, 10045, 3, 1, 7];
/// ecdsa-with-SHA256 OID: 1.2.840.10045.4.3.2.
const ECDSA_WITH_SHA256_OID: &[u64] = &[1, 2, 840, 10045, 4, 3, 2];

/// How strictly to treat the extension's critical flag.
///
/// The extension must be marked critical. `Lenient` tolerates peers that
/// forgot the flag, but logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    Strict,
    Lenient,
}

/// Verify a DER-encoded peer certificate and recover the authenticated host
/// key.
///
/// Checks, in order:
/// 1. exactly one peer-identity extension, marked critical;
/// 2. the certificate signature, against the SPKI the certificate advertises;
/// 3. the identity proof, against the host key carried in the extension.
pub fn verify_certificate(cert_der: &[u8], mode: VerifyMode) -> Result<RawKey> {
    let (rem, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| IdentityError::X509Parse(e.to_string()))?;
    if !rem.is_empty() {
        return Err(IdentityError::X509Parse(format!(
            "{} trailing bytes after certificate",
            rem.len()
        )));
    }

    let extension = locate_extension(&cert, mode)?;
    let (host_pub_proto, proof_sig) = decode_extension(extension.value)?;

    verify_cert_signature(&cert)?;

    let host_key = RawKey::from_protobuf(&host_pub_proto)?;
    let payload = signed_payload(cert.tbs_certificate.subject_pki.raw);
    let host_pub = host_key.to_public_key()?;
    if !host_pub.verify(&payload, &proof_sig) {
        tracing::debug!("identity proof does not verify against the host key");
        return Err(IdentityError::ExtensionSigInvalid);
    }

    tracing::trace!(host_key = ?host_key.key_type(), "peer certificate verified");
    Ok(host_key)
}

/// Verify a certificate and derive the peer's id in one step.
pub fn extract_peer_id(cert_der: &[u8], mode: VerifyMode) -> Result<PeerId> {
    verify_certificate(cert_der, mode)?.to_peer_id()
}

/// Find the single peer-identity extension.
fn locate_extension<'a>(
    cert: &'a X509Certificate<'a>,
    mode: VerifyMode,
) -> Result<&'a X509Extension<'a>> {
    let oid = oid_registry::Oid::from(EXTENSION_OID).expect("extension OID constant is valid");

    let mut found = None;
    for ext in cert.extensions() {
        if ext.oid == oid {
            if found.is_some() {
                return Err(IdentityError::DuplicateExtension);
            }
            found = Some(ext);
        }
    }
    let ext = found.ok_or(IdentityError::ExtensionNotFound)?;

    if !ext.critical {
        match mode {
            VerifyMode::Strict => return Err(IdentityError::ExtensionNotCritical),
            VerifyMode::Lenient => {
                tracing::warn!("accepting peer-identity extension without critical flag");
            }
        }
    }
    Ok(ext)
}

/// Check the outer certificate signature against the certificate's own
/// SubjectPublicKeyInfo.
fn verify_cert_signature(cert: &X509Certificate<'_>) -> Result<()> {
    let tbs = cert.tbs_certificate.as_ref();
    let signature = cert.signature_value.as_ref();
    let spki = &cert.tbs_certificate.subject_pki;
    let sig_alg = &cert.signature_algorithm.algorithm;

    let ed25519 = oid_registry::Oid::from(ED25519_OID).expect("Ed25519 OID constant is valid");
    let ecdsa_sha256 =
        oid_registry::Oid::from(ECDSA_WITH_SHA256_OID).expect("ECDSA OID constant is valid");

    let valid = if *sig_alg == ed25519 {
        if spki.algorithm.algorithm != ed25519 {
            return Err(IdentityError::X509Parse(
                "signature algorithm does not match subject key algorithm".into(),
            ));
        }
        let raw: &[u8; 32] = spki
            .subject_public_key
            .as_ref()
            .try_into()
            .map_err(|_| IdentityError::InvalidKeyBytes("bad Ed25519 SPKI length".into()))?;
        Ed25519PublicKey::from_bytes(raw)?.verify(tbs, signature)
    } else if *sig_alg == ecdsa_sha256 {
        check_p256_spki(spki)?;
        EcdsaPublicKey::from_sec1_bytes(spki.subject_public_key.as_ref())?
            .verify(tbs, signature)
    } else {
        return Err(IdentityError::UnsupportedAlgorithm(sig_alg.to_string()));
    };

    if !valid {
        tracing::debug!("certificate signature does not verify against its own key");
        return Err(IdentityError::CertSigInvalid);
    }
    Ok(())
}

/// Require an id-ecPublicKey SPKI with the named curve prime256v1.
fn check_p256_spki(spki: &SubjectPublicKeyInfo<'_>) -> Result<()> {
    let ec_public_key =
        oid_registry::Oid::from(EC_PUBLIC_KEY_OID).expect("EC OID constant is valid");
    let prime256v1 =
        oid_registry::Oid::from(PRIME256V1_OID).expect("P-256 OID constant is valid");

    if spki.algorithm.algorithm != ec_public_key {
        return Err(IdentityError::X509Parse(
            "signature algorithm does not match subject key algorithm".into(),
        ));
    }
    let curve = spki
        .algorithm
        .parameters
        .as_ref()
        .and_then(|params| params.as_oid().ok())
        .ok_or(IdentityError::WrongCurve)?;
    if curve != prime256v1 {
        return Err(IdentityError::WrongCurve);
    }
    Ok(())
}
