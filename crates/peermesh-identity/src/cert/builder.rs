//! Self-signed X.509 certificate generation.
//!
//! A certificate binds an ephemeral per-connection keypair to the long-term
//! host identity: the certificate key signs the certificate itself, and the
//! host key signs the certificate key inside the peer-identity extension.
//! Peers authenticate the host key recovered from the extension, never the
//! certificate chain.
//!
//! Reference: `rcgen` crate (rustls team, MIT/Apache-2.0)
//! <https://github.com/rustls/rcgen>

use rand::rngs::OsRng;
use rand::RngCore;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, KeyPair as RcgenKeyPair, SerialNumber,
    PKCS_ECDSA_P256_SHA256, PKCS_ED25519,
};
use rustls_pki_types::PrivatePkcs8KeyDer;
use time::OffsetDateTime;

use crate::cert::extension::build_extension;
use crate::error::{IdentityError, Result};
use crate::identity::Keypair;
use crate::wire::KeyType;

/// Certificate validity duration.
const VALIDITY_DAYS: i64 = 365;

/// A self-signed X.509 certificate carrying the peer-identity extension.
pub struct Certificate {
    /// DER-encoded certificate bytes.
    cert_der: Vec<u8>,
    /// PEM-encoded certificate string.
    cert_pem: String,
    /// When this certificate becomes valid (seconds since Unix epoch).
    not_before_epoch: i64,
    /// When this certificate expires (seconds since Unix epoch).
    not_after_epoch: i64,
}

impl Certificate {
    /// Generate a certificate for `cert_key`, attested by `host`.
    ///
    /// The certificate is valid for one year starting at `now_epoch_secs`.
    /// The serial number is 64 random bits from the OS CSPRNG.
    pub fn generate(host: &Keypair, cert_key: &Keypair, now_epoch_secs: i64) -> Result<Self> {
        let sign_algo = match cert_key.key_type() {
            KeyType::Ed25519 => &PKCS_ED25519,
            KeyType::Ecdsa => &PKCS_ECDSA_P256_SHA256,
            other => return Err(IdentityError::UnsupportedKeyType(other)),
        };

        let pkcs8_der = cert_key.to_pkcs8_der()?;
        let pkcs8_typed = PrivatePkcs8KeyDer::from(pkcs8_der);
        let rcgen_keypair = RcgenKeyPair::from_pkcs8_der_and_sign_algo(&pkcs8_typed, sign_algo)
            .map_err(|e| IdentityError::CertificateGeneration(e.to_string()))?;

        let cert_spki = cert_key.public().to_spki_der()?;
        let extension = build_extension(host, &cert_spki)?;

        let not_before_epoch = now_epoch_secs;
        let not_after_epoch = now_epoch_secs + VALIDITY_DAYS * 86400;
        let not_before = OffsetDateTime::from_unix_timestamp(not_before_epoch)
            .map_err(|e| IdentityError::CertificateGeneration(format!("invalid not_before: {e}")))?;
        let not_after = OffsetDateTime::from_unix_timestamp(not_after_epoch)
            .map_err(|e| IdentityError::CertificateGeneration(format!("invalid not_after: {e}")))?;

        let mut params = CertificateParams::new(vec![])
            .map_err(|e| IdentityError::CertificateGeneration(format!("invalid cert params: {e}")))?;
        params.not_before = not_before;
        params.not_after = not_after;

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CountryName, "US");
        dn.push(DnType::OrganizationName, "libp2p");
        dn.push(DnType::CommonName, "libp2p");
        params.distinguished_name = dn;

        let mut serial = [0u8; 8];
        OsRng.fill_bytes(&mut serial);
        params.serial_number = Some(SerialNumber::from(serial.to_vec()));

        params.custom_extensions.push(extension);

        let cert = params
            .self_signed(&rcgen_keypair)
            .map_err(|e| IdentityError::CertificateGeneration(e.to_string()))?;

        tracing::trace!(
            cert_key = ?cert_key.key_type(),
            host_key = ?host.key_type(),
            "generated self-signed peer certificate"
        );

        Ok(Self {
            cert_der: cert.der().to_vec(),
            cert_pem: cert.pem(),
            not_before_epoch,
            not_after_epoch,
        })
    }

    /// Returns the DER-encoded certificate bytes.
    pub fn der(&self) -> &[u8] {
        &self.cert_der
    }

    /// Returns the PEM-encoded certificate string.
    pub fn pem(&self) -> &str {
        &self.cert_pem
    }

    /// Returns the start of validity as seconds since Unix epoch.
    pub fn not_before_epoch(&self) -> i64 {
        self.not_before_epoch
    }

    /// Returns the expiration time as seconds since Unix epoch.
    pub fn not_after_epoch(&self) -> i64 {
        self.not_after_epoch
    }
}
