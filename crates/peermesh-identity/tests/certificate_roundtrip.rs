//! End-to-end certificate exchange: the sequence both sides of a handshake
//! run when a connection is opened.
//!
//! The local peer generates an ephemeral certificate key, builds a
//! certificate attested by its host key, and the remote peer recovers and
//! authenticates the host identity from nothing but the certificate bytes.

use peermesh_identity::{verify_certificate, Certificate, Keypair, VerifyMode};

/// Reference epoch: 2025-01-01 00:00:00 UTC.
const JAN_1_2025: i64 = 1735689600;

// ---------------------------------------------------------------------------
// Full round-trip: generate → verify → compare peer ids
// ---------------------------------------------------------------------------

#[test]
fn verified_certificate_yields_host_peer_id() {
    let host = Keypair::generate_ed25519();
    let cert_key = Keypair::generate_ed25519();

    let cert = Certificate::generate(&host, &cert_key, JAN_1_2025).expect("cert gen");
    let recovered = verify_certificate(cert.der(), VerifyMode::Strict).expect("verify");

    assert_eq!(
        recovered.to_peer_id().unwrap().to_string(),
        host.public().to_peer_id().unwrap().to_string()
    );
}

#[test]
fn all_curve_combinations_roundtrip() {
    let make = [Keypair::generate_ed25519, Keypair::generate_ecdsa];
    for host_gen in make {
        for cert_gen in make {
            let host = host_gen();
            let cert_key = cert_gen();
            let cert = Certificate::generate(&host, &cert_key, JAN_1_2025).expect("cert gen");
            let recovered =
                verify_certificate(cert.der(), VerifyMode::Strict).expect("verify");
            assert_eq!(
                recovered.to_peer_id().unwrap(),
                host.public().to_peer_id().unwrap()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Degenerate but legal: host key doubles as certificate key
// ---------------------------------------------------------------------------

#[test]
fn certificate_attesting_its_own_key_verifies() {
    let key = Keypair::generate_ed25519();
    let cert = Certificate::generate(&key, &key, JAN_1_2025).expect("cert gen");
    let recovered = verify_certificate(cert.der(), VerifyMode::Strict).expect("verify");
    assert_eq!(
        recovered.to_peer_id().unwrap(),
        key.public().to_peer_id().unwrap()
    );
}

// ---------------------------------------------------------------------------
// Tamper resistance: every byte of the DER is load-bearing
// ---------------------------------------------------------------------------

#[test]
fn flipping_any_certificate_byte_fails_verification() {
    let host = Keypair::generate_ed25519();
    let cert_key = Keypair::generate_ed25519();
    let cert = Certificate::generate(&host, &cert_key, JAN_1_2025).expect("cert gen");

    // Sanity check before mutating.
    verify_certificate(cert.der(), VerifyMode::Strict).expect("pristine cert verifies");

    // Flip the high bit: the low bit of a BIT STRING padding byte is not
    // semantically significant, but the high bit of any byte is.
    let mut der = cert.der().to_vec();
    for i in 0..der.len() {
        der[i] ^= 0x80;
        assert!(
            verify_certificate(&der, VerifyMode::Strict).is_err(),
            "bit flip at byte {i} went undetected"
        );
        der[i] ^= 0x80;
    }
}

#[test]
fn truncated_certificate_fails_verification() {
    let host = Keypair::generate_ed25519();
    let cert_key = Keypair::generate_ecdsa();
    let cert = Certificate::generate(&host, &cert_key, JAN_1_2025).expect("cert gen");

    let der = cert.der();
    assert!(verify_certificate(&der[..der.len() - 1], VerifyMode::Strict).is_err());
    assert!(verify_certificate(&der[1..], VerifyMode::Strict).is_err());
}

#[test]
fn appending_bytes_fails_verification() {
    let host = Keypair::generate_ed25519();
    let cert_key = Keypair::generate_ed25519();
    let cert = Certificate::generate(&host, &cert_key, JAN_1_2025).expect("cert gen");

    let mut der = cert.der().to_vec();
    der.push(0x00);
    assert!(verify_certificate(&der, VerifyMode::Strict).is_err());
}

// ---------------------------------------------------------------------------
// Certificates from different hosts stay distinguishable
// ---------------------------------------------------------------------------

#[test]
fn two_hosts_recover_distinct_identities() {
    let host_a = Keypair::generate_ed25519();
    let host_b = Keypair::generate_ed25519();
    let cert_key = Keypair::generate_ed25519();

    let cert_a = Certificate::generate(&host_a, &cert_key, JAN_1_2025).expect("cert a");
    let cert_b = Certificate::generate(&host_b, &cert_key, JAN_1_2025).expect("cert b");

    let id_a = verify_certificate(cert_a.der(), VerifyMode::Strict)
        .expect("verify a")
        .to_peer_id()
        .unwrap();
    let id_b = verify_certificate(cert_b.der(), VerifyMode::Strict)
        .expect("verify b")
        .to_peer_id()
        .unwrap();
    assert_ne!(id_a, id_b);
}
