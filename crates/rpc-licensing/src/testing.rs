//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "test"
//! rpc_description: "Signing helpers for license tests."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
//! Helpers for producing licenses signed by the committed test keypair.
//!
//! Only compiled for tests or with the `test-util` feature. The test private
//! key has no relationship to the embedded production key.
use std::path::PathBuf;

use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};

use crate::config::LicenseConfig;
use crate::record::LicenseRecord;

/// Public half of the test keypair.
pub const TEST_PUBLIC_KEY_PEM: &str = include_str!("../tests/fixtures/test_public_key.pem");

const TEST_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/test_private_key.pem");

static TEST_PRIVATE_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::from_pkcs8_pem(TEST_PRIVATE_KEY_PEM).expect("test private key fixture to parse")
});

/// Encode `record` as the payload segment of a license.
pub fn encode_payload(record: &LicenseRecord) -> String {
    let json = serde_json::to_vec(record).expect("license record to serialise");
    general_purpose::STANDARD.encode(json)
}

/// Sign an already encoded payload segment, returning the signature segment.
pub fn sign_encoded_payload(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    let signature = TEST_PRIVATE_KEY
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .expect("signing with the test key to succeed");
    general_purpose::STANDARD.encode(signature)
}

/// Produce a complete `<payload>.<signature>` license for `record`.
pub fn sign_license(record: &LicenseRecord) -> String {
    let payload = encode_payload(record);
    let signature = sign_encoded_payload(&payload);
    format!("{payload}.{signature}")
}

/// Configuration trusting the test key, with the default license file moved
/// to `default_license_filepath`.
pub fn test_config(default_license_filepath: impl Into<PathBuf>) -> LicenseConfig {
    LicenseConfig::default()
        .with_public_key_pem(TEST_PUBLIC_KEY_PEM.as_bytes().to_vec())
        .with_default_license_filepath(default_license_filepath)
}
