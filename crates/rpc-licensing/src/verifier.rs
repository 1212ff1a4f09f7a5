//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
//! Signature verification of `<base64 payload>.<base64 signature>` licenses.
//!
//! The signature covers the SHA-256 digest of the *encoded* payload segment,
//! exactly as it appears in the license text. Nothing in the payload is
//! decoded as JSON until that signature has been checked.
use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::VerifyError;
use crate::record::LicenseRecord;

const DELIMITER: u8 = b'.';

/// Verifies licenses against a single RSA public key.
#[derive(Debug, Clone)]
pub struct LicenseVerifier {
    public_key: RsaPublicKey,
}

impl LicenseVerifier {
    /// Verifier for the public key compiled into this binary.
    pub fn embedded() -> Result<Self, VerifyError> {
        Self::from_pem(crate::config::EMBEDDED_PUBLIC_KEY_PEM)
    }

    /// Parse a PEM encoded `PUBLIC KEY` block, which must hold an RSA key.
    pub fn from_pem(pem: &[u8]) -> Result<Self, VerifyError> {
        let pem = std::str::from_utf8(pem)
            .map_err(|_| VerifyError::KeyParse("public key is not PEM text".to_owned()))?;
        if !pem.contains("-----BEGIN") {
            return Err(VerifyError::KeyParse("no PEM block found".to_owned()));
        }
        let public_key = RsaPublicKey::from_public_key_pem(pem)
            .map_err(|err| VerifyError::KeyParse(err.to_string()))?;
        Ok(Self { public_key })
    }

    /// Authenticate `license` and decode its claims.
    pub fn verify(&self, license: &[u8]) -> Result<LicenseRecord, VerifyError> {
        let license = license.trim_ascii();

        let parts: Vec<&[u8]> = license.split(|byte| *byte == DELIMITER).collect();
        let [payload_encoded, signature_encoded] = *parts.as_slice() else {
            return Err(VerifyError::MalformedCredential(
                "expected payload and signature separated by a single '.'",
            ));
        };

        let payload = decode_segment(payload_encoded).ok_or(
            VerifyError::MalformedCredential("license data is not valid base64"),
        )?;
        let signature = decode_segment(signature_encoded).ok_or(
            VerifyError::MalformedCredential("license signature is not valid base64"),
        )?;

        let digest = Sha256::digest(payload_encoded);
        self.public_key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
            .map_err(VerifyError::SignatureInvalid)?;

        serde_json::from_slice(&payload).map_err(VerifyError::Decode)
    }
}

/// Parse `public_key_pem` and verify `license` against it.
pub fn validate_license(license: &[u8], public_key_pem: &[u8]) -> Result<LicenseRecord, VerifyError> {
    LicenseVerifier::from_pem(public_key_pem)?.verify(license)
}

/// Short hex fingerprint identifying a public key in logs.
#[must_use]
pub fn public_key_fingerprint(public_key_pem: &[u8]) -> String {
    let digest = Sha256::digest(public_key_pem);
    hex::encode(&digest[..8])
}

// Licenses are issued with standard padded base64; URL-safe segments are
// accepted too since the signed bytes are the encoded text either way.
fn decode_segment(segment: &[u8]) -> Option<Vec<u8>> {
    general_purpose::STANDARD
        .decode(segment)
        .or_else(|_| general_purpose::URL_SAFE.decode(segment))
        .ok()
}
