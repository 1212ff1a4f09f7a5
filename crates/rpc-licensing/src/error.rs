//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
//! Error taxonomy for loading and checking licenses.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::LicenseTier;

/// Failures while authenticating and decoding a raw license.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The embedded (or overridden) public key is not a usable RSA key.
    #[error("failed to parse public key: {0}")]
    KeyParse(String),
    /// The license is not two base64 segments separated by a single `.`.
    #[error("malformed license: {0}")]
    MalformedCredential(&'static str),
    /// The signature does not match the payload under the public key.
    #[error("failed to verify license signature")]
    SignatureInvalid(#[source] rsa::Error),
    /// The payload was authentic but not a license document.
    #[error("failed to unmarshal license data: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Failures of the load pipeline and of entitlement checks.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A license file could not be read.
    #[error("failed to read license file {}: {source}", .path.display())]
    SourceRead {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// License material was present but failed verification.
    #[error("failed to validate license: {0}")]
    Invalid(#[from] VerifyError),
    /// The license is a trial, which is never accepted.
    #[error("trial license detected, enterprise license trials are not supported")]
    TrialsUnsupported,
    /// The license expiry is not in the future.
    #[error("license expired at unix time {expiry}")]
    Expired {
        /// Expiry asserted by the license, seconds since epoch.
        expiry: i64,
    },
    /// The current license does not grant enterprise features.
    #[error("an enterprise license is required, current license tier is {tier}")]
    EnterpriseRequired {
        /// Tier of the license currently published.
        tier: LicenseTier,
    },
    /// A license was configured but failed to load, so the zero record is
    /// published in its place.
    #[error("configured license was rejected ({reason}), enterprise features are disabled")]
    LicenseRejected {
        /// Reason label of the load failure.
        reason: &'static str,
    },
    /// No license service has been registered on the resources.
    #[error("license service has not been registered")]
    ServiceUnavailable,
}

impl LicenseError {
    /// Stable label for logs and the `license_invalid_total` metric.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            LicenseError::SourceRead { .. } => "source_read",
            LicenseError::Invalid(VerifyError::KeyParse(_)) => "key_parse",
            LicenseError::Invalid(VerifyError::MalformedCredential(_)) => "malformed",
            LicenseError::Invalid(VerifyError::SignatureInvalid(_)) => "invalid_signature",
            LicenseError::Invalid(VerifyError::Decode(_)) => "decode",
            LicenseError::TrialsUnsupported => "trial",
            LicenseError::Expired { .. } => "expired",
            LicenseError::EnterpriseRequired { .. } => "enterprise_required",
            LicenseError::LicenseRejected { .. } => "license_rejected",
            LicenseError::ServiceUnavailable => "service_unavailable",
        }
    }
}
