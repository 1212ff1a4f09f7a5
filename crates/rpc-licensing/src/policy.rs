//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};

use crate::error::LicenseError;
use crate::record::{LicenseRecord, TRIAL_TYPE};
use crate::verifier::validate_license;

/// Decide which license applies given the located material.
///
/// No material (or empty material) yields the open source fallback. Material
/// that is present must verify against `public_key_pem`, must not be a trial,
/// and must not be expired at `now`.
pub fn evaluate(
    material: Option<&[u8]>,
    public_key_pem: &[u8],
    now: DateTime<Utc>,
) -> Result<LicenseRecord, LicenseError> {
    let license = match material {
        Some(bytes) if !bytes.is_empty() => {
            let license = validate_license(bytes, public_key_pem)?;
            if license.license_type == TRIAL_TYPE {
                return Err(LicenseError::TrialsUnsupported);
            }
            license
        }
        _ => LicenseRecord::open_source_fallback(now),
    };

    license.check_expiry_at(now)?;
    Ok(license)
}
