//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LicenseError;

/// Type code synthesized locally when no license is configured.
pub const OPEN_SOURCE_TYPE: i64 = -1;
/// Type code of trial licenses, which are always rejected.
pub const TRIAL_TYPE: i64 = 0;
/// Type code of a full enterprise license.
pub const ENTERPRISE_TYPE: i64 = 1;

/// Lifetime granted to the open source fallback.
const OPEN_SOURCE_VALIDITY_DAYS: i64 = 10 * 365;

/// Tier assigned to a license by its type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseTier {
    /// No license material was provided.
    OpenSource,
    /// Evaluation license; never accepted.
    FreeTrial,
    /// Full enterprise license.
    Enterprise,
    /// Any other code issued by the signing authority.
    Other(i64),
}

impl From<i64> for LicenseTier {
    fn from(code: i64) -> Self {
        match code {
            OPEN_SOURCE_TYPE => LicenseTier::OpenSource,
            TRIAL_TYPE => LicenseTier::FreeTrial,
            ENTERPRISE_TYPE => LicenseTier::Enterprise,
            other => LicenseTier::Other(other),
        }
    }
}

impl fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseTier::OpenSource => write!(f, "open source"),
            LicenseTier::FreeTrial => write!(f, "free trial"),
            LicenseTier::Enterprise => write!(f, "enterprise"),
            LicenseTier::Other(code) => write!(f, "unknown ({code})"),
        }
    }
}

/// Claims carried by a verified license.
///
/// The `Default` value is the zero record (trial type, expiry at the epoch),
/// which is what gets published when a configured license fails to load. It
/// never grants enterprise features.
///
/// Fields absent from a signed payload decode to zero, so a document missing
/// its `type` is treated as a trial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseRecord {
    /// Format version of the license document.
    pub version: i64,
    /// Licensed organization.
    pub organization: String,
    /// Tier code, see [`LicenseTier`].
    #[serde(rename = "type")]
    pub license_type: i64,
    /// Seconds since the unix epoch after which the license is invalid.
    pub expiry: i64,
}

impl LicenseRecord {
    /// Synthesize the open source fallback used when no license exists.
    #[must_use]
    pub fn open_source_fallback(now: DateTime<Utc>) -> Self {
        Self {
            version: 0,
            organization: String::new(),
            license_type: OPEN_SOURCE_TYPE,
            expiry: (now + Duration::days(OPEN_SOURCE_VALIDITY_DAYS)).timestamp(),
        }
    }

    /// Tier derived from the type code.
    #[must_use]
    pub fn tier(&self) -> LicenseTier {
        LicenseTier::from(self.license_type)
    }

    /// Expiry as a UTC timestamp, `None` if out of chrono's range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expiry, 0)
    }

    /// Fail with [`LicenseError::Expired`] unless the expiry is in the future.
    pub fn check_expiry(&self) -> Result<(), LicenseError> {
        self.check_expiry_at(Utc::now())
    }

    /// As [`LicenseRecord::check_expiry`], against an explicit clock reading.
    pub fn check_expiry_at(&self, now: DateTime<Utc>) -> Result<(), LicenseError> {
        if self.expiry <= now.timestamp() {
            return Err(LicenseError::Expired {
                expiry: self.expiry,
            });
        }
        Ok(())
    }

    /// True for an unexpired license of a paid tier.
    #[must_use]
    pub fn allows_enterprise_features(&self) -> bool {
        self.allows_enterprise_features_at(Utc::now())
    }

    /// As [`LicenseRecord::allows_enterprise_features`], against an explicit clock reading.
    #[must_use]
    pub fn allows_enterprise_features_at(&self, now: DateTime<Utc>) -> bool {
        !matches!(self.tier(), LicenseTier::OpenSource | LicenseTier::FreeTrial)
            && self.check_expiry_at(now).is_ok()
    }
}
