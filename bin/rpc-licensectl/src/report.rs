//! ---
//! rpc_section: "05-external-interfaces"
//! rpc_subsection: "binary"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "Human and JSON rendering of license status."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rpc_licensing::LicenseRecord;
use serde::Serialize;

/// Printable summary of a license.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseReport {
    pub organization: String,
    pub license_type: i64,
    pub tier: String,
    pub expiry: i64,
    pub expires_at: Option<String>,
    pub enterprise: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

impl LicenseReport {
    pub fn new(license: &LicenseRecord, now: DateTime<Utc>) -> Self {
        Self {
            organization: license.organization.clone(),
            license_type: license.license_type,
            tier: license.tier().to_string(),
            expiry: license.expiry,
            expires_at: license
                .expires_at()
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            enterprise: license.allows_enterprise_features_at(now),
            rejected: None,
        }
    }

    /// Mark the record as the placeholder published after a failed load.
    pub fn with_load_failure(mut self, reason: Option<&str>) -> Self {
        if let Some(reason) = reason {
            self.tier = "none".to_owned();
            self.rejected = Some(reason.to_owned());
        }
        self
    }
}

impl fmt::Display for LicenseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let organization = if self.organization.is_empty() {
            "-"
        } else {
            self.organization.as_str()
        };
        writeln!(f, "organization: {organization}")?;
        match &self.rejected {
            Some(reason) => writeln!(f, "tier:         none (configured license rejected: {reason})")?,
            None => writeln!(f, "tier:         {} ({})", self.tier, self.license_type)?,
        }
        writeln!(
            f,
            "expires at:   {}",
            self.expires_at.as_deref().unwrap_or("invalid timestamp")
        )?;
        write!(
            f,
            "enterprise:   {}",
            if self.enterprise { "enabled" } else { "disabled" }
        )
    }
}
