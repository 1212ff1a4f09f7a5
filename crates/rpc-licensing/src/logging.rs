//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
//! Log and metric emission for license load outcomes.
use chrono::SecondsFormat;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};
use tracing::{debug, error};

use crate::error::LicenseError;
use crate::record::LicenseRecord;

static LICENSE_LOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "license_loads_total",
        "Total number of license loads that succeeded"
    )
    .expect("metric registration to succeed")
});

static LICENSE_INVALID_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "license_invalid_total",
        "Total number of license loads rejected, by reason",
        &["reason"]
    )
    .expect("metric registration to succeed")
});

/// Record a license that passed verification and policy.
pub fn record_license_load(license: &LicenseRecord) {
    LICENSE_LOADS_TOTAL.inc();
    let expires_at = license
        .expires_at()
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    debug!(
        license_org = %license.organization,
        license_type = %license.tier(),
        expires_at = %expires_at,
        "successfully loaded enterprise license"
    );
}

/// Record a license load that was rejected.
pub fn record_invalid_license(err: &LicenseError) {
    let reason = err.reason();
    LICENSE_INVALID_TOTAL.with_label_values(&[reason]).inc();
    error!(error = %err, reason, "failed to read enterprise license");
}

/// Successful loads recorded so far in this process.
#[must_use]
pub fn license_loads_total() -> u64 {
    LICENSE_LOADS_TOTAL.get()
}

/// Rejections recorded so far in this process for `reason`.
#[must_use]
pub fn license_invalid_total(reason: &str) -> u64 {
    LICENSE_INVALID_TOTAL.with_label_values(&[reason]).get()
}
