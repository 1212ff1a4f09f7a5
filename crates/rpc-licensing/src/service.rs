//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rpc_common::Resources;
use tracing::{debug, Span};

use crate::config::LicenseConfig;
use crate::error::LicenseError;
use crate::locator::read_license;
use crate::logging::{record_invalid_license, record_license_load};
use crate::policy::evaluate;
use crate::record::{LicenseRecord, LicenseTier};
use crate::verifier::public_key_fingerprint;

/// Owns the license published for a host.
///
/// The license is loaded once when the service is registered. Readers get
/// the published [`LicenseRecord`] as a whole; it is replaced, never mutated.
#[derive(Debug)]
pub struct LicenseService {
    span: Span,
    config: LicenseConfig,
    loaded: RwLock<Arc<LicenseRecord>>,
    load_failure: Option<&'static str>,
}

impl LicenseService {
    fn new(res: &Resources, config: LicenseConfig) -> Self {
        Self {
            span: res.span().clone(),
            config,
            loaded: RwLock::new(Arc::new(LicenseRecord::default())),
            load_failure: None,
        }
    }

    /// Load the license described by `config`, publish it, and attach the
    /// service to `res`.
    ///
    /// Never fails: a license that cannot be loaded is logged and replaced by
    /// the zero record, which grants nothing. When no license is configured
    /// at all the open source fallback is published instead.
    pub fn register(res: &Resources, config: LicenseConfig) -> Arc<Self> {
        let mut service = Self::new(res, config);
        let license = match service.read_and_validate(Utc::now()) {
            Ok(license) => license,
            Err(err) => {
                let _entered = service.span.enter();
                record_invalid_license(&err);
                service.load_failure = Some(err.reason());
                LicenseRecord::default()
            }
        };
        service.publish(license);

        let service = Arc::new(service);
        res.set_shared(service.clone());
        service
    }

    /// Attach a service holding a short-lived enterprise license for
    /// organization `test`, skipping verification entirely.
    #[cfg(any(test, feature = "test-util"))]
    pub fn inject_test_service(res: &Resources) -> Arc<Self> {
        let service = Self::new(res, LicenseConfig::default());
        service.publish(LicenseRecord {
            version: 1,
            organization: "test".to_owned(),
            license_type: crate::record::ENTERPRISE_TYPE,
            expiry: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        });

        let service = Arc::new(service);
        res.set_shared(service.clone());
        service
    }

    /// Run the full locate, verify, and policy pipeline without publishing.
    pub fn load(config: &LicenseConfig) -> Result<LicenseRecord, LicenseError> {
        Self::load_at(config, Utc::now())
    }

    /// As [`LicenseService::load`], against an explicit clock reading.
    pub fn load_at(config: &LicenseConfig, now: DateTime<Utc>) -> Result<LicenseRecord, LicenseError> {
        let located = read_license(config)?;
        if let Some(located) = &located {
            debug!(
                source = %located.source,
                public_key = %public_key_fingerprint(config.public_key_pem()),
                "verifying enterprise license"
            );
        }
        let material = located.as_ref().map(|located| located.bytes.as_slice());
        let license = evaluate(material, config.public_key_pem(), now)?;
        record_license_load(&license);
        Ok(license)
    }

    /// The license published by this service.
    #[must_use]
    pub fn current_license(&self) -> Arc<LicenseRecord> {
        self.loaded.read().clone()
    }

    /// Reason label of the error that replaced a configured license with the
    /// zero record, `None` when the published record was loaded normally.
    #[must_use]
    pub fn load_failure(&self) -> Option<&'static str> {
        self.load_failure
    }

    fn read_and_validate(&self, now: DateTime<Utc>) -> Result<LicenseRecord, LicenseError> {
        let _entered = self.span.enter();
        Self::load_at(&self.config, now)
    }

    fn publish(&self, license: LicenseRecord) {
        *self.loaded.write() = Arc::new(license);
    }
}

/// The license published by the service registered on `res`, if any.
#[must_use]
pub fn loaded_license(res: &Resources) -> Option<Arc<LicenseRecord>> {
    res.shared::<LicenseService>()
        .map(|service| service.current_license())
}

/// Fail unless `res` carries an unexpired license that grants enterprise
/// features. Enterprise components call this before starting.
pub fn check_running_enterprise(res: &Resources) -> Result<(), LicenseError> {
    let service = res
        .shared::<LicenseService>()
        .ok_or(LicenseError::ServiceUnavailable)?;
    if let Some(reason) = service.load_failure() {
        return Err(LicenseError::LicenseRejected { reason });
    }
    let license = service.current_license();
    let tier = license.tier();
    if matches!(tier, LicenseTier::OpenSource | LicenseTier::FreeTrial) {
        return Err(LicenseError::EnterpriseRequired { tier });
    }
    license.check_expiry()
}
