//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
#![warn(missing_docs)]

//! Connect licensing crate: locates the enterprise license, verifies its
//! RSA signature against the embedded public key, applies the trial and
//! expiry policy, and publishes the resulting [`LicenseRecord`] through a
//! [`LicenseService`] registered on the host [`rpc_common::Resources`].

pub mod config;
pub mod error;
pub mod locator;
pub mod logging;
pub mod policy;
pub mod record;
pub mod service;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod verifier;

pub use config::{LicenseConfig, DEFAULT_LICENSE_FILEPATH};
pub use error::{LicenseError, VerifyError};
pub use record::{LicenseRecord, LicenseTier};
pub use service::{check_running_enterprise, loaded_license, LicenseService};
