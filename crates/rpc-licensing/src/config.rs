//! ---
//! rpc_section: "14-licensing-system"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "License verification and entitlement checks."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File consulted when neither an inline license nor a file path is configured.
pub const DEFAULT_LICENSE_FILEPATH: &str = "/etc/redpanda/redpanda.license";

/// Public key licenses are signed against.
pub(crate) const EMBEDDED_PUBLIC_KEY_PEM: &[u8] = include_bytes!("../keys/license_public_key.pem");

/// Where to find license material.
///
/// Sources are consulted in priority order: the inline `license`, then
/// `license_filepath`, then [`DEFAULT_LICENSE_FILEPATH`]. Empty values count
/// as unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// License text in its `<payload>.<signature>` form.
    #[serde(default)]
    pub license: Option<String>,
    /// Explicit license file. Any read failure is fatal.
    #[serde(default)]
    pub license_filepath: Option<PathBuf>,
    #[serde(skip)]
    custom_public_key_pem: Option<Vec<u8>>,
    #[serde(skip)]
    custom_default_license_filepath: Option<PathBuf>,
}

impl LicenseConfig {
    /// Configure an inline license.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Configure an explicit license file.
    #[must_use]
    pub fn with_license_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.license_filepath = Some(path.into());
        self
    }

    /// Verify against `pem` instead of the embedded key.
    #[cfg(any(test, feature = "test-util"))]
    #[must_use]
    pub fn with_public_key_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.custom_public_key_pem = Some(pem.into());
        self
    }

    /// Consult `path` instead of [`DEFAULT_LICENSE_FILEPATH`].
    #[cfg(any(test, feature = "test-util"))]
    #[must_use]
    pub fn with_default_license_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_default_license_filepath = Some(path.into());
        self
    }

    pub(crate) fn inline_license(&self) -> Option<&str> {
        self.license.as_deref().filter(|value| !value.is_empty())
    }

    pub(crate) fn explicit_filepath(&self) -> Option<&Path> {
        self.license_filepath
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub(crate) fn public_key_pem(&self) -> &[u8] {
        match &self.custom_public_key_pem {
            Some(pem) if !pem.is_empty() => pem,
            _ => EMBEDDED_PUBLIC_KEY_PEM,
        }
    }

    pub(crate) fn default_license_filepath(&self) -> &Path {
        match &self.custom_default_license_filepath {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => Path::new(DEFAULT_LICENSE_FILEPATH),
        }
    }
}
