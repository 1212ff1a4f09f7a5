//! ---
//! rpc_section: "05-external-interfaces"
//! rpc_subsection: "binary"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "Configuration file handling for the license control CLI."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rpc_common::LoggingConfig;
use rpc_licensing::LicenseConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Contents of the optional TOML configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtlConfig {
    #[serde(default)]
    pub license: LicenseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CtlConfig {
    /// Read `path` when given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse()
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Apply command line or environment values on top of the file.
    pub fn apply_overrides(&mut self, license: Option<String>, license_filepath: Option<PathBuf>) {
        if let Some(license) = license {
            self.license.license = Some(license);
        }
        if let Some(path) = license_filepath {
            self.license.license_filepath = Some(path);
        }
    }
}

impl std::str::FromStr for CtlConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(content).with_context(|| "failed to parse configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_license_and_logging_tables() {
        let config: CtlConfig = r#"
            [license]
            license_filepath = "/opt/connect/license"

            [logging]
            format = "structured-json"
        "#
        .parse()
        .unwrap();
        assert_eq!(
            config.license.license_filepath.as_deref(),
            Some(Path::new("/opt/connect/license"))
        );
        assert!(config.license.license.is_none());
        assert_eq!(config.logging.format, rpc_common::LogFormat::StructuredJson);
    }

    #[test]
    fn overrides_take_precedence_over_file_values() {
        let mut config: CtlConfig = "[license]\nlicense = \"from-file\"".parse().unwrap();
        config.apply_overrides(Some("from-flag".into()), None);
        assert_eq!(config.license.license.as_deref(), Some("from-flag"));

        config.apply_overrides(None, Some(PathBuf::from("/tmp/lic")));
        assert_eq!(config.license.license.as_deref(), Some("from-flag"));
        assert!(config.license.license_filepath.is_some());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CtlConfig::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
        assert!(err.to_string().contains("unable to read config file"));
    }

    #[test]
    fn no_config_file_means_defaults() {
        let config = CtlConfig::load(None).unwrap();
        assert!(config.license.license.is_none());
        assert!(config.license.license_filepath.is_none());
    }
}
