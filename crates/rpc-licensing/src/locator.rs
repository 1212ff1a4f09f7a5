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
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::LicenseConfig;
use crate::error::LicenseError;

/// Which configured source supplied the license material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseSource {
    /// The inline `license` setting.
    Inline,
    /// The explicit `license_filepath` setting.
    ExplicitFile(PathBuf),
    /// The default license file.
    DefaultFile(PathBuf),
}

impl fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseSource::Inline => write!(f, "inline"),
            LicenseSource::ExplicitFile(path) => write!(f, "file {}", path.display()),
            LicenseSource::DefaultFile(path) => write!(f, "default file {}", path.display()),
        }
    }
}

/// Raw license bytes together with where they came from.
#[derive(Debug, Clone)]
pub struct LocatedLicense {
    /// Source that supplied the bytes.
    pub source: LicenseSource,
    /// Unverified license material.
    pub bytes: Vec<u8>,
}

/// Resolve the license material named by `config`.
///
/// Returns `Ok(None)` only when nothing is configured and the default file
/// does not exist. A missing explicit file is an error.
pub fn read_license(config: &LicenseConfig) -> Result<Option<LocatedLicense>, LicenseError> {
    if let Some(license) = config.inline_license() {
        debug!("loading explicitly defined enterprise license");
        return Ok(Some(LocatedLicense {
            source: LicenseSource::Inline,
            bytes: license.as_bytes().to_vec(),
        }));
    }

    if let Some(path) = config.explicit_filepath() {
        debug!(license_path = %path.display(), "loading enterprise license from explicit file path");
        let bytes = read_file(path)?;
        return Ok(Some(LocatedLicense {
            source: LicenseSource::ExplicitFile(path.to_path_buf()),
            bytes,
        }));
    }

    let path = config.default_license_filepath();
    match fs::read(path) {
        Ok(bytes) => {
            debug!(license_path = %path.display(), "loaded enterprise license from default file path");
            Ok(Some(LocatedLicense {
                source: LicenseSource::DefaultFile(path.to_path_buf()),
                bytes,
            }))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(license_path = %path.display(), "no enterprise license found at default file path");
            Ok(None)
        }
        Err(source) => Err(LicenseError::SourceRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, LicenseError> {
    fs::read(path).map_err(|source| LicenseError::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_default(dir: &tempfile::TempDir) -> LicenseConfig {
        LicenseConfig::default().with_default_license_filepath(dir.path().join("absent.license"))
    }

    #[test]
    fn inline_wins_over_every_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.license");
        std::fs::write(&explicit, "explicit").unwrap();
        let default = dir.path().join("default.license");
        std::fs::write(&default, "default").unwrap();

        let config = LicenseConfig::default()
            .with_license("inline")
            .with_license_filepath(&explicit)
            .with_default_license_filepath(&default);
        let located = read_license(&config).unwrap().unwrap();
        assert_eq!(located.source, LicenseSource::Inline);
        assert_eq!(located.bytes, b"inline");
    }

    #[test]
    fn inline_wins_even_when_other_sources_are_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let config = missing_default(&dir)
            .with_license("inline")
            .with_license_filepath(dir.path().join("does-not-exist"));
        let located = read_license(&config).unwrap().unwrap();
        assert_eq!(located.source, LicenseSource::Inline);
    }

    #[test]
    fn explicit_file_wins_over_default() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.license");
        std::fs::write(&explicit, "explicit").unwrap();
        let default = dir.path().join("default.license");
        std::fs::write(&default, "default").unwrap();

        let config = LicenseConfig::default()
            .with_license_filepath(&explicit)
            .with_default_license_filepath(&default);
        let located = read_license(&config).unwrap().unwrap();
        assert_eq!(located.source, LicenseSource::ExplicitFile(explicit));
        assert_eq!(located.bytes, b"explicit");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = missing_default(&dir).with_license_filepath(dir.path().join("nope"));
        let err = read_license(&config).unwrap_err();
        match err {
            LicenseError::SourceRead { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_default_file_means_no_license() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_license(&missing_default(&dir)).unwrap().is_none());
    }

    #[test]
    fn unreadable_default_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory fails with something other than NotFound.
        let config = LicenseConfig::default().with_default_license_filepath(dir.path());
        assert!(matches!(
            read_license(&config),
            Err(LicenseError::SourceRead { .. })
        ));
    }

    #[test]
    fn default_file_is_read_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("default.license");
        std::fs::write(&default, "default").unwrap();
        let config = LicenseConfig::default().with_default_license_filepath(&default);
        let located = read_license(&config).unwrap().unwrap();
        assert_eq!(located.source, LicenseSource::DefaultFile(default));
    }
}
