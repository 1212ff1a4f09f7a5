//! ---
//! rpc_section: "15-testing-qa"
//! rpc_subsection: "integration-tests"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "End-to-end license loading scenarios."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::path::PathBuf;

use chrono::{Duration, Utc};
use rpc_common::Resources;
use rpc_licensing::testing::{sign_license, test_config};
use rpc_licensing::{
    check_running_enterprise, loaded_license, LicenseConfig, LicenseError, LicenseRecord,
    LicenseService, LicenseTier,
};
use tempfile::TempDir;

const ACME_FIXTURE: &str = "../crates/rpc-licensing/tests/fixtures/acme.license";

fn acme(expiry: i64) -> LicenseRecord {
    LicenseRecord {
        version: 1,
        organization: "acme".into(),
        license_type: 2,
        expiry,
    }
}

fn in_a_year() -> i64 {
    (Utc::now() + Duration::days(365)).timestamp()
}

fn workspace() -> (TempDir, LicenseConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("redpanda.license"));
    (dir, config)
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(ACME_FIXTURE)
}

#[test]
fn scenario_a_no_configuration_falls_back_to_open_source() {
    let (_dir, config) = workspace();
    let res = Resources::new("scenario-a");
    let service = LicenseService::register(&res, config);

    let license = service.current_license();
    assert_eq!(license.license_type, -1);
    assert_eq!(license.tier(), LicenseTier::OpenSource);
    let ten_years = (Utc::now() + Duration::days(3650)).timestamp();
    assert!((license.expiry - ten_years).abs() <= 5);
}

#[test]
fn scenario_b_valid_inline_license_is_published_verbatim() {
    let (_dir, config) = workspace();
    let record = acme(in_a_year());
    let res = Resources::new("scenario-b");
    LicenseService::register(&res, config.with_license(sign_license(&record)));

    assert_eq!(*loaded_license(&res).unwrap(), record);
    check_running_enterprise(&res).unwrap();
}

#[test]
fn scenario_c_tampered_signature_publishes_zero_record() {
    let (_dir, config) = workspace();
    let mut license = sign_license(&acme(in_a_year()));
    let last = license.pop().unwrap();
    license.push(if last == 'A' { 'B' } else { 'A' });

    let res = Resources::new("scenario-c");
    let service = LicenseService::register(&res, config.clone().with_license(license.clone()));
    let published = service.current_license();
    assert_eq!(published.license_type, 0);
    assert_eq!(published.expiry, 0);
    assert!(!published.allows_enterprise_features());
    assert_eq!(service.load_failure(), Some("invalid_signature"));
    assert!(matches!(
        check_running_enterprise(&res),
        Err(LicenseError::LicenseRejected {
            reason: "invalid_signature"
        })
    ));

    assert!(matches!(
        LicenseService::load(&config.with_license(license)),
        Err(LicenseError::Invalid(_))
    ));
}

#[test]
fn scenario_d_missing_explicit_file_fails_unlike_missing_default() {
    let (dir, config) = workspace();
    let explicit = config
        .clone()
        .with_license_filepath(dir.path().join("explicit.license"));

    assert!(matches!(
        LicenseService::load(&explicit),
        Err(LicenseError::SourceRead { .. })
    ));
    assert_eq!(LicenseService::load(&config).unwrap().license_type, -1);

    let res = Resources::new("scenario-d");
    let service = LicenseService::register(&res, explicit);
    assert_eq!(*service.current_license(), LicenseRecord::default());
}

#[test]
fn license_file_signed_externally_loads_from_explicit_path() {
    let (_dir, config) = workspace();
    let license = LicenseService::load(&config.with_license_filepath(fixture())).unwrap();
    assert_eq!(license, acme(4_102_444_800));
}

#[test]
fn default_path_license_is_used_when_nothing_is_configured() {
    let (dir, config) = workspace();
    let record = acme(in_a_year());
    std::fs::write(
        dir.path().join("redpanda.license"),
        format!("{}\n", sign_license(&record)),
    )
    .unwrap();

    assert_eq!(LicenseService::load(&config).unwrap(), record);
}

#[test]
fn trial_license_is_rejected_and_grants_nothing() {
    let (_dir, config) = workspace();
    let trial = LicenseRecord {
        license_type: 0,
        ..acme(in_a_year())
    };
    let config = config.with_license(sign_license(&trial));

    assert!(matches!(
        LicenseService::load(&config),
        Err(LicenseError::TrialsUnsupported)
    ));

    let res = Resources::new("trial");
    LicenseService::register(&res, config);
    assert!(check_running_enterprise(&res).is_err());
}

#[test]
fn production_key_rejects_test_signed_licenses() {
    let dir = tempfile::tempdir().unwrap();
    let license_path = dir.path().join("license");
    std::fs::write(&license_path, sign_license(&acme(in_a_year()))).unwrap();

    let config = LicenseConfig::default().with_license_filepath(&license_path);
    assert!(matches!(
        LicenseService::load(&config),
        Err(LicenseError::Invalid(_))
    ));
}

#[test]
fn injected_test_service_bypasses_the_pipeline() {
    let res = Resources::new("injected");
    LicenseService::inject_test_service(&res);
    let license = loaded_license(&res).unwrap();
    assert_eq!(license.organization, "test");
    assert_eq!(license.tier(), LicenseTier::Enterprise);
    check_running_enterprise(&res).unwrap();
}
