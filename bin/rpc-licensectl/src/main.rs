//! ---
//! rpc_section: "05-external-interfaces"
//! rpc_subsection: "binary"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "Control CLI for inspecting enterprise licenses."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rpc_common::{init_tracing, LogFormat, Resources};
use rpc_licensing::locator::read_license;
use rpc_licensing::verifier::LicenseVerifier;
use rpc_licensing::{check_running_enterprise, LicenseConfig, LicenseService};

mod config;
mod report;

use config::CtlConfig;
use report::LicenseReport;

const SERVICE_NAME: &str = "rpc-licensectl";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Inspect the enterprise license a Connect host would run with",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", env = "RPC_CONFIG", global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        env = "REDPANDA_LICENSE",
        hide_env_values = true,
        global = true,
        help = "License text; takes priority over any license file"
    )]
    license: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        env = "REDPANDA_LICENSE_FILEPATH",
        global = true,
        help = "Path to a license file"
    )]
    license_filepath: Option<PathBuf>,

    #[arg(long, value_enum, global = true, help = "Override log output format")]
    log_format: Option<CliLogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Json,
    Pretty,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Json => LogFormat::StructuredJson,
            CliLogFormat::Pretty => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Load the configured license and report the result")]
    Status {
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
        #[arg(long, help = "Exit with an error unless enterprise features are enabled")]
        require_enterprise: bool,
    },
    #[command(about = "Verify a license file against the embedded key without applying policy")]
    Verify {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, help = "Print the decoded claims as JSON")]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CtlConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.license, cli.license_filepath);
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
    init_tracing(SERVICE_NAME, &config.logging)?;

    match cli.command {
        Commands::Status {
            json,
            require_enterprise,
        } => status(config, json, require_enterprise),
        Commands::Verify { file, json } => verify(&file, json),
    }
}

fn status(config: CtlConfig, json: bool, require_enterprise: bool) -> Result<()> {
    let resources = Resources::new(SERVICE_NAME);
    let service = LicenseService::register(&resources, config.license);
    let report = LicenseReport::new(&service.current_license(), Utc::now())
        .with_load_failure(service.load_failure());
    print_report(&report, json)?;

    if require_enterprise {
        check_running_enterprise(&resources).context("enterprise features are not available")?;
    }
    Ok(())
}

fn verify(file: &Path, json: bool) -> Result<()> {
    let config = LicenseConfig::default().with_license_filepath(file);
    let located = read_license(&config)?
        .with_context(|| format!("no license found at {}", file.display()))?;
    let verifier = LicenseVerifier::embedded().context("embedded public key is unusable")?;
    let license = verifier
        .verify(&located.bytes)
        .with_context(|| format!("failed to verify license from {}", located.source))?;
    print_report(&LicenseReport::new(&license, Utc::now()), json)
}

fn print_report(report: &LicenseReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
