use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use psc_subnet_monitor::config::Config;
use psc_subnet_monitor::export::{self, LogShipper, ShipReport, SinkFallback};
use psc_subnet_monitor::gcp::auth::GcpCredentials;
use psc_subnet_monitor::gcp::client::{ApiEndpoints, GcpClient};
use psc_subnet_monitor::monitor;
use psc_subnet_monitor::VERSION;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// NAT subnet utilization report for GCP Private Service Connect
#[derive(Parser, Debug)]
#[command(name = "psc-subnet-monitor", version = VERSION, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Use this OAuth access token instead of Application Default Credentials
    #[arg(long, env = "PSC_MONITOR_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inventory the folder hierarchy and write the report artifacts
    Report(ReportArgs),
    /// Forward the rows of an existing JSON report to Cloud Logging
    Ship(ShipArgs),
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    /// Root folder id (repeatable)
    #[arg(long = "folder", env = "PSC_MONITOR_FOLDERS", value_delimiter = ',')]
    folders: Vec<String>,

    /// CSV artifact path
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// JSON artifact path
    #[arg(long)]
    json_file: Option<PathBuf>,

    /// Upload both artifacts to this Cloud Storage bucket
    #[arg(long)]
    bucket: Option<String>,

    /// Object name prefix inside the bucket
    #[arg(long)]
    archive_prefix: Option<String>,

    /// Forward every record to Cloud Logging
    #[arg(long)]
    ship_logs: bool,

    #[command(flatten)]
    sink: SinkArgs,
}

#[derive(ClapArgs, Debug)]
struct ShipArgs {
    /// JSON report to forward
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    sink: SinkArgs,
}

#[derive(ClapArgs, Debug)]
struct SinkArgs {
    /// Project hosting the log sink (defaults to the gcloud project)
    #[arg(long)]
    log_project: Option<String>,

    /// Log name inside the sink project
    #[arg(long)]
    log_name: Option<String>,

    /// Log entries locally when the sink rejects our credentials
    #[arg(long)]
    local_fallback: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::debug!("psc-subnet-monitor {} started with log level: {:?}", VERSION, level);
    if let Some(path) = log_file {
        tracing::debug!("Log file: {:?}", path);
    }

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Report(report) => run_report(&config, args.access_token.as_deref(), report).await,
        Command::Ship(ship) => run_ship(&config, args.access_token.as_deref(), ship).await,
    }
}

async fn connect(access_token: Option<&str>) -> Result<GcpClient> {
    let credentials = GcpCredentials::resolve(access_token).await?;
    GcpClient::new(credentials, ApiEndpoints::default())
}

async fn run_report(config: &Config, access_token: Option<&str>, args: ReportArgs) -> Result<()> {
    let folders = config.effective_folders(&args.folders);
    if folders.is_empty() {
        anyhow::bail!(
            "No root folders configured. Use --folder, PSC_MONITOR_FOLDERS or folder_ids in the config file"
        );
    }

    // Resolve the sink before the run so a missing project fails fast
    let sink = if args.ship_logs {
        Some(sink_target(config, &args.sink)?)
    } else {
        None
    };

    let csv_file = config.effective_csv_file(args.csv_file);
    let json_file = config.effective_json_file(args.json_file);

    let client = connect(access_token).await?;

    tracing::info!("Inventorying folders: {}", folders.join(", "));
    let report = monitor::run(&client, &folders).await;

    export::write_csv(&csv_file, &report.records)?;
    tracing::info!("Data written to {}", csv_file.display());
    export::write_json(&json_file, &report.records)?;
    tracing::info!("Data written to {}", json_file.display());

    if let Some(bucket) = config.effective_bucket(args.bucket) {
        let prefix = config.effective_archive_prefix(args.archive_prefix);
        let uploads = export::upload_artifacts(
            &client,
            &bucket,
            prefix.as_deref(),
            &[csv_file.clone(), json_file.clone()],
        )
        .await;
        if !uploads.failed.is_empty() {
            tracing::warn!(
                "{} artifact(s) could not be uploaded to bucket {}",
                uploads.failed.len(),
                bucket
            );
        }
    }

    if let Some(target) = sink {
        let entries: Vec<Value> = report
            .records
            .iter()
            .map(|record| Value::Array(record.to_row()))
            .collect();
        let shipper = LogShipper::new(&client, target, fallback(&args.sink));
        log_ship_report(&shipper.ship(&entries).await);
    }

    println!("{}", report.summary);
    Ok(())
}

async fn run_ship(config: &Config, access_token: Option<&str>, args: ShipArgs) -> Result<()> {
    let input = config.effective_json_file(args.input);
    let target = sink_target(config, &args.sink)?;
    let entries = export::shipper::read_entries(&input)?;

    let client = connect(access_token).await?;
    let shipper = LogShipper::new(&client, target, fallback(&args.sink));
    let report = shipper.ship(&entries).await;
    log_ship_report(&report);

    println!(
        "shipped={}, rejected={}, failed={}, logged locally={}",
        report.shipped, report.rejected, report.failed, report.logged_locally
    );
    Ok(())
}

fn sink_target(config: &Config, sink: &SinkArgs) -> Result<export::SinkTarget> {
    let project = config
        .effective_log_project(sink.log_project.clone())
        .context("No sink project configured. Use --log-project or set a default gcloud project")?;
    Ok(config.sink_target(&project, sink.log_name.clone()))
}

fn fallback(sink: &SinkArgs) -> SinkFallback {
    if sink.local_fallback {
        SinkFallback::LocalLog
    } else {
        SinkFallback::Skip
    }
}

fn log_ship_report(report: &ShipReport) {
    if report.failed > 0 || report.rejected > 0 {
        tracing::warn!(
            "Log shipping incomplete: {} failed, {} rejected",
            report.failed,
            report.rejected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args() {
        let args = Args::try_parse_from([
            "psc-subnet-monitor",
            "report",
            "--folder",
            "123",
            "--folder",
            "456",
            "--ship-logs",
            "--log-project",
            "sink-prj",
        ])
        .unwrap();
        match args.command {
            Command::Report(report) => {
                assert_eq!(report.folders, vec!["123", "456"]);
                assert!(report.ship_logs);
                assert_eq!(report.sink.log_project.as_deref(), Some("sink-prj"));
                assert!(!report.sink.local_fallback);
            }
            Command::Ship(_) => panic!("expected report"),
        }
    }

    #[test]
    fn test_folder_list_is_comma_separated() {
        let args =
            Args::try_parse_from(["psc-subnet-monitor", "report", "--folder", "1,2,3"]).unwrap();
        match args.command {
            Command::Report(report) => assert_eq!(report.folders, vec!["1", "2", "3"]),
            Command::Ship(_) => panic!("expected report"),
        }
    }

    #[test]
    fn test_ship_args_with_global_flags() {
        let args = Args::try_parse_from([
            "psc-subnet-monitor",
            "ship",
            "--input",
            "rows.json",
            "--local-fallback",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(args.log_level, LogLevel::Debug));
        match args.command {
            Command::Ship(ship) => {
                assert_eq!(ship.input, Some(PathBuf::from("rows.json")));
                assert_eq!(fallback(&ship.sink), SinkFallback::LocalLog);
            }
            Command::Report(_) => panic!("expected ship"),
        }
    }
}
