mod config;

use clap::{Args, Parser};
use config::{Config, ConfigError, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::{StatsdBuilder, StatsdError};
use schema_server::errors::SchemaServerError;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const METRICS_PREFIX: &str = "schemagate";

#[derive(Parser)]
#[command(version, about = "Serves versioned configuration schemas")]
enum CliCommand {
    /// Run the schema server
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Path to a YAML config file. Defaults are used when omitted.
    #[arg(long)]
    config_file: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not set up statsd: {0}")]
    Statsd(#[from] StatsdError),
    #[error("a metrics recorder is already installed")]
    RecorderInstalled,
    #[error(transparent)]
    SchemaServer(#[from] SchemaServerError),
}

fn main() {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Run(args) => run(args),
    };

    if let Err(e) = result {
        eprintln!("schemagate: {e}");
        process::exit(1);
    }
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let config = match &args.config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Sentry must be initialized before the runtime starts
    let _sentry = init_logging(config.common.logging.as_ref());

    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    tracing::info!("Starting schemagate");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(schema_server::run(config.schema_server))?;

    Ok(())
}

fn init_logging(config: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let guard = config.map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();

    guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))?;
    metrics::set_global_recorder(recorder).map_err(|_| CliError::RecorderInstalled)?;

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
