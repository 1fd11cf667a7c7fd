use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use humantime::parse_duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use downtimer::annotate::annotate;
use downtimer::config::app_config::{
    build_opts, config_file_location, load_config, load_deployment_times,
};
use downtimer::config::probe_config::{DirectorSection, RecordConfig};
use downtimer::director::TaskStatus;
use downtimer::director::client::DirectorClient;
use downtimer::prober::Prober;

/// Measure HTTP availability during a deployment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level filter, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Probe a URL and record every outcome to a CSV file
    Record(RecordArgs),
    /// Add deployment events to an existing CSV file
    Annotate(AnnotateArgs),
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// YAML config file, defaults to $CONFIG_FILE
    #[arg(long)]
    config: Option<PathBuf>,

    /// File the probe results are written to
    #[arg(short, long, env = "OUTPUT_FILE")]
    output_file: Option<PathBuf>,

    /// URL to probe
    #[arg(short, long, env = "PROBE_URL")]
    url: Option<String>,

    /// Time between probes, e.g. 1s or 500ms
    #[arg(short, long, value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Probe for this many intervals' worth of time, e.g. 10m. Only the waits between
    /// probes count towards it, so slow responses make the run last longer
    #[arg(short, long, value_parser = parse_duration, conflicts_with = "task")]
    duration: Option<Duration>,

    /// Probe while this director task is running
    #[arg(short = 't', long = "bosh-task")]
    task: Option<String>,

    /// Director URL, e.g. https://10.0.0.6:25555
    #[arg(long, env = "BOSH_ENVIRONMENT")]
    director_url: Option<String>,

    /// Director client name
    #[arg(long, env = "BOSH_CLIENT")]
    director_client: Option<String>,

    /// Director client secret
    #[arg(long, env = "BOSH_CLIENT_SECRET", hide_env_values = true)]
    director_client_secret: Option<String>,

    /// Director CA certificate file
    #[arg(long, env = "BOSH_CA_CERT")]
    director_ca_cert: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    /// CSV file written by `record`
    #[arg(short, long, env = "OUTPUT_FILE")]
    output_file: PathBuf,

    /// YAML map of epoch seconds to event labels
    #[arg(short, long)]
    events: PathBuf,
}

impl RecordArgs {
    fn to_config(&self) -> RecordConfig {
        RecordConfig {
            output_file: self.output_file.clone(),
            url: self.url.clone(),
            interval: self.interval,
            duration: self.duration,
            task: self.task.clone(),
            director: Some(DirectorSection {
                url: self.director_url.clone(),
                client: self.director_client.clone(),
                client_secret: self.director_client_secret.clone(),
                ca_cert: self.director_ca_cert.clone(),
            }),
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn record(args: RecordArgs) -> Result<()> {
    let mut config = args.to_config();
    if let Some(path) = config_file_location(args.config.as_deref()) {
        config = config.or(load_config(&path)?);
    }
    let opts = build_opts(&config)?;

    let mut tasks: Option<Arc<dyn TaskStatus>> = None;
    if config.task.is_some() {
        if let Some(director) = config
            .director
            .as_ref()
            .and_then(DirectorSection::to_director_config)
        {
            let client =
                DirectorClient::new(&director).context("failed to set up director client")?;
            tasks = Some(Arc::new(client));
        }
    }

    let output_file = opts.output_file().clone();
    let mut prober = Prober::new(opts, tasks)?;
    let summary = prober
        .record_downtime()
        .await
        .with_context(|| format!("recording to {} failed", output_file.display()))?;

    let failure_ratio = if summary.probes == 0 {
        0.0
    } else {
        summary.failures as f64 / summary.probes as f64
    };
    tracing::info!(
        probes = summary.probes,
        failures = summary.failures,
        "failure ratio {:.2}%",
        failure_ratio * 100.0
    );
    Ok(())
}

async fn annotate_log(args: AnnotateArgs) -> Result<()> {
    let times = load_deployment_times(&args.events)?;
    annotate(&args.output_file, &times)
        .await
        .with_context(|| format!("annotating {} failed", args.output_file.display()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Record(args) => record(args).await,
        Commands::Annotate(args) => annotate_log(args).await,
    }
}
