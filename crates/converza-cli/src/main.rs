mod cmd_analyze;
mod cmd_config;
mod cmd_generate;
mod cmd_init;
mod cmd_report;
mod cmd_run;
mod cmd_status;

use std::path::Path;

use clap::{Parser, Subcommand};
use converza_store::{ConverzaPaths, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "converza",
    version,
    about = "Call transcript analytics: conversions, upsells, and sentiment"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new .converza/ workspace
    Init,
    /// Write synthetic call records into the landing directory
    Generate {
        /// Number of calls to generate
        #[arg(long, default_value_t = 50)]
        count: usize,
        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the full bronze -> silver -> gold pipeline and write the report
    Run {
        /// Maximum landing files to ingest (default: config batch_size)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Enrich silver records that are not in gold yet
    Update,
    /// Analyze a single transcript without touching the workspace
    Analyze {
        /// Transcript text
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show KPIs, sentiment distribution, top performers, and daily metrics
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Number of top performers to show
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Show record counts per layer
    Status,
    /// Manage workspace config (.converza/config.json)
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
    /// Print the built-in lexicon as JSON
    Lexicon,
}

/// Paths of an initialized workspace; the config file is not read.
pub(crate) fn workspace_paths(repo_root: &Path) -> anyhow::Result<ConverzaPaths> {
    let paths = ConverzaPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .converza/ workspace found. Run `converza init` first.");
    }
    Ok(paths)
}

/// Paths and validated config of an initialized workspace.
pub(crate) fn load_workspace(repo_root: &Path) -> anyhow::Result<(ConverzaPaths, PipelineConfig)> {
    let paths = workspace_paths(repo_root)?;
    let config = PipelineConfig::load(&paths.config_json)?;
    Ok((paths, config))
}

/// `CONVERZA_LOG` wins; otherwise the workspace `log_level`, else `info`.
fn init_tracing(repo_root: &Path) {
    let filter = EnvFilter::try_from_env("CONVERZA_LOG").unwrap_or_else(|_| {
        let level = PipelineConfig::load(&ConverzaPaths::discover(repo_root).config_json)
            .map(|c| c.log_level)
            .unwrap_or_else(|_| "info".to_string());
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let repo_root = std::env::current_dir()?;
    init_tracing(&repo_root);

    match cli.cmd {
        Command::Init => cmd_init::execute(&repo_root),
        Command::Generate { count, seed } => cmd_generate::execute(&repo_root, count, seed),
        Command::Run { batch_size } => cmd_run::full(&repo_root, batch_size),
        Command::Update => cmd_run::incremental(&repo_root),
        Command::Analyze { text, json } => cmd_analyze::execute(&repo_root, &text, json),
        Command::Report { json, top } => cmd_report::execute(&repo_root, json, top),
        Command::Status => cmd_status::execute(&repo_root),
        Command::Config { cmd } => cmd_config::run(cmd, &repo_root),
        Command::Lexicon => cmd_analyze::lexicon(),
    }
}
