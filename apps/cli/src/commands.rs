//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use specpub_core::{BuildResult, ProgressReporter, build_site};
use specpub_history::{CorrelateOptions, GitCli, correlate};
use specpub_shared::{AppConfig, BuildConfig, SpecId, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// specpub: publish specs into the documentation site.
#[derive(Parser)]
#[command(
    name = "specpub",
    version,
    about = "Enrich spec documents with status and git history and publish them into the MkDocs site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Publish specs, then regenerate dashboard, navigation and summaries.
    Build {
        /// Project root (defaults to the current directory).
        #[arg(long)]
        root: Option<PathBuf>,

        /// Config file to use instead of the usual lookup.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip git history correlation.
        #[arg(long)]
        no_history: bool,
    },

    /// Print the correlated git history of one spec as JSON.
    History {
        /// Spec identifier, e.g. `2026-02-09-01` or `0.00`.
        identifier: String,

        /// Project root (defaults to the current directory).
        #[arg(long)]
        root: Option<PathBuf>,

        /// Config file to use instead of the usual lookup.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init {
        /// Project root (defaults to the current directory).
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show {
        /// Project root (defaults to the current directory).
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "specpub=info",
        1 => "specpub=debug",
        _ => "specpub=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            root,
            config,
            no_history,
        } => cmd_build(root, config.as_deref(), no_history).await,
        Command::History {
            identifier,
            root,
            config,
        } => cmd_history(&identifier, root, config.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init { root } => cmd_config_init(root),
            ConfigAction::Show { root } => cmd_config_show(root),
        },
    }
}

/// Resolve `--root`, falling back to the current directory.
fn project_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(p) => p,
        None => std::env::current_dir().wrap_err("cannot determine working directory")?,
    };
    if !root.is_dir() {
        return Err(eyre!("project root '{}' is not a directory", root.display()));
    }
    Ok(root)
}

/// Load `--config` if given, otherwise the project/user config lookup.
fn app_config(root: &Path, config: Option<&Path>) -> Result<AppConfig> {
    let config = match config {
        Some(path) => load_config_from(path)?,
        None => load_config(root)?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(root: Option<PathBuf>, config: Option<&Path>, no_history: bool) -> Result<()> {
    let root = project_root(root)?;
    let mut app = app_config(&root, config)?;
    if no_history {
        app.history.enabled = false;
    }

    let build = BuildConfig::resolve(&app, &root);
    let git = GitCli::new(&build.root, build.history_timeout());

    info!(
        root = %root.display(),
        history = build.history.enabled,
        "building spec site"
    );

    let reporter = CliProgress::new();
    let result = build_site(&build, &git, &reporter).await?;

    println!();
    println!("  Specs published successfully!");
    println!("  Specs:     {}", result.spec_count);
    println!("  Removed:   {}", result.removed);
    println!("  Output:    {}", result.specs_dir.display());
    println!("  Dashboard: {}", result.dashboard_path.display());
    println!("  Search:    {}", result.search_index_path.display());
    println!(
        "  Workflows: {} generated, {} kept",
        result.workflows_generated.len(),
        result.workflows_skipped.len()
    );
    if result.history_unavailable > 0 {
        println!(
            "  History:   unavailable for {} spec(s), see warnings above",
            result.history_unavailable
        );
    }
    println!(
        "  Time:      {:.1}s",
        result.elapsed.as_secs_f64()
    );

    if !result.status_summary.is_empty() {
        println!();
        println!("  Status summary:");
        for (status, count) in &result.status_summary {
            println!("    {:<12} {count}", status.label());
        }
    }
    println!();

    Ok(())
}

async fn cmd_history(identifier: &str, root: Option<PathBuf>, config: Option<&Path>) -> Result<()> {
    let root = project_root(root)?;
    let app = app_config(&root, config)?;
    let build = BuildConfig::resolve(&app, &root);

    let id = SpecId::from_label(identifier);
    if id.as_str().is_empty() {
        return Err(eyre!("spec identifier must not be empty"));
    }

    let git = GitCli::new(&build.root, build.history_timeout());
    let options = CorrelateOptions::from(&build.history);

    info!(spec_id = %id, "correlating history");
    let history = correlate(&git, &id, &options).await;

    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

fn cmd_config_init(root: Option<PathBuf>) -> Result<()> {
    let root = project_root(root)?;
    let path = init_config(&root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(root: Option<PathBuf>) -> Result<()> {
    let root = project_root(root)?;
    let config = load_config(&root)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn stage_complete(&self, name: &str, count: usize) {
        self.spinner.println(format!("  ✓ {name:<10} {count}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
