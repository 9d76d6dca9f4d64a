//! # Incident Search CLI (`isearch`)
//!
//! ## Usage
//!
//! ```bash
//! isearch --config ./config/isearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `isearch init` | Create the SQLite database and key-value table |
//! | `isearch sources` | List the searchable sources |
//! | `isearch search ...` | Validate an error report and run a search |
//! | `isearch history` | List saved searches |
//! | `isearch shell` | Interactive session |
//!
//! ## Examples
//!
//! ```bash
//! # Search with a canned sample, skipping simulated latency
//! isearch search --sample 1 --fast
//!
//! # Describe an error, save it to history and export a PDF report
//! isearch search --severity P1 --env prod \
//!     --description "Database connection timeout after 30 seconds" \
//!     --code ERR_CONNECTION_TIMEOUT --app UserPortal --save --export
//!
//! # Machine-readable output
//! isearch search --sample 2 --fast --progress json > search.json
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use incident_search::config::{self, Config};
use incident_search::export;
use incident_search::logging;
use incident_search::migrate;
use incident_search::pipeline::{MockBackend, Pipeline, TokioDelay};
use incident_search::progress::ProgressMode;
use incident_search::render;
use incident_search::session::{self, Session};
use incident_search::shell;
use incident_search::sources;
use incident_search::sqlite_store::SqliteKvStore;
use incident_search_core::form;
use incident_search_core::models::FormInput;

/// Incident Search: walk a production error through a simulated
/// multi-source search.
///
/// All commands except `sources` read a TOML configuration file given by
/// `--config`. See `config/isearch.toml` for the defaults.
#[derive(Parser)]
#[command(
    name = "isearch",
    about = "Incident Search: simulated multi-source search for production error triage",
    version,
    long_about = "Incident Search expands an error report into search terms, searches \
    documentation, chat, email and local files (simulated), ranks the results, and can save \
    searches to history or export a PDF report."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/isearch.toml")]
    config: PathBuf,

    /// Write diagnostic logs as JSON lines. Filter with ISEARCH_LOG.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// List the searchable sources and their mock document counts.
    Sources,

    /// Run a search for an error report.
    ///
    /// Required: severity, description and environment, given as flags or
    /// via `--sample`. Flags override sample values.
    Search {
        #[command(flatten)]
        form: FormArgs,

        /// Start from sample error N (1 or 2).
        #[arg(long)]
        sample: Option<usize>,

        /// Save the finished search to history.
        #[arg(long)]
        save: bool,

        /// Export a report for the finished search.
        #[arg(long)]
        export: bool,

        /// Report format, overriding `report.format`: `pdf` or `text`.
        #[arg(long)]
        format: Option<String>,

        /// Skip all simulated delays.
        #[arg(long)]
        fast: bool,

        /// Progress output: `human`, `json`, or `off`. Defaults to human on a TTY.
        #[arg(long)]
        progress: Option<String>,
    },

    /// List saved searches, newest first.
    History,

    /// Start an interactive session on stdin.
    Shell {
        /// Skip all simulated delays.
        #[arg(long)]
        fast: bool,

        /// Progress output: `human`, `json`, or `off`.
        #[arg(long, default_value = "human")]
        progress: String,
    },
}

/// Error report fields.
#[derive(clap::Args)]
struct FormArgs {
    /// P1, P2 or P3.
    #[arg(long)]
    severity: Option<String>,

    /// What went wrong.
    #[arg(long)]
    description: Option<String>,

    /// Dev, QA, Staging or Prod.
    #[arg(long = "env")]
    environment: Option<String>,

    /// Error code, e.g. ERR_CONNECTION_TIMEOUT.
    #[arg(long)]
    code: Option<String>,

    /// Application name.
    #[arg(long)]
    app: Option<String>,

    /// Affected pool.
    #[arg(long)]
    pool: Option<String>,
}

impl FormArgs {
    fn apply(self, form: &mut FormInput) {
        let overrides = [
            (self.severity, &mut form.severity),
            (self.description, &mut form.error_description),
            (self.environment, &mut form.environment),
            (self.code, &mut form.error_code),
            (self.app, &mut form.app_name),
            (self.pool, &mut form.applicable_pool),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

fn progress_mode(value: Option<&str>) -> Result<ProgressMode> {
    match value {
        Some(s) => ProgressMode::parse(s)
            .ok_or_else(|| anyhow!("Unknown progress mode: '{}'. Must be human, json, or off.", s)),
        None => Ok(ProgressMode::default_for_tty()),
    }
}

fn pipeline_config(cfg: &Config, fast: bool) -> config::PipelineConfig {
    if fast {
        cfg.pipeline.clone().without_delays()
    } else {
        cfg.pipeline.clone()
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_search(
    cfg: &Config,
    form_args: FormArgs,
    sample: Option<usize>,
    save: bool,
    export: bool,
    format: Option<String>,
    fast: bool,
    progress: Option<String>,
) -> Result<()> {
    let mut input = match sample {
        Some(n) => form::sample_form(n).ok_or_else(|| {
            anyhow!(
                "No sample error {}. Available: 1-{}",
                n,
                form::sample_forms().len()
            )
        })?,
        None => FormInput::default(),
    };
    form_args.apply(&mut input);

    let mode = progress_mode(progress.as_deref())?;
    let renderer = export::renderer_for(format.as_deref().unwrap_or(cfg.report.format.as_str()))?;

    let store = SqliteKvStore::open(cfg).await?;
    let presenter = mode.presenter();
    let backend = MockBackend::new(cfg.pipeline.perturbation());
    let delay = TokioDelay;
    let pipeline = Pipeline::new(
        pipeline_config(cfg, fast),
        &delay,
        presenter.as_ref(),
        &backend,
    );
    let mut session = Session::start(pipeline, &store, presenter.as_ref()).await?;

    let search = session.submit(&input).await?;
    if mode == ProgressMode::Off {
        print!("{}", render::results(search));
    }

    if save {
        let entry = session.save().await?;
        eprintln!("Saved search: {}", entry.headline());
    }
    if export {
        let path = session.export(renderer.as_ref(), &cfg.report.output_dir)?;
        eprintln!("Report written to {}", path.display());
    }

    drop(session);
    store.close().await;
    Ok(())
}

async fn run_history(cfg: &Config) -> Result<()> {
    let store = SqliteKvStore::open(cfg).await?;
    let history = session::load_history(&store).await?;
    print!("{}", render::history(&history));
    store.close().await;
    Ok(())
}

async fn run_shell(cfg: &Config, fast: bool, progress: &str) -> Result<()> {
    let mode = progress_mode(Some(progress))?;
    let renderer = export::renderer_for(&cfg.report.format)?;

    let store = SqliteKvStore::open(cfg).await?;
    let presenter = mode.presenter();
    let backend = MockBackend::new(cfg.pipeline.perturbation());
    let delay = TokioDelay;
    let pipeline = Pipeline::new(
        pipeline_config(cfg, fast),
        &delay,
        presenter.as_ref(),
        &backend,
    );
    let mut session = Session::start(pipeline, &store, presenter.as_ref()).await?;

    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    shell::run_shell(
        &mut session,
        renderer.as_ref(),
        &cfg.report.output_dir,
        mode == ProgressMode::Off,
        reader,
        &mut std::io::stdout(),
    )
    .await?;

    drop(session);
    store.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    // Commands that don't require config
    if let Commands::Sources = cli.command {
        return sources::list_sources();
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {}
        Commands::Search {
            form,
            sample,
            save,
            export,
            format,
            fast,
            progress,
        } => {
            run_search(&cfg, form, sample, save, export, format, fast, progress).await?;
        }
        Commands::History => {
            run_history(&cfg).await?;
        }
        Commands::Shell { fast, progress } => {
            run_shell(&cfg, fast, &progress).await?;
        }
    }

    Ok(())
}
