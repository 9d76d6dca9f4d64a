//! Configuration parsing and validation.
//!
//! Incident Search is configured via a TOML file (default
//! `config/isearch.toml`). Every section is optional; missing keys take
//! the defaults below.
//!
//! # Example
//!
//! ```toml
//! [db]
//! path = "./data/isearch.sqlite"
//!
//! [pipeline]
//! expansion_delay_ms = 1500
//! graph_delay_ms = 500
//! search_delay_ms = 800
//! search_jitter_ms = 400
//! relevance_jitter = 0.05
//! relevance_floor = 0.5
//! # seed = 42
//!
//! [report]
//! output_dir = "./reports"
//! format = "pdf"
//! ```

use anyhow::{Context, Result};
use incident_search_core::simulate::Perturbation;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/isearch.sqlite")
}

/// Simulated latency and relevance perturbation.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_expansion_delay_ms")]
    pub expansion_delay_ms: u64,
    #[serde(default = "default_graph_delay_ms")]
    pub graph_delay_ms: u64,
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,
    #[serde(default = "default_search_jitter_ms")]
    pub search_jitter_ms: u64,
    #[serde(default = "default_relevance_jitter")]
    pub relevance_jitter: f64,
    #[serde(default = "default_relevance_floor")]
    pub relevance_floor: f64,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            expansion_delay_ms: default_expansion_delay_ms(),
            graph_delay_ms: default_graph_delay_ms(),
            search_delay_ms: default_search_delay_ms(),
            search_jitter_ms: default_search_jitter_ms(),
            relevance_jitter: default_relevance_jitter(),
            relevance_floor: default_relevance_floor(),
            seed: None,
        }
    }
}

fn default_expansion_delay_ms() -> u64 {
    1500
}
fn default_graph_delay_ms() -> u64 {
    500
}
fn default_search_delay_ms() -> u64 {
    800
}
fn default_search_jitter_ms() -> u64 {
    400
}
fn default_relevance_jitter() -> f64 {
    0.05
}
fn default_relevance_floor() -> f64 {
    0.5
}

impl PipelineConfig {
    pub fn expansion_delay(&self) -> Duration {
        Duration::from_millis(self.expansion_delay_ms)
    }

    pub fn graph_delay(&self) -> Duration {
        Duration::from_millis(self.graph_delay_ms)
    }

    pub fn perturbation(&self) -> Perturbation {
        Perturbation {
            jitter: self.relevance_jitter,
            floor: self.relevance_floor,
        }
    }

    /// Drop every simulated pause. Used by `--fast`.
    pub fn without_delays(mut self) -> Self {
        self.expansion_delay_ms = 0;
        self.graph_delay_ms = 0;
        self.search_delay_ms = 0;
        self.search_jitter_ms = 0;
        self
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: default_format(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}
fn default_format() -> String {
    "pdf".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let jitter = config.pipeline.relevance_jitter;
    if !(0.0..=1.0).contains(&jitter) {
        anyhow::bail!("pipeline.relevance_jitter must be in [0.0, 1.0]");
    }

    if !(0.0..=1.0).contains(&config.pipeline.relevance_floor) {
        anyhow::bail!("pipeline.relevance_floor must be in [0.0, 1.0]");
    }

    match config.report.format.as_str() {
        "pdf" | "text" => {}
        other => anyhow::bail!("Unknown report format: '{}'. Must be pdf or text.", other),
    }

    Ok(())
}
