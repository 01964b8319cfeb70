//! Command line arguments and the optional TOML settings file.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::export::{ExportFormat, DEFAULT_REPORT_TITLE};
use crate::loader::LoadOptions;

#[derive(Parser, Debug, Default)]
#[command(name = "marx_predict")]
#[command(version)]
#[command(about = "Predict marks from study hours and export summary reports", long_about = None)]
pub struct Cli {
    /// Load this CSV, print the summary, export and exit instead of prompting
    #[arg(short, long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Directory export files are written to
    #[arg(short, long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Export format; repeat for several (default in batch mode: json)
    #[arg(short, long = "format", value_enum, value_name = "FMT")]
    pub formats: Vec<ExportFormat>,

    /// File name stem for exports (e.g. `prediction` -> prediction.json)
    #[arg(long, value_name = "NAME")]
    pub stem: Option<String>,

    /// Reject modes other than Normal, Intermediate and Fast
    #[arg(long = "strict-modes")]
    pub strict_modes: bool,

    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub file_stem: String,
    pub strict_modes: bool,
    pub formats: Vec<ExportFormat>,
    pub report_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: PathBuf::from("."),
            file_stem: "prediction".to_string(),
            strict_modes: false,
            formats: vec![ExportFormat::Json],
            report_title: DEFAULT_REPORT_TITLE.to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading settings file");
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Defaults, then the settings file named by `--config`, then flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply_cli(cli);
        Ok(settings)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.out_dir {
            self.output_dir = dir.clone();
        }
        if let Some(stem) = &cli.stem {
            self.file_stem = stem.clone();
        }
        if !cli.formats.is_empty() {
            self.formats = cli.formats.clone();
        }
        if cli.strict_modes {
            self.strict_modes = true;
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict_modes: self.strict_modes,
        }
    }
}
