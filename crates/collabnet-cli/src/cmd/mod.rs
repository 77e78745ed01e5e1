pub mod analyze;
pub mod graph;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Args;

use collabnet_core::config::{AnalysisConfig, CONFIG_FILE_NAME, load_config};
use collabnet_core::error::ErrorCode;

/// Input tables and configuration shared by every command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Developer table (CSV with at least `login` and `country`).
    #[arg(long, value_name = "CSV")]
    pub countries: PathBuf,

    /// Per-repository activity table (CSV with `repo_name` and `login`).
    #[arg(long, value_name = "CSV")]
    pub metrics: PathBuf,

    /// Config file. Defaults to `collabnet.toml` in the working directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl InputArgs {
    /// Load the config file, falling back to defaults when the implicit
    /// `collabnet.toml` is absent. An explicit `--config` must exist.
    pub fn load_config(&self) -> anyhow::Result<AnalysisConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        if self.config.is_some() && !path.exists() {
            return Err(anyhow!("config file not found: {}", path.display())
                .context(ErrorCode::ConfigParseError));
        }

        load_config(&path).context(ErrorCode::ConfigParseError)
    }
}
