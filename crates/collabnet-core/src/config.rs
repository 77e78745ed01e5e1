//! Analysis configuration loaded from `collabnet.toml`.
//!
//! Every field has a serde default so a missing file, a missing section, or a
//! partially filled section all resolve to the documented defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "collabnet.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub holes: HolesConfig,
    #[serde(default)]
    pub impact: ImpactConfig,
    #[serde(default)]
    pub profile: ProfileThresholds,
    #[serde(default)]
    pub persist: PersistConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Log progress (and a memory snapshot) every this many repositories.
    #[serde(default = "default_repo_progress_every")]
    pub progress_every: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            progress_every: default_repo_progress_every(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    /// Largest node count for which betweenness is computed exactly.
    #[serde(default = "default_exact_betweenness_max_nodes")]
    pub exact_betweenness_max_nodes: usize,
    #[serde(default = "default_min_pivots")]
    pub min_pivots: usize,
    #[serde(default = "default_max_pivots")]
    pub max_pivots: usize,
    /// Seed for pivot selection; fixed so sampled runs are reproducible.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Node count above which closeness switches to the harmonic variant.
    #[serde(default = "default_harmonic_closeness_min_nodes")]
    pub harmonic_closeness_min_nodes: usize,
    #[serde(default = "default_power_max_iter")]
    pub eigenvector_max_iter: usize,
    #[serde(default = "default_power_tolerance")]
    pub eigenvector_tolerance: f64,
    #[serde(default = "default_damping")]
    pub pagerank_damping: f64,
    #[serde(default = "default_power_max_iter")]
    pub pagerank_max_iter: usize,
    #[serde(default = "default_power_tolerance")]
    pub pagerank_tolerance: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            exact_betweenness_max_nodes: default_exact_betweenness_max_nodes(),
            min_pivots: default_min_pivots(),
            max_pivots: default_max_pivots(),
            seed: default_seed(),
            harmonic_closeness_min_nodes: default_harmonic_closeness_min_nodes(),
            eigenvector_max_iter: default_power_max_iter(),
            eigenvector_tolerance: default_power_tolerance(),
            pagerank_damping: default_damping(),
            pagerank_max_iter: default_power_max_iter(),
            pagerank_tolerance: default_power_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolesConfig {
    /// Nodes processed between progress reports.
    #[serde(default = "default_holes_batch_size")]
    pub batch_size: usize,
}

impl Default for HolesConfig {
    fn default() -> Self {
        Self {
            batch_size: default_holes_batch_size(),
        }
    }
}

/// Which absence-impact formula to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactVariant {
    /// Intermediate terms and the product are left unbounded.
    #[default]
    Unbounded,
    /// Time term capped at 2.0, activity at 1.5, product at 1.0.
    Capped,
}

impl std::str::FromStr for ImpactVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unbounded" => Ok(Self::Unbounded),
            "capped" => Ok(Self::Capped),
            other => anyhow::bail!("unknown impact variant '{other}' (expected unbounded|capped)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactConfig {
    #[serde(default = "default_threshold_days")]
    pub threshold_days: f64,
    #[serde(default)]
    pub variant: ImpactVariant,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold_days(),
            variant: ImpactVariant::default(),
        }
    }
}

/// Activity thresholds for the three developer profiles.
///
/// A developer is `Core` when any core threshold is met, otherwise
/// `Peripheral` when any peripheral threshold is met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileThresholds {
    #[serde(default = "default_core_prs")]
    pub core_prs: u64,
    #[serde(default = "default_core_commits")]
    pub core_commits: u64,
    #[serde(default = "default_core_reviews")]
    pub core_reviews: u64,
    #[serde(default = "default_peripheral_prs")]
    pub peripheral_prs: u64,
    #[serde(default = "default_peripheral_commits")]
    pub peripheral_commits: u64,
    #[serde(default = "default_peripheral_reviews")]
    pub peripheral_reviews: u64,
}

impl Default for ProfileThresholds {
    fn default() -> Self {
        Self {
            core_prs: default_core_prs(),
            core_commits: default_core_commits(),
            core_reviews: default_core_reviews(),
            peripheral_prs: default_peripheral_prs(),
            peripheral_commits: default_peripheral_commits(),
            peripheral_reviews: default_peripheral_reviews(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Developer rows per partial batch file.
    #[serde(default = "default_persist_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Resume from a matching checkpoint log when one exists.
    #[serde(default = "default_true")]
    pub resume: bool,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            batch_size: default_persist_batch_size(),
            output_dir: default_output_dir(),
            resume: default_true(),
        }
    }
}

impl AnalysisConfig {
    /// Stable BLAKE3 digest of every setting that influences result values.
    ///
    /// Output location and the resume flag are excluded so moving a run or
    /// toggling resumption does not invalidate a checkpoint.
    #[must_use]
    pub fn result_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for part in [
            serde_json::to_string(&self.centrality),
            serde_json::to_string(&self.impact),
            serde_json::to_string(&self.profile),
        ] {
            hasher.update(part.unwrap_or_default().as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

/// Load configuration from `path`, or defaults when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        return Ok(AnalysisConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

const fn default_repo_progress_every() -> usize {
    50
}

const fn default_exact_betweenness_max_nodes() -> usize {
    5000
}

const fn default_min_pivots() -> usize {
    500
}

const fn default_max_pivots() -> usize {
    1000
}

const fn default_seed() -> u64 {
    42
}

const fn default_harmonic_closeness_min_nodes() -> usize {
    15_000
}

const fn default_power_max_iter() -> usize {
    10_000
}

const fn default_power_tolerance() -> f64 {
    1e-6
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_holes_batch_size() -> usize {
    1000
}

const fn default_threshold_days() -> f64 {
    30.0
}

const fn default_core_prs() -> u64 {
    10
}

const fn default_core_commits() -> u64 {
    50
}

const fn default_core_reviews() -> u64 {
    10
}

const fn default_peripheral_prs() -> u64 {
    3
}

const fn default_peripheral_commits() -> u64 {
    5
}

const fn default_peripheral_reviews() -> u64 {
    3
}

const fn default_persist_batch_size() -> usize {
    50
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
