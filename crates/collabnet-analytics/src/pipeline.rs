//! End-to-end analysis run: inputs → graph → metrics → persisted table.
//!
//! # Steps
//!
//! ```text
//! load inputs        countries ⋈ metrics on login
//! build graph        repo → contributors ⇒ CollaborationGraph (empty ⇒ fatal)
//! centrality         degree, betweenness, closeness, eigenvector
//! structural holes   Burt constraint per node
//! absence impact     per developer, from joined rows
//! persist            sorted logins → batches → network_metrics.csv
//! final report       profile distribution, country split, top brokers
//! ```
//!
//! Each step is timed by a [`RunTimer`]; the timings are written to
//! `timings.json` next to the final table.
//!
//! The checkpoint fingerprint combines the graph content hash, a digest of
//! the joined input rows, the result-affecting configuration hash and the
//! batch size. Any change to one of them invalidates earlier partial batches.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument};

use collabnet_core::config::{AnalysisConfig, ProfileThresholds};
use collabnet_core::error::AnalysisError;
use collabnet_core::input::{DeveloperRow, JoinedTable, load_inputs};
use collabnet_core::persist::{BatchPersistence, CheckpointState};
use collabnet_core::profile::{CountryType, DeveloperProfile};
use collabnet_core::record::DeveloperMetrics;
use collabnet_core::timing::RunTimer;

use crate::graph::{CollaborationGraph, Components, GraphStats, RepoStats};
use crate::holes::{StructuralHoles, structural_holes};
use crate::impact::{saturating_total, score_developers};
use crate::metrics::{CentralityReport, CentralityScores, compute_centrality};
use crate::report::FinalReport;

/// File name of the step timing report in the output directory.
pub const TIMINGS_FILE_NAME: &str = "timings.json";

// ---------------------------------------------------------------------------
// Graph preparation
// ---------------------------------------------------------------------------

/// A built, non-empty graph with its statistics.
#[derive(Debug, Clone)]
pub struct PreparedGraph {
    pub graph: CollaborationGraph,
    pub components: Components,
    pub repo_stats: RepoStats,
    pub stats: GraphStats,
}

/// Build the collaboration graph of a joined table and log its shape.
///
/// # Errors
///
/// [`AnalysisError::EmptyGraph`] when no repository has two contributors.
#[instrument(skip_all, fields(rows = joined.len()))]
pub fn prepare_graph(
    joined: &JoinedTable,
    config: &AnalysisConfig,
) -> Result<PreparedGraph, AnalysisError> {
    let repos = joined.repo_contributors();
    let repo_stats = RepoStats::from_repositories(&repos);
    repo_stats.log();

    let graph = CollaborationGraph::build(&repos, config.graph.progress_every);
    if graph.is_empty() {
        return Err(AnalysisError::EmptyGraph);
    }

    let components = Components::of(&graph);
    components.log_connectivity();
    let stats = GraphStats::compute(&graph, &components);

    Ok(PreparedGraph {
        graph,
        components,
        repo_stats,
        stats,
    })
}

/// Load both tables and build the graph only.
///
/// # Errors
///
/// Any input or empty-graph error.
pub fn inspect_graph(
    countries: &Path,
    metrics: &Path,
    config: &AnalysisConfig,
) -> Result<PreparedGraph> {
    let joined = load_inputs(countries, metrics)?;
    Ok(prepare_graph(&joined, config)?)
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Machine-readable outcome of [`run_analysis`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub developers: usize,
    pub joined_rows: usize,
    pub nodes: usize,
    pub edges: usize,
    /// Developers in the output table that are not graph nodes.
    pub isolated: usize,
    pub batches: usize,
    pub batches_written: usize,
    pub batches_skipped: usize,
    /// `fresh`, `resumed` or `discarded`.
    pub checkpoint: &'static str,
    pub output: PathBuf,
    pub timings: PathBuf,
    pub fingerprint: String,
    pub centrality: CentralityReport,
    pub repositories: RepoStats,
    pub graph: GraphStats,
    /// Computed over every developer, including batches skipped on resume.
    pub report: FinalReport,
}

/// Summary plus the step timer, for callers that render timings.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub summary: RunSummary,
    pub timer: RunTimer,
}

/// Run the whole analysis and write `network_metrics.csv` into
/// `config.persist.output_dir`.
///
/// # Errors
///
/// [`AnalysisError`] for input and graph failures,
/// [`collabnet_core::persist::PersistError`] for persistence failures, and
/// I/O errors writing the timing report. All are fatal.
#[instrument(skip(config), fields(out = %config.persist.output_dir.display()))]
pub fn run_analysis(countries: &Path, metrics: &Path, config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    let mut timer = RunTimer::new();

    let joined = timer.step("load inputs", || load_inputs(countries, metrics))?;
    let prepared = timer.step("build graph", || prepare_graph(&joined, config))?;
    let graph = &prepared.graph;

    let centrality = timer.step("centrality", || {
        compute_centrality(graph, &prepared.components, &config.centrality)
    });

    let holes = timer.step("structural holes", || {
        let holes = structural_holes(graph, config.holes.batch_size);
        holes.log_summary(graph);
        holes
    });

    let by_developer = joined.by_developer();
    let impacts = timer.step("absence impact", || score_developers(&by_developer, &config.impact));

    let fingerprint = run_fingerprint(graph, &joined, config);
    let out_dir = config.persist.output_dir.clone();
    let ctx = RowContext {
        graph,
        centrality: &centrality,
        holes: &holes,
        impacts: &impacts,
        thresholds: &config.profile,
    };

    let (state, batches, output) = timer.step("persist", || -> Result<_> {
        let mut persistence = BatchPersistence::open(
            &out_dir,
            config.persist.batch_size,
            &fingerprint,
            config.persist.resume,
        )?;
        let state = persistence.state();

        let logins: Vec<&str> = by_developer.keys().copied().collect();
        let batches = persistence.run(&logins, |login| {
            let rows = by_developer.get(login).map_or(&[][..], Vec::as_slice);
            ctx.developer_row(login, rows)
        })?;

        let (output, rows) = persistence.finish::<DeveloperMetrics>(batches.batches)?;
        info!(rows, path = %output.display(), "final table written");
        Ok((state, batches, output))
    })?;
    let isolated = by_developer
        .keys()
        .filter(|login| graph.node_index(login).is_none())
        .count();

    let report = timer.step("final report", || {
        let rows: Vec<DeveloperMetrics> = by_developer
            .iter()
            .map(|(login, rows)| ctx.developer_row(login, rows))
            .collect();
        let report = FinalReport::of(&rows);
        report.log();
        report
    });

    let timings = out_dir.join(TIMINGS_FILE_NAME);
    write_timings(&timer, &timings)?;

    let summary = RunSummary {
        developers: by_developer.len(),
        joined_rows: joined.len(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        isolated,
        batches: batches.batches,
        batches_written: batches.written,
        batches_skipped: batches.skipped,
        checkpoint: match state {
            CheckpointState::Fresh => "fresh",
            CheckpointState::Resumed { .. } => "resumed",
            CheckpointState::Discarded => "discarded",
        },
        output,
        timings,
        fingerprint,
        centrality: centrality.report,
        repositories: prepared.repo_stats.clone(),
        graph: prepared.stats.clone(),
        report,
    };
    info!(
        developers = summary.developers,
        nodes = summary.nodes,
        edges = summary.edges,
        "analysis complete"
    );

    Ok(AnalysisOutcome { summary, timer })
}

/// Fingerprint pinning a checkpoint log to one input snapshot and config.
#[must_use]
pub fn run_fingerprint(graph: &CollaborationGraph, joined: &JoinedTable, config: &AnalysisConfig) -> String {
    format!(
        "graph={};input={};config={};batch={}",
        graph.content_hash(),
        input_digest(joined),
        config.result_hash(),
        config.persist.batch_size.max(1)
    )
}

fn input_digest(joined: &JoinedTable) -> String {
    let mut hasher = blake3::Hasher::new();
    for row in &joined.rows {
        for field in [&row.login, &row.repo_name, &row.country] {
            hasher.update(field.as_bytes());
            hasher.update(b"\x00");
        }
        for count in [row.prs_opened, row.prs_merged, row.commits_total, row.reviews_submitted] {
            hasher.update(&count.to_le_bytes());
        }
        let time = row.avg_time_to_merge.map_or(u64::MAX, f64::to_bits);
        hasher.update(&time.to_le_bytes());
        hasher.update(b"\n");
    }
    format!("blake3:{}", hasher.finalize())
}

fn write_timings(timer: &RunTimer, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&timer.to_json()).context("serialize timings")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

// ---------------------------------------------------------------------------
// Row assembly
// ---------------------------------------------------------------------------

/// Everything needed to turn one login into an output row.
struct RowContext<'a> {
    graph: &'a CollaborationGraph,
    centrality: &'a CentralityScores,
    holes: &'a StructuralHoles,
    impacts: &'a BTreeMap<String, f64>,
    thresholds: &'a ProfileThresholds,
}

impl RowContext<'_> {
    fn developer_row(&self, login: &str, rows: &[&DeveloperRow]) -> DeveloperMetrics {
        let node = self.graph.node_index(login);
        let scores = node.map(|i| self.centrality.get(i)).unwrap_or_default();
        let holes = node.map_or(0.0, |i| self.holes.get(i).structural_holes);
        let degree = node.map_or(0, |i| self.graph.degree(i));

        let prs = saturating_total(rows.iter().flat_map(|r| [r.prs_opened, r.prs_merged]));
        let commits = saturating_total(rows.iter().map(|r| r.commits_total));
        let reviews = saturating_total(rows.iter().map(|r| r.reviews_submitted));

        let first = rows.first();
        let country = first.map(|r| r.country.clone()).unwrap_or_default();

        DeveloperMetrics {
            login: login.to_string(),
            degree_centrality: scores.degree,
            betweenness_centrality: scores.betweenness,
            closeness_centrality: scores.closeness,
            eigenvector_centrality: scores.eigenvector,
            structural_hole_spanners: holes,
            absence_impact: self.impacts.get(login).copied().unwrap_or(0.0),
            developer_profile: DeveloperProfile::classify(prs, commits, reviews, self.thresholds),
            degree,
            is_isolated: degree == 0,
            country_type: CountryType::classify(&country),
            country,
            prs_opened: first.map_or(0, |r| r.prs_opened),
            commits_total: first.map_or(0, |r| r.commits_total),
            reviews_submitted: first.map_or(0, |r| r.reviews_submitted),
        }
    }
}
