use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use collabnet_analytics::metrics::{BetweennessMethod, ClosenessMethod};
use collabnet_analytics::pipeline::{RunSummary, run_analysis};
use collabnet_core::config::{AnalysisConfig, ImpactVariant};

use super::InputArgs;
use crate::output::{OutputMode, kv, percent, render, section};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory for `network_metrics.csv` (overrides `persist.output_dir`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Ignore any existing checkpoint and recompute every batch.
    #[arg(long)]
    pub fresh: bool,

    /// Seed for betweenness pivot sampling.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Absence-impact formula: `unbounded` or `capped`.
    #[arg(long, value_name = "VARIANT")]
    pub impact_variant: Option<ImpactVariant>,

    /// Developers per partial batch file.
    #[arg(long, value_name = "N", value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of the file configuration.
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(out) = &self.out {
            config.persist.output_dir.clone_from(out);
        }
        if self.fresh {
            config.persist.resume = false;
        }
        if let Some(seed) = self.seed {
            config.centrality.seed = seed;
        }
        if let Some(variant) = self.impact_variant {
            config.impact.variant = variant;
        }
        if let Some(batch_size) = self.batch_size {
            config.persist.batch_size = batch_size;
        }
    }
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode, timing: bool) -> anyhow::Result<()> {
    let mut config = args.input.load_config()?;
    args.apply(&mut config);
    debug!(?config, "effective configuration");

    let outcome = run_analysis(&args.input.countries, &args.input.metrics, &config)?;

    if timing {
        eprintln!("timing report:");
        eprint!("{}", outcome.timer.display_table());
    }

    render(output, &outcome.summary, write_summary)
}

fn write_summary(s: &RunSummary, w: &mut dyn Write) -> io::Result<()> {
    section(w, "Analysis complete")?;
    kv(w, "developers", s.developers.to_string())?;
    kv(w, "joined rows", s.joined_rows.to_string())?;
    kv(w, "nodes", s.nodes.to_string())?;
    kv(w, "edges", s.edges.to_string())?;
    kv(w, "isolated developers", s.isolated.to_string())?;
    kv(
        w,
        "largest component",
        format!(
            "{} ({})",
            s.graph.largest_component_size,
            percent(s.graph.largest_component_share)
        ),
    )?;
    writeln!(w)?;

    section(w, "Methods")?;
    let betweenness = match s.centrality.betweenness {
        BetweennessMethod::Exact => "exact".to_string(),
        BetweennessMethod::Sampled { pivots, seed } => {
            format!("sampled ({pivots} pivots, seed {seed})")
        }
    };
    kv(w, "betweenness", betweenness)?;
    let closeness = match s.centrality.closeness {
        ClosenessMethod::Harmonic => "harmonic".to_string(),
        ClosenessMethod::LargestComponent { size } => {
            format!("largest component ({size} nodes)")
        }
    };
    kv(w, "closeness", closeness)?;
    kv(
        w,
        "eigenvector",
        format!(
            "{:?} after {} iterations",
            s.centrality.eigenvector, s.centrality.eigenvector_iterations
        ),
    )?;
    writeln!(w)?;

    let p = &s.report.profiles;
    section(w, "Developer profiles")?;
    for (label, count) in [
        ("core", p.core),
        ("peripheral", p.peripheral),
        ("newcomer", p.newcomer),
    ] {
        kv(w, label, format!("{count} ({})", percent(p.share(count))))?;
    }
    kv(w, "emerging / developed", format!("{} / {}", p.emerging, p.developed))?;
    writeln!(w)?;

    section(w, "Top brokers (betweenness)")?;
    for (rank, dev) in s.report.top_betweenness.iter().enumerate() {
        writeln!(
            w,
            "  {}. {:<20} {:<14} {:.6}",
            rank + 1,
            dev.login,
            dev.country,
            dev.betweenness
        )?;
    }
    writeln!(w)?;

    section(w, "Persistence")?;
    kv(w, "checkpoint", s.checkpoint)?;
    kv(
        w,
        "batches",
        format!(
            "{} ({} written, {} skipped)",
            s.batches, s.batches_written, s.batches_skipped
        ),
    )?;
    kv(w, "output", s.output.display().to_string())?;
    kv(w, "timings", s.timings.display().to_string())?;
    Ok(())
}
