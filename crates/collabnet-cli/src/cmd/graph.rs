use std::io::{self, Write};

use clap::Args;
use serde::Serialize;

use collabnet_analytics::graph::{GraphStats, RepoStats};
use collabnet_analytics::pipeline::inspect_graph;
use collabnet_core::timing::RunTimer;

use super::InputArgs;
use crate::output::{OutputMode, kv, percent, render, section};

#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also list every weighted edge.
    #[arg(long)]
    pub edges: bool,
}

#[derive(Debug, Serialize)]
struct EdgeRow {
    source: String,
    target: String,
    weight: u32,
}

#[derive(Debug, Serialize)]
struct GraphReport {
    repositories: RepoStats,
    graph: GraphStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    edges: Option<Vec<EdgeRow>>,
}

pub fn run_graph(args: &GraphArgs, output: OutputMode, timing: bool) -> anyhow::Result<()> {
    let config = args.input.load_config()?;

    let mut timer = RunTimer::new();
    let prepared = timer.step("build graph", || {
        inspect_graph(&args.input.countries, &args.input.metrics, &config)
    })?;

    if timing {
        eprintln!("timing report:");
        eprint!("{}", timer.display_table());
    }

    let edges = args.edges.then(|| {
        prepared
            .graph
            .weighted_edges()
            .into_iter()
            .map(|(a, b, weight)| EdgeRow {
                source: a.to_string(),
                target: b.to_string(),
                weight,
            })
            .collect()
    });

    let report = GraphReport {
        repositories: prepared.repo_stats,
        graph: prepared.stats,
        edges,
    };
    render(output, &report, write_report)
}

fn write_report(r: &GraphReport, w: &mut dyn Write) -> io::Result<()> {
    section(w, "Repositories")?;
    kv(w, "repositories", r.repositories.repositories.to_string())?;
    kv(w, "collaborative", r.repositories.collaborative.to_string())?;
    kv(
        w,
        "contributors mean",
        format!("{:.2}", r.repositories.mean_contributors),
    )?;
    kv(
        w,
        "contributors median",
        format!("{:.1}", r.repositories.median_contributors),
    )?;
    kv(
        w,
        "contributors max",
        r.repositories.max_contributors.to_string(),
    )?;
    writeln!(w)?;

    let g = &r.graph;
    section(w, "Collaboration graph")?;
    kv(w, "nodes", g.node_count.to_string())?;
    kv(w, "edges", g.edge_count.to_string())?;
    kv(w, "density", format!("{:.6}", g.density))?;
    kv(w, "mean degree", format!("{:.2}", g.mean_degree))?;
    kv(w, "total edge weight", g.total_edge_weight.to_string())?;
    kv(w, "max edge weight", g.max_edge_weight.to_string())?;
    kv(w, "components", g.component_count.to_string())?;
    kv(
        w,
        "largest component",
        format!(
            "{} ({})",
            g.largest_component_size,
            percent(g.largest_component_share)
        ),
    )?;
    kv(w, "content hash", &g.content_hash)?;

    if let Some(edges) = &r.edges {
        writeln!(w)?;
        section(w, "Edges")?;
        for e in edges {
            writeln!(w, "  {} -- {}  {}", e.source, e.target, e.weight)?;
        }
    }
    Ok(())
}
