//! End-to-end runs of the analysis pipeline on small CSV inputs.

use std::fs;
use std::path::{Path, PathBuf};

use collabnet_analytics::pipeline::{TIMINGS_FILE_NAME, run_analysis};
use collabnet_core::config::AnalysisConfig;
use collabnet_core::error::AnalysisError;
use collabnet_core::persist::{BatchPersistence, CHECKPOINT_FILE_NAME, FINAL_TABLE_NAME};
use collabnet_core::profile::{CountryType, DeveloperProfile};
use collabnet_core::record::DeveloperMetrics;

const COUNTRIES: &str = "repo_name,login,country\n\
    R1,X,Brazil\n\
    R1,Y,Germany\n\
    R1,Z,India\n\
    R2,Z,India\n\
    R2,W,Canada\n\
    R3,loner,Kenya\n";

const METRICS: &str = "login,repo_name,prs_opened,prs_merged,commits_total,reviews_submitted,avg_time_to_merge\n\
    X,R1,12,3,200,4,15\n\
    Y,R1,1,0,2,0,\n\
    Z,R1,2,1,10,1,45\n\
    W,R2,0,0,1,0,N/A\n\
    loner,R3,0,0,0,0,3\n";

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let countries = dir.join("countries.csv");
    let metrics = dir.join("metrics.csv");
    fs::write(&countries, COUNTRIES).expect("write countries");
    fs::write(&metrics, METRICS).expect("write metrics");
    (countries, metrics)
}

fn config(out: &Path, batch_size: usize) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.persist.output_dir = out.to_path_buf();
    config.persist.batch_size = batch_size;
    config
}

fn read_table(out: &Path) -> Vec<DeveloperMetrics> {
    csv::Reader::from_path(out.join(FINAL_TABLE_NAME))
        .expect("open table")
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("parse table")
}

#[test]
fn full_run_writes_one_row_per_developer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (countries, metrics) = write_inputs(dir.path());
    let out = dir.path().join("out");

    let outcome = run_analysis(&countries, &metrics, &config(&out, 2)).expect("run");
    let summary = &outcome.summary;
    assert_eq!(summary.developers, 5);
    assert_eq!(summary.nodes, 4);
    assert_eq!(summary.isolated, 1);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.checkpoint, "fresh");
    assert!(out.join(TIMINGS_FILE_NAME).exists());
    assert!(!out.join(CHECKPOINT_FILE_NAME).exists());

    let rows = read_table(&out);
    let logins: Vec<&str> = rows.iter().map(|r| r.login.as_str()).collect();
    assert_eq!(logins, ["W", "X", "Y", "Z", "loner"]);

    let z = &rows[3];
    assert!((z.degree_centrality - 1.0).abs() < 1e-9);
    assert!((z.betweenness_centrality - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(z.degree, 3);
    assert_eq!(z.country_type, CountryType::Emerging);

    let x = &rows[1];
    assert_eq!(x.developer_profile, DeveloperProfile::Core);
    // (15 / 30) · ((12 + 200/10) / 10) = 1.6.
    assert!((x.absence_impact - 1.6).abs() < 1e-9);
    assert_eq!(x.country, "Brazil");
    assert_eq!(x.prs_opened, 12);

    let loner = &rows[4];
    assert!(loner.is_isolated);
    assert_eq!(loner.degree, 0);
    assert!(loner.degree_centrality.abs() < f64::EPSILON);
    assert_eq!(loner.developer_profile, DeveloperProfile::Newcomer);
    assert!((loner.absence_impact - 0.0).abs() < f64::EPSILON);

    assert_eq!(rows[2].developer_profile, DeveloperProfile::Newcomer);
    assert_eq!(rows[0].country_type, CountryType::Developed);
}

#[test]
fn final_report_tallies_profiles_and_brokers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (countries, metrics) = write_inputs(dir.path());

    let outcome = run_analysis(&countries, &metrics, &config(&dir.path().join("out"), 2)).expect("run");
    let report = &outcome.summary.report;

    // X: 15 PRs. Z: 10 commits. Y, W, loner fall below every peripheral threshold.
    assert_eq!(report.profiles.core, 1);
    assert_eq!(report.profiles.peripheral, 1);
    assert_eq!(report.profiles.newcomer, 3);
    assert!((report.profiles.core_share - 0.2).abs() < 1e-12);
    assert_eq!(report.profiles.emerging, 3);
    assert_eq!(report.profiles.developed, 2);

    // Four graph nodes plus the isolated developer, capped at five.
    assert_eq!(report.top_betweenness.len(), 5);
    let top = &report.top_betweenness[0];
    assert_eq!(top.login, "Z");
    assert_eq!(top.country, "India");
    assert!((top.betweenness - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn oversized_counters_saturate_instead_of_overflowing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let countries = dir.path().join("countries.csv");
    let metrics = dir.path().join("metrics.csv");
    fs::write(&countries, "repo_name,login,country\nr1,a,Chile\nr1,b,Peru\n").expect("write");
    fs::write(
        &metrics,
        "login,repo_name,prs_opened,prs_merged,commits_total,reviews_submitted,avg_time_to_merge\n\
         a,r1,1e20,1,1,1,2\n\
         b,r1,1,0,1e20,0,4\n",
    )
    .expect("write");
    let out = dir.path().join("out");

    run_analysis(&countries, &metrics, &config(&out, 10)).expect("run");

    let rows = read_table(&out);
    assert_eq!(rows[0].login, "a");
    assert_eq!(rows[0].prs_opened, u64::MAX);
    assert_eq!(rows[0].developer_profile, DeveloperProfile::Core);
    assert_eq!(rows[1].commits_total, u64::MAX);
    assert_eq!(rows[1].developer_profile, DeveloperProfile::Core);
    assert!(rows.iter().all(|r| r.absence_impact.is_finite()));
}

#[test]
fn resumed_run_matches_uninterrupted_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (countries, metrics) = write_inputs(dir.path());

    let clean = dir.path().join("clean");
    let clean_run = run_analysis(&countries, &metrics, &config(&clean, 2)).expect("clean run");
    let expected = read_table(&clean);

    // Reproduce a crash after batch 1: the checkpoint holds only that batch.
    let out = dir.path().join("resumed");
    let cfg = config(&out, 2);
    let first = run_analysis(&countries, &metrics, &cfg).expect("first run");
    {
        let mut persistence =
            BatchPersistence::open(&out, 2, &first.summary.fingerprint, true).expect("open");
        persistence.write_batch(1, &expected[0..2]).expect("batch 1");
    }

    let resumed = run_analysis(&countries, &metrics, &cfg).expect("resumed run");
    assert_eq!(resumed.summary.checkpoint, "resumed");
    assert_eq!(resumed.summary.batches_skipped, 1);
    assert_eq!(resumed.summary.batches_written, 2);
    assert_eq!(read_table(&out), expected);
    assert_eq!(resumed.summary.report, clean_run.summary.report);
}

#[test]
fn graph_without_collaboration_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let countries = dir.path().join("countries.csv");
    let metrics = dir.path().join("metrics.csv");
    fs::write(&countries, "repo_name,login,country\nR1,a,Peru\nR2,b,Chile\n").expect("write");
    fs::write(&metrics, "login,prs_opened\na,1\nb,2\n").expect("write");

    let err = run_analysis(&countries, &metrics, &config(&dir.path().join("out"), 10))
        .expect_err("empty graph");
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::EmptyGraph)
    ));
}
