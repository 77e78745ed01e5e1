//! Property tests for the input join and developer classification.

use std::collections::HashMap;

use collabnet_core::config::ProfileThresholds;
use collabnet_core::input::{CountryRow, MetricsRow, join_tables};
use collabnet_core::profile::DeveloperProfile;
use proptest::prelude::*;

fn rank(p: DeveloperProfile) -> u8 {
    match p {
        DeveloperProfile::Newcomer => 0,
        DeveloperProfile::Peripheral => 1,
        DeveloperProfile::Core => 2,
    }
}

fn country_rows() -> impl Strategy<Value = Vec<CountryRow>> {
    prop::collection::vec((0..4usize, 0..6usize), 0..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(repo, login)| CountryRow {
                repo_name: format!("repo{repo}"),
                login: format!("dev{login}"),
                country: "Chile".to_string(),
            })
            .collect()
    })
}

fn metrics_rows() -> impl Strategy<Value = Vec<MetricsRow>> {
    prop::collection::vec((0..8usize, 0..20u64), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(login, prs)| MetricsRow {
                login: format!("dev{login}"),
                repo_name: String::new(),
                prs_opened: prs,
                prs_merged: 0,
                commits_total: 0,
                reviews_submitted: 0,
                avg_time_to_merge: None,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn join_pairs_every_country_row_with_every_metrics_row(
        countries in country_rows(),
        metrics in metrics_rows(),
    ) {
        let joined = join_tables(&countries, &metrics);

        let mut country_count: HashMap<&str, usize> = HashMap::new();
        for c in &countries {
            *country_count.entry(c.login.as_str()).or_default() += 1;
        }
        let mut metrics_count: HashMap<&str, usize> = HashMap::new();
        for m in &metrics {
            *metrics_count.entry(m.login.as_str()).or_default() += 1;
        }

        let expected: usize = country_count
            .iter()
            .map(|(login, n)| n * metrics_count.get(login).copied().unwrap_or(0))
            .sum();
        prop_assert_eq!(joined.len(), expected);

        for row in &joined.rows {
            prop_assert!(country_count.contains_key(row.login.as_str()));
            prop_assert!(metrics_count.contains_key(row.login.as_str()));
        }
    }

    #[test]
    fn more_activity_never_lowers_the_profile(
        prs in 0..40u64,
        commits in 0..120u64,
        reviews in 0..40u64,
        extra in 0..20u64,
    ) {
        let t = ProfileThresholds::default();
        let base = DeveloperProfile::classify(prs, commits, reviews, &t);
        for bumped in [
            DeveloperProfile::classify(prs + extra, commits, reviews, &t),
            DeveloperProfile::classify(prs, commits + extra, reviews, &t),
            DeveloperProfile::classify(prs, commits, reviews + extra, &t),
        ] {
            prop_assert!(rank(bumped) >= rank(base));
        }
    }
}
