//! End-of-run report: profile distribution, country split and the top
//! brokers by betweenness.

use serde::Serialize;
use tracing::info;

use collabnet_core::profile::{CountryType, DeveloperProfile};
use collabnet_core::record::DeveloperMetrics;

use crate::describe::top_k;

/// Developers listed in [`FinalReport::top_betweenness`].
pub const TOP_BROKERS: usize = 5;

/// Developer counts per profile and per country type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfileBreakdown {
    pub core: usize,
    pub peripheral: usize,
    pub newcomer: usize,
    /// Fraction of developers classified as core, `0.0` when there are none.
    pub core_share: f64,
    pub emerging: usize,
    pub developed: usize,
}

impl ProfileBreakdown {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.core + self.peripheral + self.newcomer
    }

    /// Fraction of all developers with `count`.
    #[must_use]
    pub fn share(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDeveloper {
    pub login: String,
    pub country: String,
    pub betweenness: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinalReport {
    pub profiles: ProfileBreakdown,
    pub top_betweenness: Vec<TopDeveloper>,
}

impl FinalReport {
    /// Tally every output row. Ties in betweenness keep row order.
    #[must_use]
    pub fn of(rows: &[DeveloperMetrics]) -> Self {
        let mut profiles = ProfileBreakdown::default();
        for row in rows {
            match row.developer_profile {
                DeveloperProfile::Core => profiles.core += 1,
                DeveloperProfile::Peripheral => profiles.peripheral += 1,
                DeveloperProfile::Newcomer => profiles.newcomer += 1,
            }
            match row.country_type {
                CountryType::Emerging => profiles.emerging += 1,
                CountryType::Developed => profiles.developed += 1,
            }
        }
        profiles.core_share = profiles.share(profiles.core);

        let betweenness: Vec<f64> = rows.iter().map(|r| r.betweenness_centrality).collect();
        let top_betweenness = top_k(&betweenness, TOP_BROKERS)
            .into_iter()
            .map(|i| TopDeveloper {
                login: rows[i].login.clone(),
                country: rows[i].country.clone(),
                betweenness: rows[i].betweenness_centrality,
            })
            .collect();

        Self {
            profiles,
            top_betweenness,
        }
    }

    pub fn log(&self) {
        let p = &self.profiles;
        for (profile, count) in [
            (DeveloperProfile::Core, p.core),
            (DeveloperProfile::Peripheral, p.peripheral),
            (DeveloperProfile::Newcomer, p.newcomer),
        ] {
            info!(
                profile = profile.label(),
                count,
                percent = format!("{:.1}", p.share(count) * 100.0),
                "developer profile"
            );
        }
        info!(
            core_share = format!("{:.1}%", p.core_share * 100.0),
            emerging = p.emerging,
            developed = p.developed,
            "country distribution"
        );
        for (rank, dev) in self.top_betweenness.iter().enumerate() {
            info!(
                rank = rank + 1,
                login = %dev.login,
                country = %dev.country,
                betweenness = dev.betweenness,
                "top broker by betweenness"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(login: &str, profile: DeveloperProfile, country: &str, betweenness: f64) -> DeveloperMetrics {
        DeveloperMetrics {
            login: login.to_string(),
            degree_centrality: 0.0,
            betweenness_centrality: betweenness,
            closeness_centrality: 0.0,
            eigenvector_centrality: 0.0,
            structural_hole_spanners: 0.0,
            absence_impact: 0.0,
            developer_profile: profile,
            degree: 0,
            is_isolated: true,
            country_type: CountryType::classify(country),
            country: country.to_string(),
            prs_opened: 0,
            commits_total: 0,
            reviews_submitted: 0,
        }
    }

    #[test]
    fn counts_profiles_and_country_types() {
        let rows = [
            row("a", DeveloperProfile::Core, "Brazil", 0.5),
            row("b", DeveloperProfile::Newcomer, "Germany", 0.0),
            row("c", DeveloperProfile::Newcomer, "India", 0.1),
            row("d", DeveloperProfile::Peripheral, "Canada", 0.0),
        ];
        let report = FinalReport::of(&rows);

        assert_eq!(report.profiles.core, 1);
        assert_eq!(report.profiles.peripheral, 1);
        assert_eq!(report.profiles.newcomer, 2);
        assert!((report.profiles.core_share - 0.25).abs() < 1e-12);
        assert_eq!(report.profiles.emerging, 2);
        assert_eq!(report.profiles.developed, 2);
        assert!((report.profiles.share(2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn top_brokers_are_capped_and_ordered() {
        let rows: Vec<_> = (0..7)
            .map(|i| row(&format!("dev{i}"), DeveloperProfile::Newcomer, "Chile", f64::from(i % 4)))
            .collect();
        let top = FinalReport::of(&rows).top_betweenness;

        assert_eq!(top.len(), TOP_BROKERS);
        let logins: Vec<_> = top.iter().map(|d| d.login.as_str()).collect();
        assert_eq!(logins, ["dev3", "dev2", "dev6", "dev1", "dev5"]);
        assert_eq!(top[0].country, "Chile");
    }

    #[test]
    fn empty_run_reports_zero_share() {
        let report = FinalReport::of(&[]);
        assert_eq!(report.profiles.total(), 0);
        assert!(report.profiles.core_share.abs() < f64::EPSILON);
        assert!(report.top_betweenness.is_empty());
    }
}
