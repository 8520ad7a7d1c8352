// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Normalized engagement metrics derived from one analysis run.
///
/// The synthesizer is deterministic: re-running it over the same
/// contribution summary and repository summaries yields bit-identical
/// scores. Randomness is confined to the per-repository estimates produced
/// during enrichment.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    contributions::ContributionSummary,
    events::ActivityEvent,
    repos::{RepositoryRecord, RepositoryRole, RepositorySummary}
};

/// Display colors by language, matching the GitHub linguist palette.
const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("TypeScript", "#3178c6"),
    ("JavaScript", "#f1e05a"),
    ("Python", "#3572A5"),
    ("Java", "#b07219"),
    ("C++", "#f34b7d"),
    ("C", "#555555"),
    ("C#", "#178600"),
    ("Go", "#00ADD8"),
    ("Rust", "#dea584"),
    ("Ruby", "#701516"),
    ("PHP", "#4F5D95"),
    ("Swift", "#F05138"),
    ("Kotlin", "#A97BFF"),
    ("Scala", "#c22d40"),
    ("HTML", "#e34c26"),
    ("CSS", "#563d7c"),
    ("Shell", "#89e051"),
    ("Vue", "#41b883"),
    ("Dart", "#00B4AB"),
];

/// Fallback color for languages outside the palette.
const OTHER_COLOR: &str = "#6e7681";

/// Maximum entries kept in the language distribution.
const LANGUAGE_DISTRIBUTION_SIZE: usize = 5;

/// One language's share of the analysis universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStat {
    pub language:   String,
    /// Independently rounded share; the list does not sum exactly to 100.
    pub percentage: u8,
    pub color:      String
}

/// Terminal aggregate of one analysis run.
///
/// `consistency_index`, `recency_score`, and `ownership_score` are integers
/// in `[0, 100]`; `collaboration_index` stays in `[0, 100]` but may carry up
/// to two decimal digits because its rounding happens on the scaled value.
/// Report consumers format it verbatim, so the asymmetry is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    pub consistency_index:   u8,
    pub recency_score:       u8,
    pub ownership_score:     u8,
    pub collaboration_index: f64,
    pub total_repos:         usize,
    pub active_repos:        usize,
    pub window_months:       u32,
    pub primary_languages:   Vec<LanguageStat>,
    pub contribution_summary: ContributionSummary,
    pub top_repositories:    Vec<RepositorySummary>,
    pub private_repo_count:  Option<u64>
}

fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| *name == language)
        .map_or(OTHER_COLOR, |(_, color)| color)
}

/// Size-weighted language distribution over the analysis universe.
///
/// Each repository contributes its primary language weighted by its size
/// metric (weight 1 when the size is absent or zero). Shares are rounded
/// independently per language; the top five are kept, sorted by descending
/// percentage. Empty when no repository reports a language.
pub fn language_distribution(repositories: &[RepositoryRecord]) -> Vec<LanguageStat> {
    let mut weights: std::collections::BTreeMap<&str, u64> = std::collections::BTreeMap::new();
    for repository in repositories {
        if let Some(language) = repository.language.as_deref() {
            let weight = if repository.size > 0 { repository.size } else { 1 };
            *weights.entry(language).or_insert(0) += weight;
        }
    }

    let total: u64 = weights.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut stats: Vec<LanguageStat> = weights
        .into_iter()
        .map(|(language, weight)| LanguageStat {
            language:   language.to_owned(),
            percentage: ((weight as f64 / total as f64) * 100.0).round() as u8,
            color:      language_color(language).to_owned()
        })
        .collect();

    stats.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    stats.truncate(LANGUAGE_DISTRIBUTION_SIZE);
    stats
}

/// Share of window weeks with any activity, as a percentage.
///
/// # Examples
///
/// ```
/// use gh_insight::consistency_index;
///
/// assert_eq!(consistency_index(6, 12), 50);
/// assert_eq!(consistency_index(0, 52), 0);
/// ```
pub fn consistency_index(active_weeks: u32, total_weeks: u32) -> u8 {
    if total_weeks == 0 {
        return 0;
    }
    let ratio = f64::from(active_weeks) / f64::from(total_weeks);
    ((ratio * 100.0).round()).min(100.0) as u8
}

/// Age-weighted mean over the event timeline, as a percentage.
///
/// Events weigh 1.0 up to 30 days old, 0.6 up to 60, 0.3 up to 90, and 0.1
/// beyond. Zero when the timeline is empty.
pub fn recency_score(events: &[ActivityEvent], now: DateTime<Utc>) -> u8 {
    if events.is_empty() {
        return 0;
    }

    let total: f64 = events
        .iter()
        .map(|event| {
            let days_ago = (now - event.created_at).num_seconds() as f64 / 86_400.0;
            if days_ago <= 30.0 {
                1.0
            } else if days_ago <= 60.0 {
                0.6
            } else if days_ago <= 90.0 {
                0.3
            } else {
                0.1
            }
        })
        .sum();

    let mean = total / events.len() as f64;
    ((mean * 100.0).round()).min(100.0) as u8
}

/// Mean estimated ownership plus a bonus for the owned share of the top
/// repositories. Zero when the enriched set is empty.
pub fn ownership_score(repositories: &[RepositorySummary]) -> u8 {
    if repositories.is_empty() {
        return 0;
    }

    let count = repositories.len() as f64;
    let mean_ownership = repositories
        .iter()
        .map(|repository| f64::from(repository.ownership_percentage))
        .sum::<f64>()
        / count;
    let owner_count = repositories
        .iter()
        .filter(|repository| repository.role == RepositoryRole::Owner)
        .count() as f64;
    let owner_bonus = owner_count / count * 20.0;

    (mean_ownership + owner_bonus).round().min(100.0) as u8
}

/// Weighted blend of merge rate, reviews given, and issues closed.
///
/// The raw value is rounded to two decimals before the cap, so the result
/// may carry up to two decimal digits.
///
/// # Examples
///
/// ```
/// use gh_insight::{ContributionSummary, collaboration_index};
///
/// let summary = ContributionSummary {
///     total_prs: 10,
///     merged_prs: 7,
///     reviews_given: 10,
///     issues_closed: 5,
///     ..ContributionSummary::default()
/// };
/// assert_eq!(collaboration_index(&summary), 88.0);
/// ```
pub fn collaboration_index(summary: &ContributionSummary) -> f64 {
    let merge_rate = if summary.total_prs > 0 {
        summary.merged_prs as f64 / summary.total_prs as f64
    } else {
        0.0
    };
    let review_score = (summary.reviews_given as f64 / 10.0).min(1.0);
    let issue_score = (summary.issues_closed as f64 / 5.0).min(1.0);

    let raw = merge_rate * 40.0 + review_score * 30.0 + issue_score * 30.0;
    ((raw * 100.0).round() / 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::repos::RepositoryOwner;

    fn repository(language: Option<&str>, size: u64) -> RepositoryRecord {
        RepositoryRecord {
            id:               1,
            name:             "repo".to_owned(),
            full_name:        "octocat/repo".to_owned(),
            owner:            RepositoryOwner {
                login: "octocat".to_owned()
            },
            description:      None,
            stargazers_count: 0,
            language:         language.map(str::to_owned),
            size,
            pushed_at:        None,
            fork:             false,
            private:          false
        }
    }

    fn summary(role: RepositoryRole, ownership_percentage: u8) -> RepositorySummary {
        RepositorySummary {
            name: "repo".to_owned(),
            full_name: "octocat/repo".to_owned(),
            role,
            languages: Vec::new(),
            commits: 0,
            prs: 0,
            ownership_percentage,
            stars: 0,
            description: None
        }
    }

    fn event_at(now: DateTime<Utc>, days_ago: i64) -> ActivityEvent {
        serde_json::from_value(json!({
            "id": "1",
            "type": "PushEvent",
            "created_at": (now - Duration::days(days_ago)).to_rfc3339(),
            "payload": {},
        }))
        .expect("event should decode")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn consistency_is_the_rounded_active_share() {
        assert_eq!(consistency_index(6, 12), 50);
        assert_eq!(consistency_index(52, 52), 100);
        assert_eq!(consistency_index(1, 3), 33);
        assert_eq!(consistency_index(2, 3), 67);
        assert_eq!(consistency_index(0, 0), 0);
        // clamped even if callers violate the invariant
        assert_eq!(consistency_index(20, 10), 100);
    }

    #[test]
    fn recency_of_an_empty_timeline_is_zero() {
        assert_eq!(recency_score(&[], now()), 0);
    }

    #[test]
    fn recency_weights_decay_with_age() {
        let now = now();
        assert_eq!(recency_score(&[event_at(now, 5)], now), 100);
        assert_eq!(recency_score(&[event_at(now, 45)], now), 60);
        assert_eq!(recency_score(&[event_at(now, 75)], now), 30);
        assert_eq!(recency_score(&[event_at(now, 200)], now), 10);

        let mixed = vec![event_at(now, 5), event_at(now, 45), event_at(now, 200)];
        // mean of 1.0, 0.6, 0.1
        assert_eq!(recency_score(&mixed, now), 57);
    }

    #[test]
    fn ownership_of_an_empty_set_is_zero() {
        assert_eq!(ownership_score(&[]), 0);
    }

    #[test]
    fn ownership_blends_mean_percentage_and_owner_bonus() {
        let repositories = vec![
            summary(RepositoryRole::Owner, 80),
            summary(RepositoryRole::Contributor, 20),
        ];
        // mean 50 plus half the owner bonus
        assert_eq!(ownership_score(&repositories), 60);

        let all_owned = vec![
            summary(RepositoryRole::Owner, 95),
            summary(RepositoryRole::Owner, 90),
        ];
        assert_eq!(ownership_score(&all_owned), 100);
    }

    #[test]
    fn collaboration_blends_merge_reviews_and_issues() {
        let full = ContributionSummary {
            total_prs: 10,
            merged_prs: 7,
            reviews_given: 10,
            issues_closed: 5,
            ..ContributionSummary::default()
        };
        assert_eq!(collaboration_index(&full), 88.0);

        let no_prs = ContributionSummary {
            reviews_given: 5,
            issues_closed: 1,
            ..ContributionSummary::default()
        };
        // 0*40 + 0.5*30 + 0.2*30
        assert_eq!(collaboration_index(&no_prs), 21.0);

        let fractional = ContributionSummary {
            total_prs: 3,
            merged_prs: 1,
            ..ContributionSummary::default()
        };
        // merge rate 1/3 keeps two decimals
        assert_eq!(collaboration_index(&fractional), 13.33);
    }

    #[test]
    fn language_distribution_weighs_by_size() {
        let repositories = vec![
            repository(Some("Rust"), 300),
            repository(Some("TypeScript"), 100),
            repository(Some("Rust"), 100),
            repository(None, 900),
        ];

        let stats = language_distribution(&repositories);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].language, "Rust");
        assert_eq!(stats[0].percentage, 80);
        assert_eq!(stats[0].color, "#dea584");
        assert_eq!(stats[1].language, "TypeScript");
        assert_eq!(stats[1].percentage, 20);
    }

    #[test]
    fn sizeless_repositories_still_weigh_one() {
        let repositories = vec![repository(Some("Vimscript"), 0)];
        let stats = language_distribution(&repositories);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].percentage, 100);
        // outside the palette
        assert_eq!(stats[0].color, OTHER_COLOR);
    }

    #[test]
    fn language_distribution_keeps_the_top_five() {
        let languages = ["Rust", "Go", "Python", "Ruby", "Swift", "Kotlin", "Scala"];
        let repositories: Vec<RepositoryRecord> = languages
            .iter()
            .enumerate()
            .map(|(index, language)| repository(Some(language), (index as u64 + 1) * 100))
            .collect();

        let stats = language_distribution(&repositories);
        assert_eq!(stats.len(), 5);
        for pair in stats.windows(2) {
            assert!(pair[0].percentage >= pair[1].percentage);
        }
        // the two lightest languages fell off
        assert!(stats.iter().all(|stat| stat.language != "Rust"));
        assert!(stats.iter().all(|stat| stat.language != "Go"));
    }

    #[test]
    fn language_distribution_is_empty_without_languages() {
        let repositories = vec![repository(None, 100), repository(None, 0)];
        assert!(language_distribution(&repositories).is_empty());
    }

    #[test]
    fn synthesis_is_deterministic() {
        let repositories = vec![
            repository(Some("Rust"), 300),
            repository(Some("TypeScript"), 100),
        ];
        let summaries = vec![
            summary(RepositoryRole::Owner, 80),
            summary(RepositoryRole::Contributor, 20),
        ];
        let contribution = ContributionSummary {
            total_commits: 100,
            total_prs: 10,
            merged_prs: 7,
            issues_opened: 4,
            issues_closed: 5,
            reviews_given: 10,
            active_weeks: 6,
            total_weeks: 12
        };

        for _ in 0..3 {
            assert_eq!(language_distribution(&repositories), language_distribution(&repositories));
            assert_eq!(
                consistency_index(contribution.active_weeks, contribution.total_weeks),
                50
            );
            assert_eq!(ownership_score(&summaries), ownership_score(&summaries));
            assert_eq!(collaboration_index(&contribution), collaboration_index(&contribution));
        }
    }

    #[test]
    fn report_serializes_with_camel_case_fields() {
        let metrics = ReportMetrics {
            consistency_index:   50,
            recency_score:       75,
            ownership_score:     60,
            collaboration_index: 88.0,
            total_repos:         4,
            active_repos:        2,
            window_months:       12,
            primary_languages:   Vec::new(),
            contribution_summary: ContributionSummary::default(),
            top_repositories:    Vec::new(),
            private_repo_count:  None
        };

        let json = serde_json::to_string(&metrics).expect("serialization failed");
        assert!(json.contains("\"consistencyIndex\":50"));
        assert!(json.contains("\"collaborationIndex\":88.0"));
        assert!(json.contains("\"windowMonths\":12"));
        assert!(json.contains("\"privateRepoCount\":null"));
    }

    proptest! {
        #[test]
        fn consistency_stays_in_range(active in 0u32..=500, total in 0u32..=500) {
            let score = consistency_index(active, total);
            prop_assert!(score <= 100);
        }

        #[test]
        fn collaboration_stays_in_range_with_two_decimals(
            total_prs in 0u64..1000,
            merged in 0u64..1000,
            reviews in 0u64..1000,
            closed in 0u64..1000
        ) {
            let summary = ContributionSummary {
                total_prs,
                merged_prs: merged.min(total_prs),
                reviews_given: reviews,
                issues_closed: closed,
                ..ContributionSummary::default()
            };
            let score = collaboration_index(&summary);
            prop_assert!((0.0..=100.0).contains(&score));
            // scaled by 100 the value must be whole
            prop_assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-6);
        }

        #[test]
        fn language_list_is_sorted_and_bounded(sizes in prop::collection::vec(0u64..10_000, 0..12)) {
            let languages = ["Rust", "Go", "Python", "Ruby", "Swift", "Kotlin"];
            let repositories: Vec<RepositoryRecord> = sizes
                .iter()
                .enumerate()
                .map(|(index, size)| repository(Some(languages[index % languages.len()]), *size))
                .collect();

            let stats = language_distribution(&repositories);
            prop_assert!(stats.len() <= 5);
            for pair in stats.windows(2) {
                prop_assert!(pair[0].percentage >= pair[1].percentage);
            }
        }
    }
}
