// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gh_insight::{
    ContributionSummary, LanguageStat, ReportMetrics, RepositoryRecord, RepositoryRole,
    RepositorySummary, collaboration_index, generate_cv_insert, language_distribution,
};

fn repository(index: usize) -> RepositoryRecord {
    let languages = ["Rust", "TypeScript", "Python", "Go", "Shell", "Ruby"];
    serde_json::from_value(serde_json::json!({
        "id": index,
        "name": format!("repo-{index}"),
        "full_name": format!("octocat/repo-{index}"),
        "owner": {"login": "octocat"},
        "language": languages[index % languages.len()],
        "size": (index + 1) * 37,
        "stargazers_count": index,
        "fork": false,
        "private": false,
    }))
    .expect("record should decode")
}

fn benchmark_language_distribution(c: &mut Criterion) {
    let repositories: Vec<RepositoryRecord> = (0..100).map(repository).collect();

    c.bench_function("language_distribution_100_repos", |b| {
        b.iter(|| language_distribution(black_box(&repositories)))
    });
}

fn benchmark_collaboration_index(c: &mut Criterion) {
    let summary = ContributionSummary {
        total_commits: 420,
        total_prs:     37,
        merged_prs:    29,
        issues_opened: 18,
        issues_closed: 11,
        reviews_given: 23,
        active_weeks:  41,
        total_weeks:   53
    };

    c.bench_function("collaboration_index", |b| {
        b.iter(|| collaboration_index(black_box(&summary)))
    });
}

fn benchmark_cv_generation(c: &mut Criterion) {
    let metrics = ReportMetrics {
        consistency_index:   77,
        recency_score:       84,
        ownership_score:     71,
        collaboration_index: 63.5,
        total_repos:         24,
        active_repos:        9,
        window_months:       12,
        primary_languages:   vec![
            LanguageStat {
                language:   "Rust".to_owned(),
                percentage: 52,
                color:      "#dea584".to_owned()
            },
            LanguageStat {
                language:   "TypeScript".to_owned(),
                percentage: 31,
                color:      "#3178c6".to_owned()
            },
        ],
        contribution_summary: ContributionSummary::default(),
        top_repositories:    vec![RepositorySummary {
            name: "alpha".to_owned(),
            full_name: "octocat/alpha".to_owned(),
            role: RepositoryRole::Owner,
            languages: vec!["Rust".to_owned()],
            commits: 87,
            prs: 12,
            ownership_percentage: 83,
            stars: 412,
            description: Some("primary project".to_owned())
        }],
        private_repo_count:  None
    };

    c.bench_function("generate_cv_insert", |b| {
        b.iter(|| generate_cv_insert(black_box(&metrics)))
    });
}

criterion_group!(
    benches,
    benchmark_language_distribution,
    benchmark_collaboration_index,
    benchmark_cv_generation
);
criterion_main!(benches);
