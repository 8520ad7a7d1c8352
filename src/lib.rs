// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Aggregation engine turning public GitHub activity into engagement metrics.
//!
//! The library pulls a user's repository listing, event timeline, and
//! contribution calendar from the GitHub REST and GraphQL APIs under a shared
//! retry policy, reconciles the two contribution sources into one summary,
//! and synthesizes normalized consistency, recency, ownership, and
//! collaboration scores plus a language distribution. The finished
//! [`ReportMetrics`] value feeds the report renderer and the CV snippet
//! generator unchanged.

mod client;
mod config;
mod contributions;
mod cv;
mod engine;
mod error;
mod events;
mod graphql;
mod metrics;
mod pagination;
mod repos;
mod retry;

pub use client::{GITHUB_API, GithubClient, REQUEST_TIMEOUT, Transport};
pub use config::{
    AnalysisRequest, MAX_ALLOW_LIST_ENTRIES, MAX_FULL_NAME_LENGTH, MAX_REPOSITORY_CAP,
    SUPPORTED_WINDOW_MONTHS, load_request, parse_request,
};
pub use contributions::{
    AnalysisWindow, ContributionSummary, ReconciledContributions, reconcile_contributions,
    summary_from_events,
};
pub use cv::generate_cv_insert;
pub use engine::analyze_user_activity;
pub use error::{Error, io_error};
pub use events::{ActivityEvent, EventKind, EventRepo};
pub use graphql::run_query;
pub use metrics::{
    LanguageStat, ReportMetrics, collaboration_index, consistency_index, language_distribution,
    ownership_score, recency_score,
};
pub use pagination::{PAGE_SIZE, fetch_all_pages};
pub use repos::{
    RepositoryRecord, RepositoryRole, RepositorySummary, TOP_REPOSITORY_COUNT,
    enrich_top_repositories, recent_repositories, select_analysis_set,
};
pub use retry::{RetryConfig, retry_with_backoff};
