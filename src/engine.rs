// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// One analysis run, from raw listings to the finished report.
///
/// The run is a sequence of awaited network calls with no shared mutable
/// state; every produced entity is owned by the run, so callers may analyze
/// several users concurrently. Dropping the returned future cancels the
/// in-flight request and discards partially accumulated pages.
use chrono::{DateTime, Months, Utc};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    client::Transport,
    config::AnalysisRequest,
    contributions::reconcile_contributions,
    error::Error,
    events::ActivityEvent,
    metrics::{
        ReportMetrics, collaboration_index, consistency_index, language_distribution,
        ownership_score, recency_score
    },
    pagination::fetch_all_pages,
    repos::{
        RepositoryRecord, enrich_top_repositories, recent_repositories, select_analysis_set
    },
    retry::{RetryConfig, retry_with_backoff}
};

/// Page ceiling for the repository listing.
const REPO_PAGE_CEILING: u32 = 5;

/// Page ceiling for the public event timeline.
const EVENT_PAGE_CEILING: u32 = 3;

/// Analyzes a user's public activity and synthesizes the metrics report.
///
/// Fetches the repository universe and the event timeline, reconciles the
/// contribution summary from its two sources, enriches the most recently
/// pushed repositories, and derives the four normalized scores. The random
/// source feeds only the per-repository placeholder estimates.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for invalid requests and
/// propagates any fatal fetch failure as a single run-level error; no
/// partial report is produced. The contribution reconciler and the
/// per-repository language lookups degrade internally instead of failing.
///
/// # Example
///
/// ```no_run
/// use gh_insight::{AnalysisRequest, GithubClient, RetryConfig, analyze_user_activity};
///
/// # async fn example() -> Result<(), gh_insight::Error> {
/// let client = GithubClient::new("ghp_token")?;
/// let request = AnalysisRequest::new("octocat");
/// let mut rng = rand::thread_rng();
/// let metrics =
///     analyze_user_activity(&client, &RetryConfig::default(), &request, &mut rng).await?;
/// println!("consistency: {}", metrics.consistency_index);
/// # Ok(())
/// # }
/// ```
pub async fn analyze_user_activity<C, R>(
    client: &C,
    retry: &RetryConfig,
    request: &AnalysisRequest,
    rng: &mut R
) -> Result<ReportMetrics, Error>
where
    C: Transport,
    R: Rng
{
    analyze_at(client, retry, request, rng, Utc::now()).await
}

async fn analyze_at<C, R>(
    client: &C,
    retry: &RetryConfig,
    request: &AnalysisRequest,
    rng: &mut R,
    now: DateTime<Utc>
) -> Result<ReportMetrics, Error>
where
    C: Transport,
    R: Rng
{
    request.validate()?;
    let cutoff = now
        .checked_sub_months(Months::new(request.window_months))
        .ok_or_else(|| Error::validation("analysis window predates representable time"))?;

    info!(
        "analyzing GitHub activity for {} over the last {} months",
        request.username, request.window_months
    );

    let listing_query = [
        ("sort".to_owned(), "pushed".to_owned()),
        ("direction".to_owned(), "desc".to_owned()),
        ("type".to_owned(), "public".to_owned()),
    ];
    let repositories: Vec<RepositoryRecord> =
        fetch_all_pages(client, retry, "/user/repos", &listing_query, REPO_PAGE_CEILING).await?;

    let analysis_set = select_analysis_set(
        repositories,
        request.included_repositories.as_deref(),
        request.max_repositories
    );
    let recent = recent_repositories(&analysis_set, cutoff);
    debug!(
        "analysis universe for {}: {} repositories, {} recently pushed",
        request.username,
        analysis_set.len(),
        recent.len()
    );

    let events_path = format!("/users/{}/events", request.username);
    let events: Vec<ActivityEvent> =
        fetch_all_pages(client, retry, &events_path, &[], EVENT_PAGE_CEILING).await?;
    let recent_events: Vec<ActivityEvent> = events
        .into_iter()
        .filter(|event| event.created_at > cutoff)
        .collect();

    let contribution_summary = reconcile_contributions(
        client,
        retry,
        &request.username,
        cutoff,
        now,
        request.included_repositories.as_deref(),
        &recent_events
    )
    .await
    .into_summary();

    let top_repositories =
        enrich_top_repositories(client, retry, &recent, &request.username, rng).await;

    let private_repo_count = if request.include_private_repo_count {
        fetch_private_repo_count(client, retry).await
    } else {
        None
    };

    Ok(ReportMetrics {
        consistency_index: consistency_index(
            contribution_summary.active_weeks,
            contribution_summary.total_weeks
        ),
        recency_score: recency_score(&recent_events, now),
        ownership_score: ownership_score(&top_repositories),
        collaboration_index: collaboration_index(&contribution_summary),
        total_repos: analysis_set.len(),
        active_repos: recent.len(),
        window_months: request.window_months,
        primary_languages: language_distribution(&analysis_set),
        contribution_summary,
        top_repositories,
        private_repo_count
    })
}

/// Private repository count from the profile endpoint.
///
/// Failures downgrade to `None`; the count is informational and must not
/// fail the run.
async fn fetch_private_repo_count<C>(client: &C, retry: &RetryConfig) -> Option<u64>
where
    C: Transport
{
    match retry_with_backoff(retry, "user profile", || client.get_json("/user", &[])).await {
        Ok(profile) => profile.get("total_private_repos").and_then(Value::as_u64),
        Err(error) => {
            debug!("private repository count unavailable: {error}");
            None
        }
    }
}
