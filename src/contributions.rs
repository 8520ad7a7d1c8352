// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Two-source contribution reconciliation.
///
/// The structured contributions/search queries are authoritative but rate
/// limited and occasionally unavailable per token; the public event timeline
/// is always reachable but only approximates true contribution counts. Any
/// failure on the structured path therefore degrades to the timeline
/// derivation instead of failing the run.
use chrono::{DateTime, Datelike, Days, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    client::Transport,
    error::Error,
    events::{ActivityEvent, EventKind},
    graphql::run_query,
    retry::RetryConfig
};

/// Longest span a single calendar query may cover.
const MAX_CHUNK_WEEKS: i64 = 52;

/// Ceiling on per-repository scoped search queries.
const MAX_SCOPED_SEARCH_REPOS: usize = 20;

/// Aggregate contribution counts over one analysis window.
///
/// Invariant: `active_weeks <= total_weeks` and `total_weeks >= 1`, on both
/// the structured and the timeline-derived paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
    pub total_commits: u64,
    #[serde(rename = "totalPRs")]
    pub total_prs:     u64,
    #[serde(rename = "mergedPRs")]
    pub merged_prs:    u64,
    pub issues_opened: u64,
    pub issues_closed: u64,
    pub reviews_given: u64,
    pub active_weeks:  u32,
    pub total_weeks:   u32
}

/// A reconciled summary tagged with the source that produced it.
///
/// The tag never reaches the serialized report, but callers and tests rely
/// on it to tell the authoritative path from the degraded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciledContributions {
    /// Produced by the structured contribution and search queries.
    Authoritative(ContributionSummary),
    /// Derived from the event timeline after the structured path failed.
    Estimated(ContributionSummary)
}

impl ReconciledContributions {
    /// Borrows the summary regardless of its source.
    pub fn summary(&self) -> &ContributionSummary {
        match self {
            Self::Authoritative(summary) | Self::Estimated(summary) => summary
        }
    }

    /// Consumes the reconciliation, dropping the source tag.
    pub fn into_summary(self) -> ContributionSummary {
        match self {
            Self::Authoritative(summary) | Self::Estimated(summary) => summary
        }
    }

    /// Whether the summary came from the timeline fallback.
    pub fn is_estimated(&self) -> bool {
        matches!(self, Self::Estimated(_))
    }
}

/// ISO-week aligned analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    /// Start of the ISO week containing the cutoff.
    pub start:       DateTime<Utc>,
    /// Start of the ISO week containing the upper bound.
    pub end:         DateTime<Utc>,
    /// Number of week buckets spanned by the window, at least 1.
    pub total_weeks: u32
}

impl AnalysisWindow {
    /// Aligns `[cutoff, now]` to ISO week starts.
    ///
    /// `total_weeks` is the floor of the spanned days divided by seven, plus
    /// one for the open bucket, and never less than one.
    pub fn new(cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let start = start_of_iso_week(cutoff);
        let end = start_of_iso_week(now);
        Self {
            start,
            end,
            total_weeks: weeks_spanned(start, end)
        }
    }
}

/// Midnight on the Monday of the ISO week containing the timestamp.
pub(crate) fn start_of_iso_week(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    let monday = date
        .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date);
    monday.and_time(NaiveTime::MIN).and_utc()
}

fn weeks_spanned(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let days = (end - start).num_days();
    if days <= 0 {
        return 1;
    }
    (days / 7 + 1) as u32
}

const CONTRIBUTIONS_QUERY: &str = r"
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      totalCommitContributions
      totalIssueContributions
      totalPullRequestReviewContributions
      contributionCalendar {
        weeks {
          contributionDays {
            contributionCount
          }
        }
      }
    }
  }
}
";

const SEARCH_COUNT_QUERY: &str = r"
query($query: String!) {
  search(query: $query, type: ISSUE, first: 1) {
    issueCount
  }
}
";

#[derive(Debug, Deserialize)]
struct ContributionsData {
    user: Option<ContributionsUser>
}

#[derive(Debug, Deserialize)]
struct ContributionsUser {
    #[serde(rename = "contributionsCollection")]
    contributions_collection: ContributionsCollection
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    total_commit_contributions:              u64,
    total_issue_contributions:               u64,
    total_pull_request_review_contributions: u64,
    contribution_calendar:                   ContributionCalendar
}

#[derive(Debug, Deserialize)]
struct ContributionCalendar {
    weeks: Vec<CalendarWeek>
}

#[derive(Debug, Deserialize)]
struct CalendarWeek {
    #[serde(rename = "contributionDays")]
    contribution_days: Vec<CalendarDay>
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    #[serde(rename = "contributionCount")]
    contribution_count: u64
}

#[derive(Debug, Deserialize)]
struct SearchCountData {
    search: SearchCount
}

#[derive(Debug, Deserialize)]
struct SearchCount {
    #[serde(rename = "issueCount")]
    issue_count: u64
}

/// Produces one contribution summary for the user and window, preferring the
/// structured source and degrading to the event timeline.
///
/// `events` must already be restricted to `created_at > cutoff`; the engine
/// fetches them once per run and reuses them for the recency score, so the
/// fallback costs no additional network call.
pub async fn reconcile_contributions<C>(
    client: &C,
    retry: &RetryConfig,
    username: &str,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
    allow_list: Option<&[String]>,
    events: &[ActivityEvent]
) -> ReconciledContributions
where
    C: Transport
{
    let window = AnalysisWindow::new(cutoff, now);
    match structured_summary(client, retry, username, &window, allow_list).await {
        Ok(summary) => {
            debug!(
                "structured contribution summary for {}: {} commits across {} active weeks",
                username, summary.total_commits, summary.active_weeks
            );
            ReconciledContributions::Authoritative(summary)
        }
        Err(error) => {
            warn!(
                "structured contribution queries for {} failed ({}); deriving estimates from the \
                 event timeline",
                username, error
            );
            ReconciledContributions::Estimated(summary_from_events(events, cutoff, now))
        }
    }
}

/// Walks the window in bounded chunks and assembles the structured summary.
async fn structured_summary<C>(
    client: &C,
    retry: &RetryConfig,
    username: &str,
    window: &AnalysisWindow,
    allow_list: Option<&[String]>
) -> Result<ContributionSummary, Error>
where
    C: Transport
{
    let mut total_commits: u64 = 0;
    let mut issues_opened: u64 = 0;
    let mut reviews_given: u64 = 0;
    let mut active_weeks: u32 = 0;

    // The calendar query rejects spans longer than a year, so the window is
    // walked in increasing chunks, each starting where the previous ended.
    let mut chunk_start = window.start;
    loop {
        let chunk_end = (chunk_start + chrono::Duration::weeks(MAX_CHUNK_WEEKS)).min(window.end);
        let collection = fetch_contribution_chunk(client, retry, username, chunk_start, chunk_end)
            .await?;

        total_commits += collection.total_commit_contributions;
        issues_opened += collection.total_issue_contributions;
        reviews_given += collection.total_pull_request_review_contributions;
        active_weeks += collection
            .contribution_calendar
            .weeks
            .iter()
            .filter(|week| {
                week.contribution_days
                    .iter()
                    .map(|day| day.contribution_count)
                    .sum::<u64>()
                    > 0
            })
            .count() as u32;

        if chunk_end >= window.end {
            break;
        }
        chunk_start = chunk_end + chrono::Duration::seconds(1);
    }

    let total_prs = search_count_total(client, retry, username, "is:pr", "created", window, allow_list).await?;
    let merged_prs = search_count_total(client, retry, username, "is:pr", "merged", window, allow_list).await?;
    let issues_closed =
        search_count_total(client, retry, username, "is:issue", "closed", window, allow_list).await?;

    Ok(ContributionSummary {
        total_commits,
        total_prs,
        merged_prs,
        issues_opened,
        issues_closed,
        reviews_given,
        active_weeks: active_weeks.min(window.total_weeks),
        total_weeks: window.total_weeks
    })
}

async fn fetch_contribution_chunk<C>(
    client: &C,
    retry: &RetryConfig,
    username: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>
) -> Result<ContributionsCollection, Error>
where
    C: Transport
{
    let operation = format!(
        "contributions {}..{}",
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    );
    let data: ContributionsData = run_query(
        client,
        retry,
        &operation,
        CONTRIBUTIONS_QUERY,
        json!({
            "login": username,
            "from": from.to_rfc3339_opts(SecondsFormat::Secs, true),
            "to": to.to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    )
    .await?;

    data.user
        .map(|user| user.contributions_collection)
        .ok_or_else(|| Error::malformed(format!("user {username} absent from contributions data")))
}

/// Count-only search over issue/PR-like items.
///
/// With an explicit repository allow-list, one scoped query per repository
/// (capped) is summed instead of a single global query, so activity in
/// unrelated repositories cannot leak into the counts.
async fn search_count_total<C>(
    client: &C,
    retry: &RetryConfig,
    username: &str,
    item_filter: &str,
    date_field: &str,
    window: &AnalysisWindow,
    allow_list: Option<&[String]>
) -> Result<u64, Error>
where
    C: Transport
{
    let range = format!(
        "{}..{}",
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );

    match allow_list {
        Some(repositories) if !repositories.is_empty() => {
            let mut total = 0;
            for full_name in repositories.iter().take(MAX_SCOPED_SEARCH_REPOS) {
                let search = format!(
                    "author:{username} {item_filter} {date_field}:{range} repo:{full_name}"
                );
                total += fetch_search_count(client, retry, &search).await?;
            }
            Ok(total)
        }
        _ => {
            let search = format!("author:{username} {item_filter} {date_field}:{range}");
            fetch_search_count(client, retry, &search).await
        }
    }
}

async fn fetch_search_count<C>(client: &C, retry: &RetryConfig, search: &str) -> Result<u64, Error>
where
    C: Transport
{
    let operation = format!("search count [{search}]");
    let data: SearchCountData = run_query(
        client,
        retry,
        &operation,
        SEARCH_COUNT_QUERY,
        json!({ "query": search })
    )
    .await?;
    Ok(data.search.issue_count)
}

/// Derives the contribution summary from the raw event timeline.
///
/// Push sizes stand in for commit counts, PR/issue/review actions are read
/// from event payloads, and distinct ISO `(year, week)` pairs count as active
/// weeks. The total-week span runs from the earliest event (or the cutoff,
/// whichever is later) to `now`.
pub fn summary_from_events(
    events: &[ActivityEvent],
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>
) -> ContributionSummary {
    let mut summary = ContributionSummary::default();
    let mut weeks = std::collections::BTreeSet::new();
    let mut earliest: Option<DateTime<Utc>> = None;

    for event in events {
        earliest = Some(earliest.map_or(event.created_at, |seen| seen.min(event.created_at)));
        let iso = event.created_at.iso_week();
        weeks.insert((iso.year(), iso.week()));

        match event.kind() {
            EventKind::Push => {
                summary.total_commits += event.push_commit_count();
            }
            EventKind::PullRequest => match event.action() {
                Some("opened") | Some("reopened") | None => summary.total_prs += 1,
                Some("closed") if event.pull_request_merged() => summary.merged_prs += 1,
                _ => {}
            },
            EventKind::Issues => match event.action() {
                Some("opened") => summary.issues_opened += 1,
                Some("closed") => summary.issues_closed += 1,
                _ => {}
            },
            EventKind::PullRequestReview => {
                if matches!(event.action(), Some("created") | None) {
                    summary.reviews_given += 1;
                }
            }
            EventKind::Other => {}
        }
    }

    let span_start = earliest.map_or(cutoff, |first| first.max(cutoff));
    summary.total_weeks = weeks_spanned(span_start, now);
    summary.active_weeks = (weeks.len() as u32).min(summary.total_weeks);

    summary
}
