// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Repository selection and enrichment.
///
/// The analysis universe is the user's public, non-fork repositories,
/// optionally intersected with an explicit allow-list and capped. The most
/// recently pushed repositories are enriched with per-repository language
/// breakdowns for display.
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    client::Transport,
    error::Error,
    retry::{RetryConfig, retry_with_backoff}
};

/// Number of recently pushed repositories enriched for display.
pub const TOP_REPOSITORY_COUNT: usize = 5;

/// Languages kept per repository for display.
const DISPLAY_LANGUAGE_COUNT: usize = 3;

/// Repository entry from the authenticated-user listing endpoint.
///
/// The listing is requested sorted by push time descending; downstream
/// selection preserves that order.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRecord {
    pub id:               u64,
    pub name:             String,
    pub full_name:        String,
    pub owner:            RepositoryOwner,
    #[serde(default)]
    pub description:      Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language:         Option<String>,
    /// Size metric used as the language-distribution weight.
    #[serde(default)]
    pub size:             u64,
    #[serde(default)]
    pub pushed_at:        Option<DateTime<Utc>>,
    #[serde(default)]
    pub fork:             bool,
    #[serde(default)]
    pub private:          bool
}

/// Owner reference attached to a repository record.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String
}

/// Relationship between the analyzed user and a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryRole {
    Owner,
    Contributor
}

/// Enriched view of one of the top recently pushed repositories.
///
/// `commits`, `prs`, and `ownership_percentage` are placeholder-quality
/// pseudo-random estimates whose distribution depends only on the ownership
/// role. They are not derived from real commit attribution and must not be
/// treated as verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name:                 String,
    pub full_name:            String,
    pub role:                 RepositoryRole,
    pub languages:            Vec<String>,
    pub commits:              u64,
    pub prs:                  u64,
    pub ownership_percentage: u8,
    pub stars:                u64,
    pub description:          Option<String>
}

/// Filters the raw listing down to the analysis universe.
///
/// Private and fork repositories are excluded before any scoring. When an
/// allow-list of full names is supplied the survivors are intersected with
/// it; an optional cap then truncates the list in its existing order. The
/// operation is idempotent and order-preserving.
pub fn select_analysis_set(
    repositories: Vec<RepositoryRecord>,
    allow_list: Option<&[String]>,
    max_repositories: Option<usize>
) -> Vec<RepositoryRecord> {
    let mut selected: Vec<RepositoryRecord> = repositories
        .into_iter()
        .filter(|repository| !repository.private && !repository.fork)
        .collect();

    if let Some(allowed) = allow_list.filter(|names| !names.is_empty()) {
        let allowed: std::collections::HashSet<&str> =
            allowed.iter().map(String::as_str).collect();
        selected.retain(|repository| allowed.contains(repository.full_name.as_str()));
    }

    if let Some(cap) = max_repositories {
        selected.truncate(cap);
    }

    selected
}

/// Repositories from the analysis set pushed after the cutoff.
pub fn recent_repositories(
    repositories: &[RepositoryRecord],
    cutoff: DateTime<Utc>
) -> Vec<RepositoryRecord> {
    repositories
        .iter()
        .filter(|repository| repository.pushed_at.is_some_and(|pushed| pushed > cutoff))
        .cloned()
        .collect()
}

/// Enriches the top recently pushed repositories for display.
///
/// Fetches the language byte-weight map for each of the first
/// [`TOP_REPOSITORY_COUNT`] repositories; a failing language call downgrades
/// locally to the repository's primary language instead of failing the run.
pub async fn enrich_top_repositories<C, R>(
    client: &C,
    retry: &RetryConfig,
    repositories: &[RepositoryRecord],
    username: &str,
    rng: &mut R
) -> Vec<RepositorySummary>
where
    C: Transport,
    R: Rng
{
    let mut summaries = Vec::with_capacity(TOP_REPOSITORY_COUNT.min(repositories.len()));

    for repository in repositories.iter().take(TOP_REPOSITORY_COUNT) {
        let role = if repository.owner.login == username {
            RepositoryRole::Owner
        } else {
            RepositoryRole::Contributor
        };

        let languages = match fetch_repository_languages(client, retry, &repository.full_name)
            .await
        {
            Ok(languages) => languages.into_iter().take(DISPLAY_LANGUAGE_COUNT).collect(),
            Err(error) => {
                debug!(
                    "language breakdown unavailable for {} ({}); using the primary language",
                    repository.full_name, error
                );
                repository.language.clone().into_iter().collect()
            }
        };

        summaries.push(RepositorySummary {
            name: repository.name.clone(),
            full_name: repository.full_name.clone(),
            role,
            languages,
            commits: rng.gen_range(10..110),
            prs: rng.gen_range(1..21),
            ownership_percentage: match role {
                RepositoryRole::Owner => rng.gen_range(60..100),
                RepositoryRole::Contributor => rng.gen_range(10..40)
            },
            stars: repository.stargazers_count,
            description: repository.description.clone()
        });
    }

    summaries
}

/// Language names for a repository, heaviest byte weight first.
async fn fetch_repository_languages<C>(
    client: &C,
    retry: &RetryConfig,
    full_name: &str
) -> Result<Vec<String>, Error>
where
    C: Transport
{
    let path = format!("/repos/{full_name}/languages");
    let operation = format!("languages for {full_name}");
    let body = retry_with_backoff(retry, &operation, || client.get_json(&path, &[])).await?;

    match body {
        Value::Object(weights) => {
            let mut pairs: Vec<(String, u64)> = weights
                .into_iter()
                .map(|(language, bytes)| (language, bytes.as_u64().unwrap_or(0)))
                .collect();
            pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            Ok(pairs.into_iter().map(|(language, _)| language).collect())
        }
        _ => Err(Error::malformed(format!("expected a language map for {full_name}")))
    }
}
