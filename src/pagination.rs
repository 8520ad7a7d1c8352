// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Paginated fetching for REST listing endpoints.
///
/// Pages are requested in increasing order because exhaustion is detected
/// from the size of the most recent page.
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    client::Transport,
    error::Error,
    retry::{RetryConfig, retry_with_backoff}
};

/// Fixed page size requested from listing endpoints.
pub const PAGE_SIZE: usize = 100;

/// Fetches every page of a listing endpoint up to `max_pages`.
///
/// Accumulates decoded items until a page comes back empty, a page is
/// shorter than [`PAGE_SIZE`], or the ceiling is reached. Each page request
/// runs under the caller's retry policy; once the retry budget for a page is
/// exhausted the whole fetch fails rather than returning a partial sequence.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when a page body is not a JSON array
/// or an item fails to decode, and propagates classified transport/status
/// failures after retries.
pub async fn fetch_all_pages<T, C>(
    client: &C,
    retry: &RetryConfig,
    path: &str,
    base_query: &[(String, String)],
    max_pages: u32
) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    C: Transport
{
    let mut results = Vec::new();
    let mut page: u32 = 1;

    while page <= max_pages {
        let mut query = base_query.to_vec();
        query.push(("page".to_owned(), page.to_string()));
        query.push(("per_page".to_owned(), PAGE_SIZE.to_string()));

        let operation = format!("{path} page {page}");
        let body = retry_with_backoff(retry, &operation, || client.get_json(path, &query)).await?;

        if !body.is_array() {
            return Err(Error::malformed(format!("expected a JSON array from {path}")));
        }
        let items: Vec<T> = serde_json::from_value(body)
            .map_err(|error| Error::malformed(format!("invalid item from {path}: {error}")))?;

        let count = items.len();
        if count == 0 {
            break;
        }
        results.extend(items);
        if count < PAGE_SIZE {
            break;
        }
        page += 1;
    }

    debug!("fetched {} items from {} across {} pages", results.len(), path, page.min(max_pages));

    Ok(results)
}
