// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// HTTP adapter for the GitHub REST and GraphQL endpoints.
///
/// Performs exactly one outbound call per invocation and classifies the
/// outcome into the failure taxonomy of [`Error`]. Retry policy is owned by
/// callers through [`retry_with_backoff`](crate::retry_with_backoff); the
/// adapter itself carries no business logic.
use std::time::Duration;

use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT}
};
use serde_json::Value;

use crate::error::Error;

/// Base URL of the GitHub API.
pub const GITHUB_API: &str = "https://api.github.com";

/// Per-attempt timeout enforced through request cancellation.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Status codes that indicate a transient server condition.
const RETRYABLE_STATUSES: [u16; 7] = [408, 409, 429, 500, 502, 503, 504];

/// Longest response-body excerpt carried in fatal-status errors.
const BODY_SNIPPET_LENGTH: usize = 200;

/// Outbound call surface consumed by the fetchers.
///
/// The engine is generic over this trait so tests can drive pagination,
/// structured queries, and the reconciler fallback with scripted responses
/// instead of a live network.
pub trait Transport {
    /// Issues a single GET against a REST path and decodes the JSON body.
    fn get_json(
        &self,
        path: &str,
        query: &[(String, String)]
    ) -> impl Future<Output = Result<Value, Error>> + Send;

    /// Submits a single structured query payload to the query endpoint and
    /// returns the raw response envelope.
    fn post_graphql(&self, payload: &Value) -> impl Future<Output = Result<Value, Error>> + Send;
}

/// Authenticated GitHub API client with per-attempt timeouts.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http:  reqwest::Client,
    token: String
}

impl GithubClient {
    /// Builds a client holding the bearer token used for every call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new<T>(token: T) -> Result<Self, Error>
    where
        T: Into<String>
    {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| Error::transport(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http,
            token: token.into()
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, Error> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("gh-insight/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|error| Error::malformed(format!("invalid JSON body: {error}")));
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(classify_failure(status, retry_after, &body))
    }
}

impl Transport for GithubClient {
    fn get_json(
        &self,
        path: &str,
        query: &[(String, String)]
    ) -> impl Future<Output = Result<Value, Error>> + Send {
        let request = self.http.get(format!("{GITHUB_API}{path}")).query(query);
        async move { self.send(request).await }
    }

    fn post_graphql(&self, payload: &Value) -> impl Future<Output = Result<Value, Error>> + Send {
        let request = self.http.post(format!("{GITHUB_API}/graphql")).json(payload);
        async move { self.send(request).await }
    }
}

/// Maps non-2xx statuses onto the retryable/fatal split of the taxonomy.
fn classify_failure(status: StatusCode, retry_after: Option<u64>, body: &str) -> Error {
    let code = status.as_u16();
    if RETRYABLE_STATUSES.contains(&code) {
        return Error::RetryableStatus {
            status: code,
            retry_after
        };
    }
    Error::FatalStatus {
        status:  code,
        message: snippet(body)
    }
}

/// Timeouts are distinguished from generic network errors only in the
/// message; both classify as transport failures and retry identically.
fn classify_send_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        return Error::transport(format!(
            "request timed out after {}s: {error}",
            REQUEST_TIMEOUT.as_secs()
        ));
    }
    Error::transport(format!("network error: {error}"))
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LENGTH).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses_classify_with_server_delay() {
        for code in RETRYABLE_STATUSES {
            let status = StatusCode::from_u16(code).expect("valid status");
            let error = classify_failure(status, Some(3), "slow down");
            match error {
                Error::RetryableStatus {
                    status,
                    retry_after
                } => {
                    assert_eq!(status, code);
                    assert_eq!(retry_after, Some(3));
                }
                other => panic!("expected retryable status, got {other:?}")
            }
        }
    }

    #[test]
    fn other_statuses_classify_as_fatal() {
        let error = classify_failure(StatusCode::NOT_FOUND, None, "Not Found");
        match error {
            Error::FatalStatus {
                status,
                ref message
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("expected fatal status, got {other:?}")
        }
        assert!(!classify_failure(StatusCode::UNAUTHORIZED, None, "").is_retryable());
    }

    #[test]
    fn fatal_body_is_truncated() {
        let body = "x".repeat(500);
        match classify_failure(StatusCode::FORBIDDEN, None, &body) {
            Error::FatalStatus {
                message, ..
            } => {
                assert_eq!(message.len(), BODY_SNIPPET_LENGTH);
            }
            other => panic!("expected fatal status, got {other:?}")
        }
    }

    #[test]
    fn client_builds_with_token() {
        let client = GithubClient::new("ghp_example").expect("client should build");
        assert_eq!(client.token, "ghp_example");
    }
}
