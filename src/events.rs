// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Wire model for the public user-event timeline.
///
/// Events are fetched once per analysis run, feed the recency score and the
/// contribution fallback derivation, and are discarded afterwards. Payloads
/// stay opaque JSON; only the handful of fields the fallback needs are read
/// through accessors.
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// One timestamped occurrence from the user's public timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEvent {
    pub id:         String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub repo:       Option<EventRepo>,
    #[serde(default)]
    pub payload:    Value
}

/// Repository reference attached to a timeline event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    pub name: String
}

/// Classified event types the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
    Issues,
    PullRequestReview,
    Other
}

impl ActivityEvent {
    /// Classifies the raw event type string.
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "PushEvent" => EventKind::Push,
            "PullRequestEvent" => EventKind::PullRequest,
            "IssuesEvent" => EventKind::Issues,
            "PullRequestReviewEvent" => EventKind::PullRequestReview,
            _ => EventKind::Other
        }
    }

    /// Commit count carried by a push event.
    ///
    /// Prefers the payload `size` field and falls back to the length of the
    /// embedded commit array. The result is an imperfect proxy for true
    /// commit counts; only the contribution fallback consumes it.
    pub fn push_commit_count(&self) -> u64 {
        self.payload
            .get("size")
            .and_then(Value::as_u64)
            .or_else(|| {
                self.payload
                    .get("commits")
                    .and_then(Value::as_array)
                    .map(|commits| commits.len() as u64)
            })
            .unwrap_or(0)
    }

    /// Action string attached to issue/PR/review events, when present.
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(Value::as_str)
    }

    /// Whether a closed pull-request event carries the merged flag.
    pub fn pull_request_merged(&self) -> bool {
        self.payload
            .get("pull_request")
            .and_then(|pull_request| pull_request.get("merged"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
