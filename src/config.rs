// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Analysis request documents and their validation.
//!
//! Requests can be assembled from CLI flags or loaded from a YAML document.
//! Deserialization is intentionally permissive; [`AnalysisRequest::validate`]
//! then enforces the engine's invariants and produces precise validation
//! messages.

use std::{fs, path::Path, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, io_error};

/// Analysis window lengths the engine supports, in months.
pub const SUPPORTED_WINDOW_MONTHS: [u32; 3] = [12, 24, 36];

/// Upper bound on explicit allow-list entries.
pub const MAX_ALLOW_LIST_ENTRIES: usize = 100;

/// Upper bound on the length of one `owner/name` entry.
pub const MAX_FULL_NAME_LENGTH: usize = 200;

/// Inclusive bounds on the optional repository cap.
pub const MAX_REPOSITORY_CAP: usize = 50;

/// Validated description of one analysis run.
///
/// # Examples
///
/// ```
/// use gh_insight::parse_request;
///
/// let yaml = r"
/// username: octocat
/// window_months: 24
/// included_repositories:
///   - octocat/hello-world
/// ";
/// let request = parse_request(yaml).expect("valid request");
/// assert_eq!(request.username, "octocat");
/// assert_eq!(request.window_months, 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisRequest {
    /// GitHub login whose public activity is analyzed.
    pub username: String,

    /// Analysis window length in months; 12, 24, or 36.
    #[serde(default = "default_window_months")]
    pub window_months: u32,

    /// Optional allow-list of `owner/name` repositories, case-sensitive.
    #[serde(default)]
    pub included_repositories: Option<Vec<String>>,

    /// Optional cap on analyzed repositories, between 1 and 50.
    #[serde(default)]
    pub max_repositories: Option<usize>,

    /// Whether to look up the private repository count for the report.
    #[serde(default)]
    pub include_private_repo_count: bool
}

fn default_window_months() -> u32 {
    12
}

impl AnalysisRequest {
    /// Builds a request with defaults for everything but the username.
    pub fn new<U>(username: U) -> Self
    where
        U: Into<String>
    {
        Self {
            username:                   username.into(),
            window_months:              default_window_months(),
            included_repositories:      None,
            max_repositories:           None,
            include_private_repo_count: false
        }
    }

    /// Enforces the request invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when the username is
    /// empty or contains whitespace, the window length is unsupported, the
    /// allow-list is too long or carries an entry that is overlong or not of
    /// the `owner/name` form, or the repository cap is outside 1..=50.
    pub fn validate(&self) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::validation("username must not be empty"));
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err(Error::validation("username cannot contain whitespace"));
        }

        if !SUPPORTED_WINDOW_MONTHS.contains(&self.window_months) {
            return Err(Error::validation(format!(
                "window_months must be one of 12, 24, or 36, got {}",
                self.window_months
            )));
        }

        if let Some(repositories) = self.included_repositories.as_deref() {
            if repositories.len() > MAX_ALLOW_LIST_ENTRIES {
                return Err(Error::validation(format!(
                    "included_repositories lists {} entries, the maximum is {}",
                    repositories.len(),
                    MAX_ALLOW_LIST_ENTRIES
                )));
            }
            for full_name in repositories {
                validate_full_name(full_name)?;
            }
        }

        if let Some(cap) = self.max_repositories {
            if cap == 0 || cap > MAX_REPOSITORY_CAP {
                return Err(Error::validation(format!(
                    "max_repositories must be between 1 and {MAX_REPOSITORY_CAP}, got {cap}"
                )));
            }
        }

        Ok(())
    }
}

/// Validates one case-sensitive `owner/name` entry.
fn validate_full_name(full_name: &str) -> Result<(), Error> {
    if full_name.len() > MAX_FULL_NAME_LENGTH {
        let prefix: String = full_name.chars().take(32).collect();
        return Err(Error::validation(format!(
            "repository name '{prefix}...' exceeds {MAX_FULL_NAME_LENGTH} characters"
        )));
    }
    if !full_name_pattern().is_match(full_name) {
        return Err(Error::validation(format!(
            "repository name '{full_name}' is not of the form owner/name"
        )));
    }
    Ok(())
}

fn full_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9._-]+$").expect("pattern is valid")
    })
}

/// Parses an analysis request from YAML and validates it.
///
/// # Errors
///
/// Returns [`Error::Parse`](Error::Parse) for malformed YAML and
/// [`Error::Validation`](Error::Validation) when the decoded request
/// violates invariants.
pub fn parse_request(input: &str) -> Result<AnalysisRequest, Error> {
    let request: AnalysisRequest = serde_yaml::from_str(input)?;
    request.validate()?;
    Ok(request)
}

/// Loads an analysis request document from disk.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when the file cannot be read, plus the
/// failures of [`parse_request`].
pub fn load_request(path: &Path) -> Result<AnalysisRequest, Error> {
    let raw = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    parse_request(&raw)
}
