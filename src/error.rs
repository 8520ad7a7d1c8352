#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the aggregation engine."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Unified error type returned by the fetchers, the engine, and the CLI.
///
/// The first five variants form the failure taxonomy of outbound API calls:
/// `Transport` and `RetryableStatus` are transient and may be retried by the
/// shared retry loop, while `FatalStatus`, `Query`, and `MalformedResponse`
/// indicate deterministic rejections that must never be retried. The
/// remaining variants cover request validation and configuration I/O.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Connection failures and per-attempt timeouts.
    #[error("transport failure: {message}")]
    Transport {
        /// Human readable description of the network failure.
        message: String
    },
    /// Non-2xx status codes that indicate a transient server condition.
    #[error("retryable status {status} from GitHub API")]
    RetryableStatus {
        /// HTTP status code returned by the server.
        status:      u16,
        /// Server-provided retry delay in seconds, when present.
        retry_after: Option<u64>
    },
    /// Non-2xx status codes with no retry semantics.
    #[error("GitHub API error {status}: {message}")]
    FatalStatus {
        /// HTTP status code returned by the server.
        status:  u16,
        /// Truncated response body for diagnostics.
        message: String
    },
    /// Structured-query-level rejection reported inside a 2xx envelope.
    #[error("structured query rejected: {message}")]
    Query {
        /// First error message from the response envelope.
        message: String
    },
    /// Response bodies that decode to an unexpected shape.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// Description of the decode or shape failure.
        message: String
    },
    /// Returned when an analysis request violates invariants.
    #[error("invalid analysis request: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps I/O errors that occur while reading request documents.
    #[error("failed to read analysis request from {path:?}: {source}")]
    Io {
        /// Location of the request document.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors for request documents.
    #[error("failed to parse analysis request: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps serialization errors when writing the metrics report.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a transport error from the provided displayable value.
    pub fn transport<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Transport {
            message: message.into()
        }
    }

    /// Constructs a structured-query rejection from the provided message.
    pub fn query<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Query {
            message: message.into()
        }
    }

    /// Constructs a malformed-response error from the provided message.
    pub fn malformed<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::MalformedResponse {
            message: message.into()
        }
    }

    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Reports whether the failure is transient and eligible for a retry.
    ///
    /// Only `Transport` and `RetryableStatus` qualify. Fatal statuses, query
    /// rejections, and malformed responses indicate deterministic server-side
    /// outcomes and are surfaced immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use gh_insight::Error;
    ///
    /// assert!(Error::transport("connection reset").is_retryable());
    /// assert!(!Error::query("rate limit exceeded").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::RetryableStatus { .. })
    }

    /// Returns the server-suggested retry delay carried by the failure.
    ///
    /// The delay originates from a `Retry-After` header and takes precedence
    /// over computed backoff when positive.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RetryableStatus {
                retry_after: Some(seconds),
                ..
            } => Some(Duration::from_secs(*seconds)),
            _ => None
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the request document that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn transport_and_retryable_status_are_retryable() {
        assert!(Error::transport("timed out").is_retryable());
        assert!(
            Error::RetryableStatus {
                status:      503,
                retry_after: None
            }
            .is_retryable()
        );
    }

    #[test]
    fn deterministic_failures_are_not_retryable() {
        let fatal = Error::FatalStatus {
            status:  404,
            message: "Not Found".to_owned()
        };
        assert!(!fatal.is_retryable());
        assert!(!Error::query("field does not exist").is_retryable());
        assert!(!Error::malformed("expected array").is_retryable());
        assert!(!Error::validation("bad input").is_retryable());
    }

    #[test]
    fn retry_after_surfaces_server_delay() {
        let error = Error::RetryableStatus {
            status:      429,
            retry_after: Some(7)
        };
        assert_eq!(error.retry_after(), Some(Duration::from_secs(7)));

        let without = Error::RetryableStatus {
            status:      503,
            retry_after: None
        };
        assert_eq!(without.retry_after(), None);
        assert_eq!(Error::transport("reset").retry_after(), None);
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::validation("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/request.yaml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }
}
