// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Structured query fetching against the GraphQL endpoint.
///
/// Transport and retryable-status failures follow the shared retry policy;
/// query-level rejections and malformed envelopes are deterministic server
/// outcomes and are never retried.
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    client::Transport,
    error::Error,
    retry::{RetryConfig, retry_with_backoff}
};

/// Submits one structured query and decodes its `{data, errors}` envelope.
///
/// # Errors
///
/// Returns [`Error::Query`] carrying the first message when the envelope
/// reports errors, [`Error::MalformedResponse`] when `data` is absent from a
/// successful response or does not decode into `T`, and propagates classified
/// transport/status failures after retries.
pub async fn run_query<T, C>(
    client: &C,
    retry: &RetryConfig,
    operation_name: &str,
    query: &str,
    variables: Value
) -> Result<T, Error>
where
    T: DeserializeOwned,
    C: Transport
{
    let payload = json!({
        "query": query,
        "variables": variables,
    });

    let envelope =
        retry_with_backoff(retry, operation_name, || client.post_graphql(&payload)).await?;

    decode_envelope(operation_name, envelope)
}

fn decode_envelope<T>(operation_name: &str, envelope: Value) -> Result<T, Error>
where
    T: DeserializeOwned
{
    if let Some(first) = envelope
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown query error");
        return Err(Error::query(format!("{operation_name}: {message}")));
    }

    let data = match envelope.get("data") {
        Some(data) if !data.is_null() => data.clone(),
        _ => {
            return Err(Error::malformed(format!(
                "{operation_name}: response envelope carries no data"
            )));
        }
    };

    serde_json::from_value(data)
        .map_err(|error| Error::malformed(format!("{operation_name}: {error}")))
}
