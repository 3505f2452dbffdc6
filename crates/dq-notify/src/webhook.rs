use anyhow::{Context, Result};
use dq_schemas::NotificationChannel;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use std::time::Duration;

use crate::NotificationJob;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs a fixed JSON envelope describing the incident to `channel.config.url`,
/// with any configured static headers attached. No retry here — the caller
/// logs delivery failures and moves on to the next channel; a channel owner
/// that needs reliable delivery points the webhook at a queue of their own.
/// A channel with no `url` configured is skipped before any request is built.
pub async fn deliver(channel: &NotificationChannel, job: &NotificationJob) -> Result<()> {
    let Some(url) = channel.config.url.as_deref() else {
        return Ok(());
    };

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("failed to build webhook http client")?;

    let mut headers = HeaderMap::new();
    for (k, v) in &channel.config.headers {
        let name = HeaderName::try_from(k.as_str()).with_context(|| format!("invalid header name: {k}"))?;
        let value = HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    let body = json!({
        "event": job.event,
        "occurred_at": job.occurred_at,
        "incident": job.incident,
    });

    let response = client
        .post(url)
        .headers(headers)
        .json(&body)
        .send()
        .await
        .context("webhook request failed")?;

    if !response.status().is_success() {
        anyhow::bail!("webhook endpoint returned {}", response.status());
    }
    Ok(())
}
