use std::time::Duration;

use reqwest::Client;

use crate::{
    detail::{self, ParseError},
    Spell,
};

/// Retry budget for detail-page requests. The library drops requests under
/// load, so every page gets `max_attempts` tries with the delay doubling from
/// `base_delay` between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before the nth retry (0-based).
    fn delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Why one spell page produced no record.
#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    #[error("gave up after {attempts} attempts: {last_failure}")]
    RetriesExhausted { attempts: u32, last_failure: String },
    #[error("Parse({0})")]
    Parse(#[from] ParseError),
}

/// Fetch and parse one spell detail page.
///
/// `Ok(None)` means the page came back empty, which is not a parse failure.
pub async fn fetch_spell(
    client: &Client,
    url: &str,
    retry: &RetryPolicy,
) -> Result<Option<Spell>, SpellError> {
    let body = request_page(client, url, retry).await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(detail::parse_spell(&body)?))
}

async fn request_page(
    client: &Client,
    url: &str,
    retry: &RetryPolicy,
) -> Result<String, SpellError> {
    let mut last_failure = String::new();
    for attempt in 0..retry.max_attempts {
        if attempt > 0 {
            let delay = retry.delay(attempt - 1);
            tracing::debug!(url, attempt, ?delay, "retrying spell page");
            tokio::time::sleep(delay).await;
        }
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => return Ok(body),
                Err(e) => last_failure = e.to_string(),
            },
            Ok(response) => last_failure = format!("status {}", response.status()),
            Err(e) => last_failure = e.to_string(),
        }
    }
    tracing::warn!(url, %last_failure, "spell page unreachable");
    Err(SpellError::RetriesExhausted {
        attempts: retry.max_attempts,
        last_failure,
    })
}
