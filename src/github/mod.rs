pub mod types;

pub use types::{PrUrl, PullRequestRecord};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use types::SearchResponse;

/// Items requested per search page.
pub const PER_PAGE: u64 = 100;
/// The search API stops serving results past this many items.
pub const MAX_SEARCH_RESULTS: u64 = 1000;
/// Attempts per page, including the first, when rate limited.
pub const MAX_ATTEMPTS: u32 = 3;
/// Backoff used when a rate-limited response carries no usable Retry-After.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);
/// Zero-based retry counter, sent only by test builds so mocks can tell
/// attempts apart.
#[cfg(test)]
const RETRY_ATTEMPT_HEADER: &str = "x-contributions-retry-attempt";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GitHub API still rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("Invalid PR URL: {0}")]
    MalformedUrl(String),
}

/// Waits out a rate-limit backoff.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Split a PR `html_url` on '/' and pick owner, repo and number out of
/// segments 3, 4 and 6.
pub fn parse_pr_url(url: &str) -> Result<PrUrl, FetchError> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 7 || parts[3].is_empty() || parts[4].is_empty() {
        return Err(FetchError::MalformedUrl(url.to_string()));
    }
    let pr_number = parts[6]
        .parse::<u64>()
        .map_err(|_| FetchError::MalformedUrl(url.to_string()))?;

    Ok(PrUrl {
        owner: parts[3].to_string(),
        repo: parts[4].to_string(),
        pr_number,
    })
}

/// Seconds from a Retry-After header, falling back to [`DEFAULT_RETRY_AFTER`].
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

/// Unauthenticated client for the issue search endpoint. Without a token
/// only PRs in public repositories are visible.
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    excluded_repos: BTreeSet<String>,
    sleeper: Box<dyn Sleeper>,
}

impl SearchClient {
    pub fn new(config: &Config) -> Self {
        Self::with_sleeper(config, Box::new(TokioSleeper))
    }

    pub fn with_sleeper(config: &Config, sleeper: Box<dyn Sleeper>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            excluded_repos: config.excluded_repos.clone(),
            sleeper,
        }
    }

    /// Fetch every merged PR authored by `author`, newest first, minus
    /// excluded repositories.
    ///
    /// Pages are requested until one comes back empty, the reported total is
    /// covered, or the search API's 1000-result ceiling is reached.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_all_merged_pull_requests(
        &self,
        author: &str,
    ) -> Result<Vec<PullRequestRecord>, FetchError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let response = self.fetch_page(author, page).await?;
            debug!(page, items = response.items.len(), total_count = response.total_count, "received search page");

            if response.items.is_empty() {
                break;
            }

            for item in response.items {
                let parsed = parse_pr_url(&item.html_url)?;
                let full_name = parsed.full_name();
                if self.excluded_repos.contains(&full_name) {
                    debug!(repo = %full_name, pr = parsed.pr_number, "skipping excluded repository");
                    continue;
                }
                records.push(PullRequestRecord {
                    repository_full_name: full_name,
                    number: parsed.pr_number,
                    title: item.title,
                    url: item.html_url,
                });
            }

            let seen = page * PER_PAGE;
            if seen >= response.total_count || seen >= MAX_SEARCH_RESULTS {
                break;
            }
            page += 1;
        }

        let repos: HashSet<&str> = records
            .iter()
            .map(|r| r.repository_full_name.as_str())
            .collect();
        info!(prs = records.len(), repos = repos.len(), "fetched merged PRs");
        Ok(records)
    }

    async fn fetch_page(&self, author: &str, page: u64) -> Result<SearchResponse, FetchError> {
        let url = format!("{}/search/issues", self.base_url);
        let query = [
            ("q", format!("type:pr author:{author} is:merged")),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
            ("sort", "created".to_string()),
            ("order", "desc".to_string()),
        ];

        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = self
                .http
                .get(&url)
                .query(&query)
                .header(ACCEPT, "application/vnd.github+json")
                .header(USER_AGENT, "contributions-sync");
            #[cfg(test)]
            let request = request.header(RETRY_ATTEMPT_HEADER, (attempt - 1).to_string());
            let response = request.send().await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<SearchResponse>().await?);
            }

            if is_rate_limited(status) {
                if attempt >= MAX_ATTEMPTS {
                    return Err(FetchError::RetriesExhausted { attempts: attempt });
                }
                let wait = retry_after(response.headers());
                warn!(page, attempt, status = status.as_u16(), wait_secs = wait.as_secs(), "rate limited, backing off");
                self.sleeper.sleep(wait).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
    }
}
