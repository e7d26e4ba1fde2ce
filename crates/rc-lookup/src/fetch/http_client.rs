//! Upstream HTTP GET with a fixed retry budget.
//!
//! Not a browser: one GET per attempt with a browser-like header set. Any
//! transport error or non-2xx status counts as a failed attempt; attempts are
//! separated by a fixed delay.

use super::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE as ACCEPT_LANGUAGE_HEADER};
use std::time::Duration;
use tracing::{debug, warn};

/// User-Agent sent with every upstream request.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/115.0 Safari/537.36";

/// Accept-Language sent with every upstream request.
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Attempt budget for one upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_millis(600),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client shared by all sources.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Create a client with the standard browser-like headers.
    pub fn new(policy: RetryPolicy) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE_HEADER,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .timeout(policy.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET `url` and return the body, retrying per the policy.
    ///
    /// Returns the last attempt's error once the budget is spent.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < attempts => {
                    debug!(url, attempt, error = %e, "GET failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => {
                    warn!(url, attempts, error = %e, "GET failed");
                    return Err(e);
                }
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 2);
        assert_eq!(policy.delay, Duration::from_millis(600));
        assert_eq!(policy.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(RetryPolicy::default()).unwrap();
        assert_eq!(client.policy().attempts, 2);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let client = HttpClient::new(RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(1),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let result = client.get_text("http://127.0.0.1:1/rc-search/X").await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
