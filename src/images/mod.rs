mod google;

pub use google::GoogleImageSearch;

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ImageSearchConfig;

/// Best-effort image lookup for a short label such as a pose name
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Return the best matching image URL, or `None` when nothing usable was found
    async fn lookup(&self, label: &str) -> Option<String>;
}

/// Image search used when no search credentials are configured
pub struct NoImageSearch;

#[async_trait]
impl ImageSearch for NoImageSearch {
    async fn lookup(&self, _label: &str) -> Option<String> {
        None
    }
}

/// Build the image search described by the configuration.
///
/// Missing credentials disable image lookup rather than failing startup.
pub fn from_config(config: &ImageSearchConfig) -> Box<dyn ImageSearch> {
    if !config.enabled {
        return Box::new(NoImageSearch);
    }

    match GoogleImageSearch::new(config) {
        Ok(search) => Box::new(search),
        Err(e) => {
            warn!("Image search disabled: {}", e);
            Box::new(NoImageSearch)
        }
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (1-based): `base_delay * multiplier^(attempt-1)`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `operation` until it succeeds or the policy's attempts are exhausted.
///
/// Sleeps between attempts but never after the last one. Returns the last
/// error when every attempt failed.
pub async fn with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    what, attempt, attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!("{} failed after {} attempts", what, attempts);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2), Duration::from_secs(10));
        assert_eq!(policy.delay_after(3), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_two_backoffs() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<&str, String> = with_backoff(&RetryPolicy::default(), "lookup", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("connection reset ({})", n))
                } else {
                    Ok("https://img.example/tree.jpg")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "https://img.example/tree.jpg");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(15), "waited {:?}", waited);
        assert!(waited < Duration::from_secs(16), "waited {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_last_attempt_without_sleeping() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), String> = with_backoff(&RetryPolicy::default(), "lookup", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("timed out".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "timed out");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 5s + 10s, no sleep after the third failure
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(15));
        assert!(waited < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_sleep() {
        let start = Instant::now();
        let result: Result<u8, String> =
            with_backoff(&RetryPolicy::default(), "lookup", || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_no_image_search_finds_nothing() {
        assert_eq!(NoImageSearch.lookup("Tree").await, None);
    }

    #[tokio::test]
    async fn test_disabled_search_finds_nothing() {
        let config = ImageSearchConfig {
            enabled: false,
            api_key: Some("img-key".to_string()),
            engine_id: Some("engine-1".to_string()),
            ..Default::default()
        };
        assert_eq!(from_config(&config).lookup("Tree").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_without_credentials_falls_back() {
        // Credentials in the environment would enable the real search
        if std::env::var("IMAGE_SEARCH_API_KEY").is_ok()
            || std::env::var("IMAGE_SEARCH_ENGINE_ID").is_ok()
        {
            return;
        }

        let config = ImageSearchConfig {
            enabled: true,
            api_key: None,
            engine_id: None,
            base_url: "http://127.0.0.1:9/customsearch/v1".to_string(),
            ..Default::default()
        };
        assert!(GoogleImageSearch::new(&config).is_err());

        let search = from_config(&config);
        let start = Instant::now();
        assert_eq!(search.lookup("Tree").await, None);
        // No request was attempted, so no backoff either
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
