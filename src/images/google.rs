use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

use super::{with_backoff, ImageSearch, RetryPolicy};
use crate::config::ImageSearchConfig;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
}

/// Image lookup backed by the Google Custom Search JSON API
pub struct GoogleImageSearch {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
    site: Option<String>,
    query_suffix: String,
    result_count: u32,
    retry: RetryPolicy,
}

impl GoogleImageSearch {
    /// Create a new image search from configuration
    pub fn new(config: &ImageSearchConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        // Try config first, then fall back to environment variables
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("IMAGE_SEARCH_API_KEY").ok())
            .ok_or("IMAGE_SEARCH_API_KEY not found in config or environment")?;
        let engine_id = config
            .engine_id
            .clone()
            .or_else(|| std::env::var("IMAGE_SEARCH_ENGINE_ID").ok())
            .ok_or("IMAGE_SEARCH_ENGINE_ID not found in config or environment")?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(GoogleImageSearch {
            client,
            base_url: config.base_url.clone(),
            api_key,
            engine_id,
            site: config.site.clone().filter(|s| !s.trim().is_empty()),
            query_suffix: config.query_suffix.clone(),
            result_count: config.result_count.max(1),
            retry: config.retry_policy(),
        })
    }

    fn query_for(&self, label: &str) -> String {
        format!("{} {}", label.trim(), self.query_suffix)
            .trim()
            .to_string()
    }

    /// One search request. Transport failures, timeouts and non-2xx statuses
    /// are errors; a body that cannot be read as results counts as empty.
    async fn search_once(&self, query: &str) -> Result<Vec<String>, reqwest::Error> {
        let count = self.result_count.to_string();
        let mut params = vec![
            ("q", query),
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("searchType", "image"),
            ("num", count.as_str()),
        ];
        if let Some(site) = &self.site {
            params.push(("siteSearch", site.as_str()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(parsed) => Ok(parsed.items.into_iter().filter_map(|i| i.link).collect()),
            Err(e) => {
                debug!("Unreadable image search response for '{}': {}", query, e);
                Ok(Vec::new())
            }
        }
    }
}

/// Prefer a link that mentions yoga, otherwise take the first one.
fn pick_link(links: Vec<String>) -> Option<String> {
    let preferred = links
        .iter()
        .position(|link| link.to_ascii_lowercase().contains("yoga"));
    match preferred {
        Some(index) => links.into_iter().nth(index),
        None => links.into_iter().next(),
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    async fn lookup(&self, label: &str) -> Option<String> {
        let query = self.query_for(label);
        let what = format!("Image search for '{}'", query);
        let query = query.as_str();

        match with_backoff(&self.retry, &what, move || self.search_once(query)).await {
            Ok(links) => {
                let link = pick_link(links);
                match &link {
                    Some(url) => info!("Found image for '{}': {}", label, url),
                    None => info!("No image found for '{}'", label),
                }
                link
            }
            Err(e) => {
                warn!("Giving up on image for '{}': {}", label, e);
                None
            }
        }
    }
}
