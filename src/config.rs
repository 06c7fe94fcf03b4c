use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::images::RetryPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Generation provider used to write plans
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Image search used for yoga pose pictures
    #[serde(default)]
    pub image_search: ImageSearchConfig,
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for a specific generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4-turbo", "gemini-1.5-flash")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Configuration for the pose image search
#[derive(Debug, Deserialize, Clone)]
pub struct ImageSearchConfig {
    /// Whether image lookup is attempted at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Search endpoint
    #[serde(default = "default_image_search_url")]
    pub base_url: String,
    /// API key (falls back to IMAGE_SEARCH_API_KEY)
    pub api_key: Option<String>,
    /// Search engine / context id (falls back to IMAGE_SEARCH_ENGINE_ID)
    pub engine_id: Option<String>,
    /// Restrict results to this site when set
    #[serde(default = "default_site")]
    pub site: Option<String>,
    /// Appended to every pose label in the query
    #[serde(default = "default_query_suffix")]
    pub query_suffix: String,
    /// Number of results requested per lookup
    #[serde(default = "default_result_count")]
    pub result_count: u32,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
    /// Total attempts per lookup
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Factor applied to the delay after each further failure
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_image_search_url(),
            api_key: None,
            engine_id: None,
            site: default_site(),
            query_suffix: default_query_suffix(),
            result_count: default_result_count(),
            timeout_secs: default_image_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl ImageSearchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts.max(1),
            base_delay: Duration::from_millis(self.retry_delay_ms),
            multiplier: self.backoff_multiplier,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: default_providers(),
            image_search: ImageSearchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert(
        "openai".to_string(),
        ProviderConfig {
            enabled: true,
            model: "gpt-4-turbo".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        },
    );
    providers.insert(
        "google".to_string(),
        ProviderConfig {
            enabled: true,
            model: "gemini-1.5-flash".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        },
    );
    providers
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_true() -> bool {
    true
}

fn default_image_search_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_site() -> Option<String> {
    Some("yogajournal.com".to_string())
}

fn default_query_suffix() -> String {
    "Yoga Pose".to_string()
}

fn default_result_count() -> u32 {
    1
}

fn default_image_timeout() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_backoff_multiplier() -> u32 {
    2
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Load configuration from `config.toml` (optional) and `AYURPLAN__` environment variables
///
/// Priority, highest first:
/// 1. Environment variables with the AYURPLAN__ prefix
/// 2. config.toml in the current directory
/// 3. Default values
///
/// Environment variable format: AYURPLAN__PROVIDERS__OPENAI__API_KEY
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: AYURPLAN__IMAGE_SEARCH__ENGINE_ID
        .add_source(
            Environment::with_prefix("AYURPLAN")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
