use crate::config::{AppConfig, ProviderConfig};
use crate::error::PlanError;
use crate::providers::{GoogleProvider, LlmProvider, OpenAIProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, PlanError> {
        if !config.enabled {
            return Err(PlanError::Provider(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        let provider: Box<dyn LlmProvider> = match provider_name {
            "openai" => Box::new(OpenAIProvider::new(config).map_err(provider_error)?),
            "google" => Box::new(GoogleProvider::new(config).map_err(provider_error)?),
            _ => {
                return Err(PlanError::Provider(format!(
                    "Unknown provider: {}",
                    provider_name
                )))
            }
        };

        Ok(provider)
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(config: &AppConfig) -> Result<Box<dyn LlmProvider>, PlanError> {
        let provider_name = &config.default_provider;
        let provider_config = config.providers.get(provider_name).ok_or_else(|| {
            PlanError::Provider(format!(
                "Default provider '{}' not found in configuration",
                provider_name
            ))
        })?;

        Self::create(provider_name, provider_config)
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "google"]
    }
}

fn provider_error(e: Box<dyn std::error::Error + Send + Sync>) -> PlanError {
    PlanError::Provider(e.to_string())
}
