mod factory;
mod google;
mod open_ai;
mod prompt;

pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_plan_prompt, SECTION_HEADINGS, SYSTEM_PROMPT};

use async_trait::async_trait;
use std::error::Error;

/// Unified trait for all text-generation providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "google")
    fn provider_name(&self) -> &str;

    /// Send a prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}
