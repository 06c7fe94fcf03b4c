use thiserror::Error;

/// Errors that can occur while building a wellness plan
#[derive(Error, Debug)]
pub enum PlanError {
    /// Form input was missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The text-generation provider failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A provider could not be created from configuration
    #[error("Provider error: {0}")]
    Provider(String),

    /// Failed to build or send an HTTP request
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Failed to bind or serve the HTTP listener
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlanError::InvalidInput("age must be a whole number".to_string());
        assert_eq!(err.to_string(), "Invalid input: age must be a whole number");

        let err = PlanError::Generation("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Generation failed: quota exceeded");
    }
}
