pub mod config;
pub mod error;
pub mod images;
pub mod model;
pub mod plan;
pub mod providers;
pub mod server;

pub use config::{load_config, AppConfig};
pub use error::PlanError;
pub use model::{PatientProfile, PlanForm};
pub use plan::{format_plan, FormattedPlan, PlanGenerator};

/// Generate a formatted plan for one profile using the given configuration
pub async fn generate_plan(
    config: &AppConfig,
    profile: &PatientProfile,
) -> Result<FormattedPlan, PlanError> {
    PlanGenerator::from_config(config)?.generate(profile).await
}
