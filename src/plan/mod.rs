pub mod normalize;
pub mod poses;
pub mod sections;

pub use normalize::normalize;
pub use poses::{find_poses, interpolate_poses, PoseReference};
pub use sections::{extract_sections, PlanSections, Section};

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::images::{self, ImageSearch};
use crate::model::PatientProfile;
use crate::providers::{build_plan_prompt, LlmProvider, ProviderFactory};

/// The HTML plan returned to the caller
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormattedPlan {
    pub html: String,
    pub poses: Vec<PoseReference>,
}

/// Turns a patient profile into a formatted plan: prompt, generate, format
pub struct PlanGenerator {
    provider: Box<dyn LlmProvider>,
    images: Box<dyn ImageSearch>,
}

impl PlanGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, images: Box<dyn ImageSearch>) -> Self {
        Self { provider, images }
    }

    /// Build the default provider and the image search from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, PlanError> {
        let provider = ProviderFactory::get_default_provider(config)?;
        let images = images::from_config(&config.image_search);
        info!("Plan generator using provider '{}'", provider.provider_name());
        Ok(Self::new(provider, images))
    }

    pub async fn generate(&self, profile: &PatientProfile) -> Result<FormattedPlan, PlanError> {
        let prompt = build_plan_prompt(profile);
        debug!("Plan prompt:\n{}", prompt);

        let raw = self.provider.generate(&prompt).await.map_err(|e| {
            PlanError::Generation(format!("{} failed: {}", self.provider.provider_name(), e))
        })?;
        info!(
            "Received {} bytes from {}",
            raw.len(),
            self.provider.provider_name()
        );

        Ok(format_plan(&raw, self.images.as_ref()).await)
    }
}

fn section_body(sections: &PlanSections, section: Section) -> String {
    match sections.get(section) {
        Some(body) => normalize(body),
        None => {
            warn!("Generated plan has no '{}' section", section.title());
            section.placeholder().to_string()
        }
    }
}

async fn yoga_body(sections: &PlanSections, images: &dyn ImageSearch) -> (String, Vec<PoseReference>) {
    let Some(body) = sections.get(Section::Yoga) else {
        warn!("Generated plan has no 'Yoga' section");
        return (Section::Yoga.placeholder().to_string(), Vec::new());
    };

    let tiles = interpolate_poses(body, images).await;
    let html = tiles.restore(&normalize(&tiles.text));
    (format!("<ul>{}</ul>", html), tiles.poses)
}

fn heading(title: &str) -> String {
    format!("<h2><strong>{}</strong></h2>", title)
}

/// Split raw generated text into sections and render them in display order.
///
/// Missing sections become placeholders and missing images become
/// `No image found.`; formatting itself never fails.
pub async fn format_plan(raw: &str, images: &dyn ImageSearch) -> FormattedPlan {
    let sections = extract_sections(raw);
    debug!("Found {} of {} sections", sections.found(), Section::ALL.len());

    let mut html = String::new();

    html.push_str(&heading("SYMPTOMS"));
    html.push_str(&section_body(&sections, Section::Symptoms));

    html.push_str(&heading("NUTRITION"));
    for section in [Section::FoodsToEat, Section::FoodsToAvoid, Section::DietPlan] {
        html.push_str(&format!("<h3>{}</h3>", section.title()));
        html.push_str(&section_body(&sections, section));
    }

    html.push_str(&heading("YOGA"));
    let (yoga, poses) = yoga_body(&sections, images).await;
    html.push_str(&yoga);

    html.push_str(&heading("HERBS"));
    html.push_str(&section_body(&sections, Section::Herbs));

    html.push_str(&heading("NATURAL TREATMENTS"));
    html.push_str(&section_body(&sections, Section::Treatments));

    html.push_str(&heading("ADDITIONAL TIPS"));
    html.push_str(&section_body(&sections, Section::Tips));

    FormattedPlan {
        html: normalize::heading_spacing(&html),
        poses,
    }
}
