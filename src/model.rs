use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Diabetic {
    Yes,
    No,
}

impl FromStr for Diabetic {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Diabetic::Yes),
            "no" => Ok(Diabetic::No),
            other => Err(PlanError::InvalidInput(format!(
                "diabetic must be 'yes' or 'no', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Diabetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diabetic::Yes => write!(f, "yes"),
            Diabetic::No => write!(f, "no"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BloodPressure {
    Low,
    Normal,
    High,
}

impl FromStr for BloodPressure {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(BloodPressure::Low),
            "normal" => Ok(BloodPressure::Normal),
            "high" => Ok(BloodPressure::High),
            other => Err(PlanError::InvalidInput(format!(
                "bp must be 'low', 'normal' or 'high', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BloodPressure::Low => write!(f, "low"),
            BloodPressure::Normal => write!(f, "normal"),
            BloodPressure::High => write!(f, "high"),
        }
    }
}

/// Validated patient parameters for a single plan request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_inches: u32,
    pub diabetic: Diabetic,
    pub blood_pressure: BloodPressure,
    pub diseases: Vec<String>,
}

/// Raw form fields as posted by the browser
#[derive(Debug, Clone, Default)]
pub struct PlanForm {
    pub diseases: Vec<String>,
    pub age: Option<String>,
    pub weight: Option<String>,
    pub diabetic: Option<String>,
    pub bp: Option<String>,
    pub height_feet: Option<String>,
    pub height_inches: Option<String>,
}

impl PlanForm {
    /// Collect url-decoded form pairs. `disease` may repeat; a single value may
    /// also hold several comma-separated diseases. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = PlanForm::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "disease" | "disease[]" => form.diseases.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(String::from),
                ),
                "age" => form.age = Some(value),
                "weight" => form.weight = Some(value),
                "diabetic" => form.diabetic = Some(value),
                "bp" => form.bp = Some(value),
                "height_feet" => form.height_feet = Some(value),
                "height_inches" => form.height_inches = Some(value),
                _ => {}
            }
        }
        form
    }

    /// Check every field and build the profile. Runs before any external call.
    pub fn validate(&self) -> Result<PatientProfile, PlanError> {
        if self.diseases.is_empty() {
            return Err(PlanError::InvalidInput(
                "at least one disease is required".to_string(),
            ));
        }

        let age: u32 = parse_field("age", &self.age)?;

        let weight_kg: f64 = parse_field("weight", &self.weight)?;
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(PlanError::InvalidInput(
                "weight must be a positive number".to_string(),
            ));
        }

        let feet: u32 = parse_field("height_feet", &self.height_feet)?;
        let inches: u32 = parse_field("height_inches", &self.height_inches)?;

        Ok(PatientProfile {
            age,
            weight_kg,
            height_inches: total_height_inches(feet, inches)?,
            diabetic: required("diabetic", &self.diabetic)?.parse()?,
            blood_pressure: required("bp", &self.bp)?.parse()?,
            diseases: self.diseases.clone(),
        })
    }
}

/// Height in inches from its feet and inches components.
pub fn total_height_inches(feet: u32, inches: u32) -> Result<u32, PlanError> {
    feet.checked_mul(12)
        .and_then(|f| f.checked_add(inches))
        .ok_or_else(|| PlanError::InvalidInput("height is out of range".to_string()))
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, PlanError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PlanError::InvalidInput(format!("{} is required", name))),
    }
}

fn parse_field<T: FromStr>(name: &str, value: &Option<String>) -> Result<T, PlanError> {
    let raw = required(name, value)?;
    raw.parse().map_err(|_| {
        PlanError::InvalidInput(format!("{} must be a non-negative number, got '{}'", name, raw))
    })
}
