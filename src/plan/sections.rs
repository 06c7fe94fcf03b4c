use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Topical sections of a generated plan, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Symptoms,
    FoodsToEat,
    FoodsToAvoid,
    DietPlan,
    Yoga,
    Herbs,
    Treatments,
    Tips,
}

/// Heading decoration the model tends to wrap headings in: `**Herbs:**`, `Herbs**:`
const DECORATION: &str = r"(?:\*\*)?:?(?:\*\*)?";

fn heading_regex(words: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b{}", words, DECORATION)).expect("Invalid section heading regex")
}

static HEADINGS: LazyLock<Vec<(Section, Regex)>> = LazyLock::new(|| {
    Section::ALL
        .iter()
        .map(|section| (*section, heading_regex(section.heading_pattern())))
        .collect()
});

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Symptoms,
        Section::FoodsToEat,
        Section::FoodsToAvoid,
        Section::DietPlan,
        Section::Yoga,
        Section::Herbs,
        Section::Treatments,
        Section::Tips,
    ];

    fn heading_pattern(&self) -> &'static str {
        match self {
            Section::Symptoms => r"symptoms",
            Section::FoodsToEat => r"foods?\s+to\s+eat",
            Section::FoodsToAvoid => r"foods?\s+to\s+avoid",
            Section::DietPlan => r"diet\s+plan",
            Section::Yoga => r"yoga\s+(?:exercises|poses)",
            Section::Herbs => r"herbs",
            Section::Treatments => r"natural\s+treatments",
            Section::Tips => r"additional\s+tips",
        }
    }

    /// Human readable title, used for sub-headings
    pub fn title(&self) -> &'static str {
        match self {
            Section::Symptoms => "Symptoms",
            Section::FoodsToEat => "Foods to Eat",
            Section::FoodsToAvoid => "Foods to Avoid",
            Section::DietPlan => "Diet Plan",
            Section::Yoga => "Yoga",
            Section::Herbs => "Herbs",
            Section::Treatments => "Natural Treatments",
            Section::Tips => "Additional Tips",
        }
    }

    /// Text shown when the heading never appears in the generated plan
    pub fn placeholder(&self) -> &'static str {
        match self {
            Section::Symptoms => "No symptoms available",
            Section::FoodsToEat => "No foods to eat available",
            Section::FoodsToAvoid => "No foods to avoid available",
            Section::DietPlan => "No diet plan available",
            Section::Yoga => "No yoga exercises available",
            Section::Herbs => "No herbs available",
            Section::Treatments => "No natural treatments available",
            Section::Tips => "No additional tips available",
        }
    }
}

/// Section bodies located in one generated plan
#[derive(Debug, Clone, Default)]
pub struct PlanSections {
    bodies: HashMap<Section, String>,
}

impl PlanSections {
    /// Body text of a section whose heading was found
    pub fn get(&self, section: Section) -> Option<&str> {
        self.bodies.get(&section).map(String::as_str)
    }

    pub fn body_or_placeholder(&self, section: Section) -> &str {
        self.get(section).unwrap_or_else(|| section.placeholder())
    }

    pub fn found(&self) -> usize {
        self.bodies.len()
    }
}

/// Split generated text into sections by their headings.
///
/// Headings are looked up in canonical order, each starting from the end of the
/// previously found heading; a heading that only appears earlier (the model
/// reordered its answer) is still accepted. A body ends where the next section
/// in canonical order that is present after it begins, so a missing heading
/// lets the body run on to the one after. Matching is lexical, so the next
/// heading's words inside prose will split a section early.
pub fn extract_sections(text: &str) -> PlanSections {
    let mut sections = PlanSections::default();
    let mut cursor = 0;

    for (index, (section, heading)) in HEADINGS.iter().enumerate() {
        let found = heading
            .find_at(text, cursor)
            .or_else(|| heading.find(text));
        let Some(found) = found else {
            debug!("No '{}' heading in generated plan", section.title());
            continue;
        };

        let body_start = found.end();
        let body_end = HEADINGS[index + 1..]
            .iter()
            .find_map(|(_, next)| next.find_at(text, body_start))
            .map(|m| m.start())
            .unwrap_or(text.len());

        sections
            .bodies
            .insert(*section, text[body_start..body_end].to_string());
        cursor = cursor.max(body_start);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "Symptoms\nthirst, fatigue\nFoods to Eat\noats, greens\nFoods to Avoid\nsugar\n\
Diet Plan\nBreakfast: oats\nYoga Exercises\nTree Pose\nHerbs\nTurmeric\nNatural Treatments\n\
Abhyanga massage\nAdditional Tips\nSleep early\n";

    #[test]
    fn test_bodies_are_text_between_headings() {
        let sections = extract_sections(CANONICAL);
        assert_eq!(sections.found(), 8);
        assert_eq!(sections.get(Section::Symptoms), Some("\nthirst, fatigue\n"));
        assert_eq!(sections.get(Section::FoodsToEat), Some("\noats, greens\n"));
        assert_eq!(sections.get(Section::FoodsToAvoid), Some("\nsugar\n"));
        assert_eq!(sections.get(Section::DietPlan), Some("\nBreakfast: oats\n"));
        assert_eq!(sections.get(Section::Yoga), Some("\nTree Pose\n"));
        assert_eq!(sections.get(Section::Herbs), Some("\nTurmeric\n"));
        assert_eq!(sections.get(Section::Treatments), Some("\nAbhyanga massage\n"));
        assert_eq!(sections.get(Section::Tips), Some("\nSleep early\n"));
    }

    #[test]
    fn test_missing_herbs_uses_placeholder() {
        let text = CANONICAL.replace("Herbs\nTurmeric\n", "");
        let sections = extract_sections(&text);
        assert_eq!(sections.get(Section::Herbs), None);
        assert_eq!(sections.body_or_placeholder(Section::Herbs), "No herbs available");
        assert_eq!(sections.get(Section::Yoga), Some("\nTree Pose\n"));
        assert_eq!(sections.get(Section::Treatments), Some("\nAbhyanga massage\n"));
    }

    #[test]
    fn test_markdown_headings_and_case() {
        let text = "### **SYMPTOMS:**\n- Thirst\n### **Foods To Eat**:\n- Oats\n";
        let sections = extract_sections(text);
        assert_eq!(sections.get(Section::Symptoms), Some("\n- Thirst\n### **"));
        assert_eq!(sections.get(Section::FoodsToEat), Some("\n- Oats\n"));
    }

    #[test]
    fn test_last_section_runs_to_end() {
        let sections = extract_sections("Additional Tips: walk daily");
        assert_eq!(sections.get(Section::Tips), Some(" walk daily"));
        assert_eq!(sections.found(), 1);
    }

    #[test]
    fn test_reordered_heading_is_still_found() {
        let text = "Herbs\nTulsi\nSymptoms\nCough\nFoods to Eat\nGinger\nYoga Exercises\nCobra Pose\n";
        let sections = extract_sections(text);
        assert_eq!(sections.get(Section::Symptoms), Some("\nCough\n"));
        assert_eq!(sections.get(Section::FoodsToEat), Some("\nGinger\n"));
        assert_eq!(sections.get(Section::Yoga), Some("\nCobra Pose\n"));
        // Herbs precedes Symptoms and nothing after it follows in order
        assert_eq!(
            sections.get(Section::Herbs),
            Some("\nTulsi\nSymptoms\nCough\nFoods to Eat\nGinger\nYoga Exercises\nCobra Pose\n")
        );
    }

    #[test]
    fn test_later_heading_words_in_prose_do_not_truncate() {
        let text = "Symptoms\nfatigue that herbs can ease\nthirst, worse without yoga\n\
Foods to Eat\noats\nHerbs\nTulsi\n";
        let sections = extract_sections(text);
        assert_eq!(
            sections.get(Section::Symptoms),
            Some("\nfatigue that herbs can ease\nthirst, worse without yoga\n")
        );
        assert_eq!(sections.get(Section::FoodsToEat), Some("\noats\n"));
        assert_eq!(sections.get(Section::Herbs), Some("\nTulsi\n"));
    }

    #[test]
    fn test_yoga_needs_exercises_or_poses() {
        let text = "Diet Plan\nEat light before yoga.\nYoga Poses:\nTree Pose\n";
        let sections = extract_sections(text);
        assert_eq!(sections.get(Section::DietPlan), Some("\nEat light before yoga.\n"));
        assert_eq!(sections.get(Section::Yoga), Some("\nTree Pose\n"));
    }

    #[test]
    fn test_next_heading_word_in_prose_splits_early() {
        let text = "Diet Plan\nEat light before yoga exercises.\nYoga Exercises\nTree Pose\n";
        let sections = extract_sections(text);
        assert_eq!(sections.get(Section::DietPlan), Some("\nEat light before "));
    }

    #[test]
    fn test_empty_text_has_only_placeholders() {
        let sections = extract_sections("");
        assert_eq!(sections.found(), 0);
        for section in Section::ALL {
            assert_eq!(sections.body_or_placeholder(section), section.placeholder());
        }
    }
}
