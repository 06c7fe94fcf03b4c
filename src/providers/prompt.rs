use crate::model::PatientProfile;

/// System message for providers that take one.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Section headings the extractor looks for, in the order the model should use them.
pub const SECTION_HEADINGS: [&str; 8] = [
    "Symptoms",
    "Foods to Eat",
    "Foods to Avoid",
    "Diet Plan",
    "Yoga Exercises",
    "Herbs",
    "Natural Treatments",
    "Additional Tips",
];

/// Build the plan request for a patient.
///
/// One block of sub-prompts is emitted per disease, each tailored to the
/// patient's diabetic and blood-pressure status. The closing block pins the
/// headings that the section extractor relies on.
pub fn build_plan_prompt(profile: &PatientProfile) -> String {
    let diseases = profile.diseases.join(", ");
    let status = format!(
        "diabetic status ({}) and {} blood pressure",
        profile.diabetic, profile.blood_pressure
    );

    let mut prompt = String::new();
    prompt.push_str("Personalised Ayurvedic Health Plan\n\n");

    prompt.push_str("Patient details:\n");
    prompt.push_str(&format!("- Age: {} years\n", profile.age));
    prompt.push_str(&format!("- Weight: {} kgs\n", profile.weight_kg));
    prompt.push_str(&format!("- Height: {} inches\n", profile.height_inches));
    prompt.push_str(&format!("- Diabetic: {}\n", profile.diabetic));
    prompt.push_str(&format!("- Blood pressure: {}\n", profile.blood_pressure));
    prompt.push_str(&format!("- Conditions: {}\n\n", diseases));

    prompt.push_str(&format!(
        "Provide a detailed health plan for a {}-year-old person with {}, who weighs {} kgs, \
         has a height of {} inches, is diabetic ({}), and has blood pressure categorized as {}. \
         Ensure that the plan is tailored to these details.\n\n",
        profile.age,
        diseases,
        profile.weight_kg,
        profile.height_inches,
        profile.diabetic,
        profile.blood_pressure
    ));

    for (index, disease) in profile.diseases.iter().enumerate() {
        prompt.push_str(&format!("{}. For {}:\n", index + 1, disease));
        prompt.push_str(&format!(
            "   - Symptoms: list the symptoms of {disease}, explained for a patient with {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Foods to Eat: foods that help with {disease} and suit the patient's {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Foods to Avoid: foods that worsen {disease} or conflict with the patient's {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Herbs: Ayurvedic herbs and powders that help manage {disease}, and how to consume them safely given the patient's {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Yoga: yoga poses suitable for {disease} and {status}; name each pose as '<Name> Pose' and explain it in points.\n"
        ));
        prompt.push_str(&format!(
            "   - Diet Plan: breakfast, lunch, evening snack and dinner for {disease}, suited to the patient's age, weight and {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Smoothies/Detox: smoothies or detox drinks for {disease} that are safe with {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Natural Treatments: external or herbal therapies for {disease} suitable for a patient with {status}.\n"
        ));
        prompt.push_str(&format!(
            "   - Additional Methods: other lifestyle methods for managing {disease} alongside {status}.\n\n"
        ));
    }

    prompt.push_str(
        "Format the answer with exactly these section headings, each used once and in this order, \
         covering every condition listed above: ",
    );
    prompt.push_str(&SECTION_HEADINGS.join(", "));
    prompt.push_str(
        ". Put smoothies and detox drinks inside the Diet Plan section and additional methods \
         inside the Additional Tips section.\n",
    );

    prompt
}
