use mockito::{Matcher, Server};
use serde_json::json;

use ayurplan::model::{BloodPressure, Diabetic};
use ayurplan::{generate_plan, AppConfig, PatientProfile, PlanError};

const PLAN_TEXT: &str = "**Symptoms:**\n- Stiff joints\n\n**Foods to Eat:**\n- Ginger\n\n\
**Foods to Avoid:**\n- Cold drinks\n\n**Diet Plan:**\n- Lunch: khichdi\n\n\
**Yoga Exercises:**\n1. **Cat-Cow Pose**: mobilises the spine\n\n**Herbs:**\n- Ashwagandha\n\n\
**Natural Treatments:**\n- Warm oil massage\n\n**Additional Tips:**\n- Stay warm\n";

fn profile() -> PatientProfile {
    PatientProfile {
        age: 58,
        weight_kg: 70.0,
        height_inches: 66,
        diabetic: Diabetic::No,
        blood_pressure: BloodPressure::Normal,
        diseases: vec!["Arthritis".to_string()],
    }
}

fn config_for(server_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    let openai = config.providers.get_mut("openai").unwrap();
    openai.api_key = Some("sk-test".to_string());
    openai.base_url = Some(server_url.to_string());

    config.image_search.base_url = format!("{}/customsearch/v1", server_url);
    config.image_search.api_key = Some("img-key".to_string());
    config.image_search.engine_id = Some("engine-1".to_string());
    config.image_search.retry_delay_ms = 1;
    config
}

#[tokio::test]
async fn test_configured_providers_produce_plan() {
    let mut server = Server::new_async().await;
    let completion = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Regex("Arthritis".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"choices": [{"message": {"content": PLAN_TEXT}}]}).to_string())
        .create_async()
        .await;
    let search = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::UrlEncoded("q".into(), "Cat-Cow Yoga Pose".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": [{"link": "https://www.yogajournal.com/cat-cow.jpg"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let plan = generate_plan(&config_for(&server.url()), &profile())
        .await
        .unwrap();

    completion.assert_async().await;
    search.assert_async().await;

    assert!(plan.html.starts_with("<h2><strong>SYMPTOMS</strong></h2>Stiff joints"));
    assert!(plan
        .html
        .contains(r#"<img src="https://www.yogajournal.com/cat-cow.jpg" alt="Cat-Cow Pose" width="200">"#));
    assert!(plan.html.contains("<strong>Lunch:</strong> khichdi"));
    assert_eq!(plan.poses.len(), 1);
    assert_eq!(plan.poses[0].label, "Cat-Cow");
}

#[tokio::test]
async fn test_image_search_outage_degrades_to_text() {
    let mut server = Server::new_async().await;
    let _completion = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"choices": [{"message": {"content": PLAN_TEXT}}]}).to_string())
        .create_async()
        .await;
    let search = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let plan = generate_plan(&config_for(&server.url()), &profile())
        .await
        .unwrap();

    search.assert_async().await;
    assert!(plan
        .html
        .contains("<li><strong>Cat-Cow Pose</strong><br>No image found.</li>"));
    assert!(plan.html.contains("Ashwagandha"));
}

#[tokio::test]
async fn test_provider_error_is_generation_failure() {
    let mut server = Server::new_async().await;
    let _completion = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create_async()
        .await;
    let search = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    match generate_plan(&config_for(&server.url()), &profile()).await {
        Err(PlanError::Generation(msg)) => assert!(msg.contains("Incorrect API key provided")),
        other => panic!("expected generation failure, got {:?}", other),
    }
    search.assert_async().await;
}

#[tokio::test]
async fn test_unknown_default_provider_is_rejected() {
    let config = AppConfig {
        default_provider: "mystery".to_string(),
        ..AppConfig::default()
    };

    match generate_plan(&config, &profile()).await {
        Err(PlanError::Provider(msg)) => assert!(msg.contains("mystery")),
        other => panic!("expected provider error, got {:?}", other),
    }
}
