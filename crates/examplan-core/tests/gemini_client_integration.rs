//! Integration tests for the Gemini client.
//!
//! Tests use a mockito server so request shape and error mapping can be
//! checked without credentials or network access.

use examplan_core::ai::API_KEY_ENV;
use examplan_core::{
    CoreError, GeminiClient, ImageUpload, ModelClient, ModelConfig, ObservanceConfig, Wizard,
    WizardStep,
};
use mockito::Matcher;
use serde_json::json;

const PATH: &str = "/models/gemini-1.5-flash:generateContent";

fn config(endpoint: String) -> ModelConfig {
    ModelConfig {
        endpoint,
        api_key: "test-key".into(),
        ..ModelConfig::default()
    }
}

fn reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn env_key_set() -> bool {
    std::env::var(API_KEY_ENV).is_ok_and(|k| !k.is_empty())
}

#[tokio::test]
async fn test_extract_sends_prompt_image_and_sampling_config() {
    if env_key_set() {
        return;
    }
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "generationConfig": {
                    "temperature": 1.0,
                    "topP": 0.95,
                    "topK": 40,
                    "maxOutputTokens": 8192,
                    "responseMimeType": "text/plain"
                }
            })),
            Matcher::Regex(r#""inlineData":\{"mimeType":"image/png","data":"UE5H"\}"#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("{\"exams\":[]}"))
        .expect(1)
        .create_async()
        .await;

    let mut client = GeminiClient::new(config(server.url()));
    let text = client
        .extract(&ImageUpload::new(b"PNG".to_vec(), "image/png"))
        .await
        .unwrap();

    assert_eq!(text, "{\"exams\":[]}");
    assert_eq!(client.history_len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_resends_history() {
    if env_key_set() {
        return;
    }
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("first answer"))
        .expect(1)
        .create_async()
        .await;

    let mut client = GeminiClient::new(config(server.url()));
    client.generate("first question").await.unwrap();
    first.assert_async().await;
    first.remove_async().await;

    let second = server
        .mock("POST", PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""role":"user","parts":\[\{"text":"first question"\}\]"#.into()),
            Matcher::Regex(r#""role":"model","parts":\[\{"text":"first answer"\}\]"#.into()),
            Matcher::Regex("second question".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("second answer"))
        .expect(1)
        .create_async()
        .await;

    assert_eq!(client.generate("second question").await.unwrap(), "second answer");
    assert_eq!(client.history_len(), 4);
    second.assert_async().await;

    client.reset();
    assert_eq!(client.history_len(), 0);
}

#[tokio::test]
async fn test_http_error_maps_to_service_error() {
    if env_key_set() {
        return;
    }
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let mut client = GeminiClient::new(config(server.url()));
    match client.generate("plan please").await {
        Err(CoreError::Service { status, message }) => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected service error, got {other:?}"),
    }
    assert_eq!(client.history_len(), 0);
}

#[tokio::test]
async fn test_empty_candidates_is_service_error() {
    if env_key_set() {
        return;
    }
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let mut client = GeminiClient::new(config(server.url()));
    let err = client.generate("plan please").await.unwrap_err();
    assert!(err.is_service());
}

#[tokio::test]
async fn test_missing_api_key_is_config_error() {
    if env_key_set() {
        return;
    }
    let mut client = GeminiClient::new(ModelConfig {
        endpoint: "http://127.0.0.1:9".into(),
        ..ModelConfig::default()
    });
    assert!(matches!(
        client.generate("hello").await,
        Err(CoreError::Config(_))
    ));
}

#[tokio::test]
async fn test_unreachable_service_is_service_error() {
    if env_key_set() {
        return;
    }
    // Port 9 (discard) is closed on test machines.
    let mut client = GeminiClient::new(config("http://127.0.0.1:9".into()));
    assert!(client.generate("hello").await.unwrap_err().is_service());
}

#[tokio::test]
async fn test_wizard_against_mock_service() {
    if env_key_set() {
        return;
    }
    let mut server = mockito::Server::new_async().await;
    let extraction = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply(
            "```json\n{\"exams\":[{\"subject\":\"Calculus\",\"date\":\"Dec 10\",\"time\":\"9am\",\"duration\":\"2h\"}]}\n```",
        ))
        .expect(1)
        .create_async()
        .await;

    let mut wizard = Wizard::new(GeminiClient::new(config(server.url())), ObservanceConfig::default());
    wizard
        .upload(Some(ImageUpload::new(b"PNG".to_vec(), "image/jpeg")))
        .await
        .unwrap();
    extraction.assert_async().await;
    extraction.remove_async().await;
    assert_eq!(wizard.step(), WizardStep::Review);

    let generation = server
        .mock("POST", PATH)
        .match_body(Matcher::Regex(r#"\{\\"Calculus\\":\\"medium\\"\}"#.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("Morning\nCalculus (practice exams)"))
        .expect(1)
        .create_async()
        .await;

    wizard.next().await.unwrap();
    wizard.next().await.unwrap();
    assert_eq!(wizard.step(), WizardStep::Generate);
    generation.assert_async().await;

    let sections = wizard.sections();
    assert_eq!(sections[0].title, "Morning");
    assert_eq!(sections[0].items, vec!["Calculus (practice exams)"]);
}
