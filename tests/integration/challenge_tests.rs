//! Challenge mode integration tests

use std::sync::Arc;

use rstest::rstest;

use research_assistant::api::INCOMPLETE_ANSWERS;
use research_assistant::services::challenge::{CORRECT_FEEDBACK, INCORRECT_FEEDBACK};

use crate::common::{MockLanguageModel, TestApp, PHOTOSYNTHESIS};

async fn app_with_challenge() -> (TestApp, String) {
    let app = TestApp::new().await;
    let id = app.create_document("notes.txt", PHOTOSYNTHESIS).await;
    app.post_json(
        &format!("/api/v1/documents/{}/challenge", id),
        serde_json::json!({}),
    )
    .await
    .assert_created();
    (app, id)
}

#[tokio::test]
async fn test_generate_challenge_without_model_uses_fallback_questions() {
    let app = TestApp::new().await;
    let id = app.create_document("notes.txt", PHOTOSYNTHESIS).await;

    let response = app
        .post_json(
            &format!("/api/v1/documents/{}/challenge", id),
            serde_json::json!({}),
        )
        .await;

    response.assert_created();
    let json: serde_json::Value = response.json();
    let questions = json["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(
        questions[0]["question"],
        "What is the main topic of the document?"
    );
    assert_eq!(json["answers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_generate_challenge_with_model() {
    let model = Arc::new(MockLanguageModel::new());
    model.push_reply("Summary: Plants make sugar.");
    model.push_reply("Question: What pigment absorbs red and blue light? It is green.");
    let app = TestApp::with_model(model).await;
    let id = app.create_document("notes.txt", PHOTOSYNTHESIS).await;

    let response = app
        .post_json(
            &format!("/api/v1/documents/{}/challenge", id),
            serde_json::json!({}),
        )
        .await;

    response.assert_created();
    let json: serde_json::Value = response.json();
    let questions = json["questions"].as_array().unwrap();
    assert!(!questions.is_empty());
    assert_eq!(
        questions[0]["question"],
        "What pigment absorbs red and blue light?"
    );
    assert!(questions[0]["context"]
        .as_str()
        .unwrap()
        .contains("Chlorophyll"));
}

#[tokio::test]
async fn test_get_challenge_before_generation_returns_not_found() {
    let app = TestApp::new().await;
    let id = app.create_document("notes.txt", PHOTOSYNTHESIS).await;

    app.get(&format!("/api/v1/documents/{}/challenge", id))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_submit_without_challenge_returns_not_found() {
    let app = TestApp::new().await;
    let id = app.create_document("notes.txt", PHOTOSYNTHESIS).await;

    app.post_json(
        &format!("/api/v1/documents/{}/challenge/answers", id),
        serde_json::json!({ "answers": ["a", "b", "c"] }),
    )
    .await
    .assert_not_found();
}

#[rstest]
#[case::too_few(vec!["Light", "Oxygen"])]
#[case::blank_answer(vec!["Light", "  ", "Sugar"])]
#[case::too_many(vec!["Light", "Oxygen", "Sugar", "Water"])]
#[tokio::test]
async fn test_incomplete_answers_are_rejected(#[case] answers: Vec<&str>) {
    let (app, id) = app_with_challenge().await;

    let response = app
        .post_json(
            &format!("/api/v1/documents/{}/challenge/answers", id),
            serde_json::json!({ "answers": answers }),
        )
        .await;

    response.assert_bad_request();
    assert!(response.error_message().contains(INCOMPLETE_ANSWERS));
}

#[tokio::test]
async fn test_submit_answers_evaluates_each_question() {
    let (app, id) = app_with_challenge().await;

    let response = app
        .post_json(
            &format!("/api/v1/documents/{}/challenge/answers", id),
            serde_json::json!({
                "answers": [
                    "Photosynthesis turns light into chemical energy",
                    "Bananas grow quickly nowhere",
                    "Sugars get fixed from carbon dioxide"
                ]
            }),
        )
        .await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    let evaluations = json["evaluations"].as_array().unwrap();
    assert_eq!(evaluations.len(), 3);

    assert_eq!(evaluations[0]["is_correct"], true);
    assert_eq!(evaluations[0]["feedback"], CORRECT_FEEDBACK);
    assert_eq!(evaluations[1]["is_correct"], false);
    assert_eq!(evaluations[1]["feedback"], INCORRECT_FEEDBACK);
    assert_eq!(json["answers"].as_array().unwrap().len(), 3);

    let stored: serde_json::Value = app
        .get(&format!("/api/v1/documents/{}/challenge", id))
        .await
        .json();
    assert_eq!(stored["evaluations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_resubmission_requires_reset() {
    let (app, id) = app_with_challenge().await;
    let uri = format!("/api/v1/documents/{}/challenge/answers", id);
    let body = serde_json::json!({ "answers": ["Light", "Oxygen", "Sugar"] });

    app.post_json(&uri, body.clone()).await.assert_ok();
    app.post_json(&uri, body.clone())
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);

    app.delete(&uri).await.assert_no_content();

    let round: serde_json::Value = app
        .get(&format!("/api/v1/documents/{}/challenge", id))
        .await
        .json();
    assert_eq!(round["questions"].as_array().unwrap().len(), 3);
    assert!(round["evaluations"].as_array().unwrap().is_empty());

    app.post_json(&uri, body).await.assert_ok();
}

#[tokio::test]
async fn test_regenerating_replaces_previous_round() {
    let (app, id) = app_with_challenge().await;
    let answers_uri = format!("/api/v1/documents/{}/challenge/answers", id);

    app.post_json(
        &answers_uri,
        serde_json::json!({ "answers": ["Light", "Oxygen", "Sugar"] }),
    )
    .await
    .assert_ok();

    let response = app
        .post_json(
            &format!("/api/v1/documents/{}/challenge", id),
            serde_json::json!({}),
        )
        .await;
    response.assert_created();
    let json: serde_json::Value = response.json();
    assert!(json["evaluations"].as_array().unwrap().is_empty());
}
