//! Common step definitions used across features

use std::sync::Arc;

use cucumber::{given, then};

use crate::common::{MockLanguageModel, PHOTOSYNTHESIS, RUST_OWNERSHIP};
use crate::features::support::TestWorld;

#[given("the assistant runs without a language model")]
async fn without_model(world: &mut TestWorld) {
    world.model = None;
    world.app = None;
}

#[given(expr = "the language model replies {string}")]
async fn model_replies(world: &mut TestWorld, reply: String) {
    let model = world
        .model
        .get_or_insert_with(|| Arc::new(MockLanguageModel::new()))
        .clone();
    model.push_reply(&reply);
}

#[given(expr = "a document {string} about {word}")]
async fn document_exists(world: &mut TestWorld, name: String, topic: String) {
    let text = match topic.as_str() {
        "photosynthesis" => PHOTOSYNTHESIS,
        "ownership" => RUST_OWNERSHIP,
        other => panic!("No sample document about {}", other),
    };
    let id = world.app().await.create_document(&name, text).await;
    world.document_id = Some(id);
}

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    if let Some(response) = &world.last_response {
        assert_eq!(response.status, status, "Body: {}", response.body);
    } else {
        panic!("No response available");
    }
}

#[then(expr = "the error message should contain {string}")]
async fn error_message_contains(world: &mut TestWorld, text: String) {
    let message = world.body()["message"].as_str().unwrap_or_default();
    assert!(
        message.contains(&text),
        "Expected '{}' in error message '{}'",
        text,
        message
    );
}
