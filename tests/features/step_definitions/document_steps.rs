//! Document and question answering step definitions

use cucumber::{then, when};

use crate::features::support::TestWorld;

#[when(expr = "I ask {string}")]
async fn ask(world: &mut TestWorld, question: String) {
    let uri = world.document_path("/ask");
    world
        .post(&uri, serde_json::json!({ "question": question }))
        .await;
}

#[when("I open the document")]
async fn open_document(world: &mut TestWorld) {
    let uri = world.document_path("");
    world.get(&uri).await;
}

#[when("I delete the document")]
async fn delete_document(world: &mut TestWorld) {
    let uri = world.document_path("");
    world.delete(&uri).await;
}

#[when("I view the conversation")]
async fn view_conversation(world: &mut TestWorld) {
    let uri = world.document_path("/messages");
    world.get(&uri).await;
}

#[then(expr = "the answer should contain {string}")]
async fn answer_contains(world: &mut TestWorld, text: String) {
    let answer = world.body()["answer"].as_str().unwrap_or_default();
    assert!(answer.contains(&text), "Answer was '{}'", answer);
}

#[then(expr = "the answer should come from {string}")]
async fn answer_model(world: &mut TestWorld, model: String) {
    assert_eq!(world.body()["model"], model.as_str());
}

#[then(expr = "the summary should come from {string}")]
async fn summary_source(world: &mut TestWorld, source: String) {
    assert_eq!(world.body()["summary_source"], source.as_str());
}

#[then(expr = "the conversation should have {int} messages")]
async fn conversation_length(world: &mut TestWorld, count: usize) {
    let messages = world.body().as_array().expect("Expected a message list");
    assert_eq!(messages.len(), count);
}
