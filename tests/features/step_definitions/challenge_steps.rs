//! Challenge mode step definitions

use cucumber::{gherkin::Step, then, when};

use crate::features::support::TestWorld;

#[when("I request a challenge")]
async fn request_challenge(world: &mut TestWorld) {
    let uri = world.document_path("/challenge");
    world.post(&uri, serde_json::json!({})).await;
}

#[when("I submit the answers:")]
async fn submit_answers(world: &mut TestWorld, step: &Step) {
    let answers: Vec<String> = step
        .table
        .as_ref()
        .map(|table| table.rows.iter().filter_map(|row| row.first().cloned()).collect())
        .unwrap_or_default();

    let uri = world.document_path("/challenge/answers");
    world
        .post(&uri, serde_json::json!({ "answers": answers }))
        .await;
}

#[when("I reset my answers")]
async fn reset_answers(world: &mut TestWorld) {
    let uri = world.document_path("/challenge/answers");
    world.delete(&uri).await;
}

#[then(expr = "the challenge should have {int} questions")]
async fn question_count(world: &mut TestWorld, count: usize) {
    let questions = world.body()["questions"]
        .as_array()
        .expect("Expected a challenge round");
    assert_eq!(questions.len(), count);
}

#[then(expr = "question {int} should be marked {word}")]
async fn question_marked(world: &mut TestWorld, number: usize, verdict: String) {
    let expected = match verdict.as_str() {
        "correct" => true,
        "incorrect" => false,
        other => panic!("Unknown verdict {}", other),
    };
    let evaluation = &world.body()["evaluations"][number - 1];
    assert_eq!(evaluation["is_correct"], expected, "Evaluation: {}", evaluation);
}
