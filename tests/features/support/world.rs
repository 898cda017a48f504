//! Test world for Cucumber scenarios

use std::fmt;
use std::sync::Arc;

use cucumber::World;

use crate::common::{MockLanguageModel, TestApp};

/// Test world that maintains state across scenario steps
#[derive(Default, World)]
pub struct TestWorld {
    /// Application under test, built by the first step that needs it
    pub app: Option<TestApp>,

    /// Mock model backing the application, if any
    pub model: Option<Arc<MockLanguageModel>>,

    /// Document the scenario works on
    pub document_id: Option<String>,

    /// Response from last API call
    pub last_response: Option<TestResponse>,
}

impl fmt::Debug for TestWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestWorld")
            .field("has_app", &self.app.is_some())
            .field("has_model", &self.model.is_some())
            .field("document_id", &self.document_id)
            .field("last_response", &self.last_response)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl TestWorld {
    /// Application under test, created without a model on first use
    pub async fn app(&mut self) -> &TestApp {
        if self.app.is_none() {
            let app = match &self.model {
                Some(model) => TestApp::with_model(model.clone()).await,
                None => TestApp::new().await,
            };
            self.app = Some(app);
        }
        self.app.as_ref().unwrap()
    }

    /// Path under the current document
    pub fn document_path(&self, suffix: &str) -> String {
        let id = self
            .document_id
            .as_deref()
            .expect("No document has been uploaded in this scenario");
        format!("/api/v1/documents/{}{}", id, suffix)
    }

    /// POST JSON and remember the response
    pub async fn post(&mut self, uri: &str, body: serde_json::Value) {
        let response = self.app().await.post_json(uri, body).await;
        self.record(response);
    }

    /// GET and remember the response
    pub async fn get(&mut self, uri: &str) {
        let response = self.app().await.get(uri).await;
        self.record(response);
    }

    /// DELETE and remember the response
    pub async fn delete(&mut self, uri: &str) {
        let response = self.app().await.delete(uri).await;
        self.record(response);
    }

    fn record(&mut self, response: crate::common::TestResponse) {
        let body = serde_json::from_slice(&response.body).unwrap_or(serde_json::Value::Null);
        self.last_response = Some(TestResponse {
            status: response.status.as_u16(),
            body,
        });
    }

    /// Body of the last response
    pub fn body(&self) -> &serde_json::Value {
        &self
            .last_response
            .as_ref()
            .expect("No response available")
            .body
    }
}
