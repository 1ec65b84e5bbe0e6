//! Mock pattern generation server.

use wiremock::{
    matchers::{body_partial_json, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

use stitchview::models::BackendConfig;
use stitchview::services::HttpBackend;

/// Wrapper around wiremock MockServer with the generation server's endpoints
pub struct MockBackend {
    pub server: MockServer,
}

impl MockBackend {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// HTTP client pointed at this server
    pub fn client(&self) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: self.url(),
            timeout_secs: 5,
        })
        .expect("Failed to build client")
    }

    /// Mock `POST /upload` answering with `body`
    pub async fn mock_upload(&self, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock `POST /upload` failing with a status and plain-text body
    pub async fn mock_upload_status(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mock `POST /save_pattern` for a request carrying `name`
    pub async fn mock_save(&self, name: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/save_pattern"))
            .and(body_partial_json(serde_json::json!({ "name": name })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock `POST /create_folder` for a request carrying `name`
    pub async fn mock_create_folder(&self, name: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/create_folder"))
            .and(body_partial_json(serde_json::json!({ "name": name })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Requests received so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
