//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use stitchview::models::AppConfig;
use stitchview::server::{build_router, create_app_state};
use stitchview::services::PreviewCache;

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub previews: Arc<PreviewCache>,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = create_app_state(config).expect("Failed to create app state");

        // Keep references for test assertions
        let previews = state.previews.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self { router, previews }
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .header("Host", "localhost:3000")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// POST a generation response to the preview endpoint
    pub async fn post_preview(&self, body: &serde_json::Value) -> TestResponse {
        self.post_json("/api/preview", &body.to_string()).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Render a preview and return the image path from its URL
    pub async fn render_preview(&self, body: &serde_json::Value) -> String {
        let response = self.post_preview(body).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        let json: serde_json::Value = response.json();
        let url = json["image_url"].as_str().unwrap();
        url.strip_prefix("http://localhost:3000")
            .expect("image_url should use the request host")
            .to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }

    /// Width and height from the PNG header
    pub fn png_size(&self) -> (u32, u32) {
        assert!(self.is_png(), "not a PNG");
        let width = u32::from_be_bytes(self.body[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(self.body[20..24].try_into().unwrap());
        (width, height)
    }
}
