use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    BackendConfig, CreateFolderRequest, CreateFolderResponse, GenerationParams,
    GenerationResponse, ImageUpload, SavePatternRequest, SavePatternResponse,
};

/// Where the browser is sent after a successful save, unless the server says otherwise
pub const DEFAULT_REDIRECT: &str = "/gallery";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Malformed(String),
}

/// Pattern saved on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPattern {
    pub pattern_id: Option<String>,
    pub redirect: String,
}

/// The pattern generation server's endpoints
#[async_trait]
pub trait PatternBackend: Send + Sync {
    /// Upload an image and receive the generated pattern response as-is.
    async fn generate(
        &self,
        upload: &ImageUpload,
        params: &GenerationParams,
    ) -> Result<GenerationResponse, ClientError>;

    async fn save_pattern(&self, request: &SavePatternRequest) -> Result<SavedPattern, ClientError>;

    /// Create a folder and return its identifier.
    async fn create_folder(&self, name: &str) -> Result<String, ClientError>;
}

/// [`PatternBackend`] over HTTP
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Read a JSON body, tolerating error statuses that still carry JSON.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ClientError::Status {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&body).trim().to_string(),
        }),
        Err(e) => Err(ClientError::Malformed(e.to_string())),
    }
}

fn rejection(error: Option<String>, fallback: &str) -> ClientError {
    ClientError::Rejected(
        error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    )
}

#[async_trait]
impl PatternBackend for HttpBackend {
    async fn generate(
        &self,
        upload: &ImageUpload,
        params: &GenerationParams,
    ) -> Result<GenerationResponse, ClientError> {
        let image = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime_type())?;
        let form = Form::new()
            .part("image", image)
            .text("mesh_count", params.mesh_count.to_string())
            .text("canvas_size", params.canvas.to_string())
            .text("max_colors", params.max_colors.to_string());

        tracing::debug!(
            file = %upload.file_name,
            size = %upload.size_label(),
            mesh_count = params.mesh_count,
            canvas = %params.canvas,
            max_colors = params.max_colors,
            "Requesting pattern generation"
        );

        let response = self.client.post(self.url("/upload")).multipart(form).send().await?;
        let body: GenerationResponse = read_json(response).await?;
        tracing::info!(success = ?body.success, "Generation response received");
        Ok(body)
    }

    async fn save_pattern(&self, request: &SavePatternRequest) -> Result<SavedPattern, ClientError> {
        let response = self
            .client
            .post(self.url("/save_pattern"))
            .json(request)
            .send()
            .await?;
        let body: SavePatternResponse = read_json(response).await?;

        if body.success != Some(true) || body.error.is_some() {
            return Err(rejection(body.error, "Failed to save pattern"));
        }

        let saved = SavedPattern {
            pattern_id: body.pattern_id.map(|id| id.normalize()),
            redirect: body
                .redirect
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_REDIRECT.to_string()),
        };
        tracing::info!(name = %request.name, pattern_id = ?saved.pattern_id, "Pattern saved");
        Ok(saved)
    }

    async fn create_folder(&self, name: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/create_folder"))
            .json(&CreateFolderRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        let body: CreateFolderResponse = read_json(response).await?;

        if body.success != Some(true) || body.error.is_some() {
            return Err(rejection(body.error, "Failed to create folder"));
        }

        let folder_id = body
            .folder_id
            .map(|id| id.normalize())
            .ok_or_else(|| ClientError::Malformed("missing folder_id".to_string()))?;
        tracing::info!(name = %name, folder_id = %folder_id, "Folder created");
        Ok(folder_id)
    }
}
