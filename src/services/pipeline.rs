//! Generate, save and folder workflows as plain sequential steps.
//!
//! Each step returns a `Result`; the first failure stops the workflow and is
//! turned into a user-facing [`Notice`] by [`PipelineError::to_notice`].

use stitch_grid::{PaletteAudit, PatternStats, PreviewLayout};
use thiserror::Error;

use crate::error::RenderError;
use crate::models::generation::DEFAULT_REJECTION;
use crate::models::upload::{validate_folder_name, validate_pattern_name};
use crate::models::{
    FormError, GenerationParams, ImageUpload, Notice, ResponseError, SavePatternRequest, WireId,
};
use crate::rendering::LegendChip;
use crate::services::backend::{ClientError, PatternBackend, SavedPattern};
use crate::services::session::PreviewSession;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("No pattern to save")]
    NothingToSave,

    #[error("No pattern to download")]
    NothingToDownload,
}

/// Workflow a failure happened in, which decides its fallback wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Save,
    CreateFolder,
    Download,
}

impl Operation {
    /// Shown when the server refused without giving a reason
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Generate => DEFAULT_REJECTION,
            Operation::Save => "Failed to save pattern",
            Operation::CreateFolder => "Failed to create folder",
            Operation::Download => "No pattern to download",
        }
    }

    /// Shown when the request never produced a usable answer
    pub fn transport_message(self) -> &'static str {
        match self {
            Operation::Generate => "An error occurred while creating the pattern",
            Operation::Save => "An error occurred while saving the pattern",
            Operation::CreateFolder => "An error occurred while creating the folder",
            Operation::Download => "An error occurred while exporting the pattern",
        }
    }
}

impl PipelineError {
    pub fn to_notice(&self, operation: Operation) -> Notice {
        let message = match self {
            PipelineError::Form(e) => e.to_string(),
            PipelineError::NothingToSave | PipelineError::NothingToDownload => self.to_string(),
            PipelineError::Client(ClientError::Rejected(m))
            | PipelineError::Response(ResponseError::Rejected(m)) => m.clone(),
            PipelineError::Response(_) => operation.failure_message().to_string(),
            PipelineError::Client(_) | PipelineError::Render(_) => {
                operation.transport_message().to_string()
            }
        };
        Notice::error(message)
    }
}

/// Everything shown after a successful generation
#[derive(Debug, Clone)]
pub struct PreviewReport {
    pub stats: PatternStats,
    pub layout: PreviewLayout,
    pub legend: Vec<LegendChip>,
    pub audit: PaletteAudit,
    pub canvas_size: Option<String>,
    pub mesh_count: Option<u32>,
    pub max_colors: Option<u32>,
    pub source_image: Option<String>,
    pub notice: Notice,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: SavedPattern,
    pub notice: Notice,
}

/// Result of a successful folder creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub folder_id: String,
    pub notice: Notice,
}

/// Drives one preview session against a pattern backend.
pub struct PreviewPipeline<B: PatternBackend> {
    backend: B,
    session: PreviewSession,
}

impl<B: PatternBackend> PreviewPipeline<B> {
    pub fn new(backend: B, session: PreviewSession) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &PreviewSession {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Upload → validate → render → report.
    ///
    /// The session is only touched once the response has been validated.
    pub async fn generate(
        &mut self,
        upload: &ImageUpload,
        params: &GenerationParams,
    ) -> Result<PreviewReport, PipelineError> {
        let response = self.backend.generate(upload, params).await.inspect_err(|e| {
            tracing::error!(error = %e, file = %upload.file_name, "Pattern generation failed");
        })?;
        let preview = response.into_preview().inspect_err(|e| {
            tracing::warn!(error = %e, "Generation response not usable");
        })?;

        let current = self.session.replace(preview)?;
        let stats = current.stats.clone();
        let layout = current.layout;
        let audit = current.preview.audit.clone();
        let canvas_size = current.preview.canvas_size.clone();
        let mesh_count = current.preview.mesh_count;
        let max_colors = current.preview.max_colors;
        let source_image = current.preview.source_image.clone();

        let notice = Notice::success(format!(
            "Pattern created: {} x {} stitches, {} colors",
            stats.cols, stats.rows, stats.distinct_colors
        ));
        Ok(PreviewReport {
            legend: self.session.legend().chips().to_vec(),
            stats,
            layout,
            audit,
            canvas_size,
            mesh_count,
            max_colors,
            source_image,
            notice,
        })
    }

    /// Save the current pattern under `name`, optionally into a folder.
    pub async fn save(
        &self,
        name: &str,
        folder_id: Option<&str>,
    ) -> Result<SaveReport, PipelineError> {
        let current = self.session.current().ok_or(PipelineError::NothingToSave)?;
        let name = validate_pattern_name(name)?;

        let request = SavePatternRequest::from_preview(
            name,
            folder_id.map(WireId::from_normalized),
            &current.preview,
        );
        let saved = self.backend.save_pattern(&request).await.inspect_err(|e| {
            tracing::error!(error = %e, name = %name, "Saving pattern failed");
        })?;

        Ok(SaveReport {
            saved,
            notice: Notice::success("Pattern saved successfully!"),
        })
    }

    pub async fn create_folder(&self, name: &str) -> Result<FolderReport, PipelineError> {
        let name = validate_folder_name(name)?;
        let folder_id = self.backend.create_folder(name).await.inspect_err(|e| {
            tracing::error!(error = %e, name = %name, "Creating folder failed");
        })?;

        Ok(FolderReport {
            folder_id,
            notice: Notice::success("Folder created successfully"),
        })
    }

    /// PNG bytes of the current preview.
    pub fn download(&self) -> Result<Vec<u8>, PipelineError> {
        let png = self
            .session
            .export_png()
            .ok_or(PipelineError::NothingToDownload)??;
        Ok(png)
    }
}
