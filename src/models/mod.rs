pub mod config;
pub mod generation;
pub mod notice;
pub mod upload;

pub use config::{AppConfig, BackendConfig, GenerationDefaults, PreviewConfig, UploadConfig};
pub use generation::{
    CreateFolderRequest, CreateFolderResponse, GenerationResponse, PatternData, PatternPreview,
    ResponseError, SavePatternRequest, SavePatternResponse, WireCell, WireId, WirePaletteEntry,
};
pub use notice::{Notice, NoticeKind};
pub use upload::{
    CanvasSize, CanvasSpec, FormError, GenerationForm, GenerationParams, ImageUpload,
};
