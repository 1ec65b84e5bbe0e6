pub mod backend;
pub mod pipeline;
pub mod preview_cache;
pub mod session;

pub use backend::{ClientError, HttpBackend, PatternBackend, SavedPattern};
pub use pipeline::{Operation, PipelineError, PreviewPipeline, PreviewReport};
pub use preview_cache::{CachedPreview, PreviewCache};
pub use session::{CurrentPattern, PreviewSession};
