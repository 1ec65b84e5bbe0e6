pub mod preview;

pub use preview::{__path_handle_preview, __path_handle_preview_image};
pub use preview::{handle_preview, handle_preview_image, PreviewJsonResponse, PreviewQuery};
