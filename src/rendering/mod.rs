mod legend;
mod preview;
mod surface;

pub use legend::{Legend, LegendChip, SwatchStyle};
pub use preview::{PreviewRenderer, PreviewStyle, RenderOutcome, RenderedPreview};
pub use surface::{Surface, MAX_SURFACE_DIMENSION, PNG_DATA_URL_PREFIX};
