use chrono::{DateTime, Utc};
use stitch_grid::{PatternStats, PreviewLayout};

use crate::error::RenderError;
use crate::models::PatternPreview;
use crate::rendering::{Legend, PreviewRenderer, Surface};

/// The pattern currently on screen
#[derive(Debug, Clone)]
pub struct CurrentPattern {
    pub preview: PatternPreview,
    pub stats: PatternStats,
    pub layout: PreviewLayout,
    pub received_at: DateTime<Utc>,
}

/// Holds at most one pattern together with its rendered surface and legend.
///
/// Every successful [`PreviewSession::replace`] overwrites the previous
/// pattern. A failed replace leaves everything as it was.
pub struct PreviewSession {
    renderer: PreviewRenderer,
    surface: Surface,
    legend: Legend,
    current: Option<CurrentPattern>,
}

impl PreviewSession {
    pub fn new(renderer: PreviewRenderer) -> Self {
        Self {
            renderer,
            surface: Surface::new(),
            legend: Legend::new(),
            current: None,
        }
    }

    pub fn renderer(&self) -> &PreviewRenderer {
        &self.renderer
    }

    /// Change the preview box size used by later renders.
    pub fn set_target(&mut self, target: f32) -> Result<(), RenderError> {
        self.renderer = self.renderer.with_target(target)?;
        Ok(())
    }

    /// Render `preview` and make it the current pattern.
    pub fn replace(&mut self, preview: PatternPreview) -> Result<&CurrentPattern, RenderError> {
        self.replace_at(preview, Utc::now())
    }

    pub fn replace_at(
        &mut self,
        preview: PatternPreview,
        received_at: DateTime<Utc>,
    ) -> Result<&CurrentPattern, RenderError> {
        let outcome = self
            .renderer
            .render(&preview.pattern, &preview.palette, &mut self.surface)?;
        self.legend.rebuild(&preview.palette, &outcome.stats);

        tracing::info!(
            rows = outcome.stats.rows,
            cols = outcome.stats.cols,
            colors = outcome.stats.distinct_colors,
            "Preview replaced"
        );

        Ok(self.current.insert(CurrentPattern {
            preview,
            stats: outcome.stats,
            layout: outcome.layout,
            received_at,
        }))
    }

    pub fn current(&self) -> Option<&CurrentPattern> {
        self.current.as_ref()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// Forget the current pattern and blank the preview.
    pub fn clear(&mut self) {
        self.current = None;
        self.surface.reset();
        self.legend.clear();
    }

    /// PNG of the current preview, `None` when nothing is shown.
    pub fn export_png(&self) -> Option<Result<Vec<u8>, RenderError>> {
        self.current.as_ref()?;
        Some(self.surface.encode_png())
    }

    /// Data URL of the current preview, `None` when nothing is shown.
    pub fn export_data_url(&self) -> Option<Result<String, RenderError>> {
        self.current.as_ref()?;
        Some(self.surface.to_data_url())
    }
}
