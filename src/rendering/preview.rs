use stitch_grid::{Palette, Pattern, PatternError, PatternStats, PreviewLayout, Rgb};

use crate::error::RenderError;
use crate::models::PreviewConfig;
use crate::rendering::Surface;

/// Grid line appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStyle {
    pub grid_color: Rgb,
    pub grid_width: f32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            grid_color: Rgb::new(0xdd, 0xdd, 0xdd),
            grid_width: 0.5,
        }
    }
}

/// Geometry and statistics of one render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub layout: PreviewLayout,
    pub stats: PatternStats,
}

/// Encoded preview produced without a caller-owned surface
#[derive(Debug, Clone)]
pub struct RenderedPreview {
    pub png: Vec<u8>,
    pub layout: PreviewLayout,
    pub stats: PatternStats,
}

/// Draws a pattern as a grid of filled, outlined squares.
///
/// The longer side of the pattern is scaled to the target dimension. Each
/// render resizes and clears the surface first, so nothing from a previous
/// pattern survives.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    target: f32,
    style: PreviewStyle,
}

impl PreviewRenderer {
    pub fn new(target: f32, style: PreviewStyle) -> Result<Self, RenderError> {
        check_target(target)?;
        Ok(Self { target, style })
    }

    pub fn from_config(config: &PreviewConfig) -> Result<Self, RenderError> {
        Self::new(
            config.target_dimension,
            PreviewStyle {
                grid_color: config.grid_color,
                grid_width: config.grid_width,
            },
        )
    }

    /// Same style, different target dimension.
    pub fn with_target(&self, target: f32) -> Result<Self, RenderError> {
        Self::new(target, self.style)
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn style(&self) -> PreviewStyle {
        self.style
    }

    /// Render at the configured target dimension.
    pub fn render(
        &self,
        pattern: &Pattern,
        palette: &Palette,
        surface: &mut Surface,
    ) -> Result<RenderOutcome, RenderError> {
        self.render_at(pattern, palette, surface, self.target)
    }

    /// Render with the longer side scaled to `target`.
    ///
    /// All validation happens before the surface is touched.
    pub fn render_at(
        &self,
        pattern: &Pattern,
        palette: &Palette,
        surface: &mut Surface,
        target: f32,
    ) -> Result<RenderOutcome, RenderError> {
        let layout = PreviewLayout::fit(pattern, target)?;
        surface.resize(layout.pixel_width(), layout.pixel_height())?;

        let size = layout.cell_size;
        for (row, col, cell) in pattern.cells() {
            let (x, y) = layout.cell_origin(row, col);
            surface.fill_rect(x, y, size, size, cell.rgb);
            surface.stroke_rect(x, y, size, size, self.style.grid_color, self.style.grid_width);
        }

        let stats = PatternStats::compute(pattern, palette);
        tracing::debug!(
            rows = stats.rows,
            cols = stats.cols,
            cell_size = layout.cell_size,
            width = surface.width(),
            height = surface.height(),
            "Rendered preview"
        );

        Ok(RenderOutcome { layout, stats })
    }

    /// Render onto a fresh surface and encode it as PNG.
    pub fn render_png(
        &self,
        pattern: &Pattern,
        palette: &Palette,
        target: Option<f32>,
    ) -> Result<RenderedPreview, RenderError> {
        let mut surface = Surface::new();
        let outcome = self.render_at(pattern, palette, &mut surface, target.unwrap_or(self.target))?;
        Ok(RenderedPreview {
            png: surface.encode_png()?,
            layout: outcome.layout,
            stats: outcome.stats,
        })
    }
}

fn check_target(target: f32) -> Result<(), RenderError> {
    if !target.is_finite() || target <= 0.0 {
        return Err(PatternError::InvalidTarget(target).into());
    }
    Ok(())
}
