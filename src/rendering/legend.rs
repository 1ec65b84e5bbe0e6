use serde::Serialize;
use stitch_grid::{Palette, PatternStats, Rgb};
use utoipa::ToSchema;

use crate::error::RenderError;
use crate::models::PreviewConfig;
use crate::rendering::Surface;

/// One color chip in the legend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LegendChip {
    /// Thread identifier
    pub id: String,
    pub name: String,
    #[schema(value_type = Vec<u8>)]
    pub rgb: [u8; 3],
    /// `#rrggbb`
    pub hex: String,
    /// Hover text, `DMC <id> - <name>`
    pub title: String,
    /// Cells stitched with this thread
    pub stitches: usize,
}

/// Chip layout for the rasterized legend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwatchStyle {
    pub size: u32,
    pub columns: u32,
    pub gap: u32,
}

impl Default for SwatchStyle {
    fn default() -> Self {
        Self {
            size: 24,
            columns: 10,
            gap: 4,
        }
    }
}

impl SwatchStyle {
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            size: config.swatch_size.max(1),
            columns: config.swatch_columns.max(1),
            ..Default::default()
        }
    }
}

/// Color legend, one chip per palette entry in palette order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Legend {
    chips: Vec<LegendChip>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(palette: &Palette, stats: &PatternStats) -> Self {
        let mut legend = Self::new();
        legend.rebuild(palette, stats);
        legend
    }

    /// Replace all chips with the entries of `palette`.
    pub fn rebuild(&mut self, palette: &Palette, stats: &PatternStats) {
        self.chips = palette
            .iter()
            .map(|entry| LegendChip {
                id: entry.id.clone(),
                name: entry.name.clone(),
                rgb: entry.rgb.to_bytes(),
                hex: entry.rgb.to_hex(),
                title: format!("DMC {} - {}", entry.id, entry.name),
                stitches: stats.stitches_for(&entry.id),
            })
            .collect();
    }

    pub fn chips(&self) -> &[LegendChip] {
        &self.chips
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn clear(&mut self) {
        self.chips.clear();
    }

    /// Rasterize the chips as a grid with black outlines.
    pub fn render(&self, style: SwatchStyle) -> Result<Surface, RenderError> {
        let columns = style.columns.max(1);
        let count = self.chips.len() as u32;
        let used_columns = count.clamp(1, columns);
        let rows = count.div_ceil(columns).max(1);
        let extent = |cells: u32| {
            style
                .size
                .checked_add(style.gap)?
                .checked_mul(cells)?
                .checked_add(style.gap)
        };
        // saturated sizes are rejected by the surface limit
        let width = extent(used_columns).unwrap_or(u32::MAX);
        let height = extent(rows).unwrap_or(u32::MAX);

        let mut surface = Surface::new();
        surface.resize(width, height)?;
        surface.fill(Rgb::WHITE);

        let pitch = style.size + style.gap;
        let size = style.size as f32;
        for (i, chip) in self.chips.iter().enumerate() {
            let i = i as u32;
            let x = (style.gap + (i % columns) * pitch) as f32;
            let y = (style.gap + (i / columns) * pitch) as f32;
            surface.fill_rect(x, y, size, size, Rgb::from_bytes(chip.rgb));
            surface.stroke_rect(x, y, size, size, Rgb::BLACK, 1.0);
        }

        tracing::debug!(chips = count, rows, "Rendered legend");
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_grid::{Cell, PaletteEntry, Pattern, ThreadRef};

    fn sample() -> (Palette, PatternStats) {
        let black = Cell::new(Rgb::BLACK).with_thread(ThreadRef::new("310", "Black"));
        let pattern = Pattern::new(vec![vec![black.clone(), black, Cell::new(Rgb::WHITE)]]).unwrap();
        let (palette, _) = Palette::dedup(vec![
            PaletteEntry::new("310", "Black", Rgb::BLACK),
            PaletteEntry::new("B5200", "Snow White", Rgb::WHITE),
        ]);
        let stats = PatternStats::compute(&pattern, &palette);
        (palette, stats)
    }

    #[test]
    fn test_chips_follow_palette_order() {
        let (palette, stats) = sample();
        let legend = Legend::build(&palette, &stats);

        assert_eq!(legend.len(), 2);
        let chips = legend.chips();
        assert_eq!(chips[0].title, "DMC 310 - Black");
        assert_eq!(chips[0].stitches, 2);
        assert_eq!(chips[0].hex, "#000000");
        assert_eq!(chips[1].title, "DMC B5200 - Snow White");
        assert_eq!(chips[1].stitches, 0);
    }

    #[test]
    fn test_rebuild_replaces_chips() {
        let (palette, stats) = sample();
        let mut legend = Legend::build(&palette, &stats);
        legend.rebuild(&Palette::default(), &stats);
        assert!(legend.is_empty());
    }

    #[test]
    fn test_render_strip() {
        let (palette, stats) = sample();
        let legend = Legend::build(&palette, &stats);
        let style = SwatchStyle {
            size: 10,
            columns: 1,
            gap: 2,
        };
        let surface = legend.render(style).unwrap();

        assert_eq!((surface.width(), surface.height()), (14, 26));
        // chip interior
        assert_eq!(surface.pixel(7, 7), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(7, 19), Some([255, 255, 255, 255]));
        // gap stays white
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_oversized_swatches_fail_cleanly() {
        let (palette, stats) = sample();
        let legend = Legend::build(&palette, &stats);
        let style = SwatchStyle {
            size: u32::MAX,
            columns: 10,
            gap: 4,
        };
        assert!(matches!(
            legend.render(style),
            Err(RenderError::PixmapAllocation { .. })
        ));

        // two chips side by side exceed the surface limit
        let style = SwatchStyle {
            size: 9_000,
            columns: 10,
            gap: 4,
        };
        assert!(matches!(
            legend.render(style),
            Err(RenderError::PixmapAllocation { .. })
        ));
    }

    #[test]
    fn test_render_empty_legend() {
        let surface = Legend::new().render(SwatchStyle::default()).unwrap();
        assert_eq!((surface.width(), surface.height()), (32, 32));
    }
}
