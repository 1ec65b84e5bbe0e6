//! Fitting a pattern into a square preview box.

use crate::pattern::{Pattern, PatternError};

/// Geometry of a preview.
///
/// The longer side of the pattern maps exactly onto the target dimension;
/// the other side uses the same per-cell size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewLayout {
    /// Edge length of one stitch, in surface units
    pub cell_size: f32,
    /// `cols * cell_size`
    pub width: f32,
    /// `rows * cell_size`
    pub height: f32,
}

impl PreviewLayout {
    /// Fit `pattern` into a `target` × `target` box.
    ///
    /// # Errors
    ///
    /// [`PatternError::InvalidTarget`] if `target` is zero, negative or not
    /// finite.
    pub fn fit(pattern: &Pattern, target: f32) -> Result<Self, PatternError> {
        Self::for_grid(pattern.row_count(), pattern.col_count(), target)
    }

    /// Same as [`PreviewLayout::fit`] for raw dimensions.
    pub fn for_grid(rows: usize, cols: usize, target: f32) -> Result<Self, PatternError> {
        if !target.is_finite() || target <= 0.0 {
            return Err(PatternError::InvalidTarget(target));
        }
        if rows == 0 {
            return Err(PatternError::NoRows);
        }
        if cols == 0 {
            return Err(PatternError::EmptyRow);
        }

        let cell_size = target / rows.max(cols) as f32;
        Ok(Self {
            cell_size,
            width: cols as f32 * cell_size,
            height: rows as f32 * cell_size,
        })
    }

    /// Integer surface width, never below one pixel.
    pub fn pixel_width(&self) -> u32 {
        (self.width.round() as u32).max(1)
    }

    /// Integer surface height, never below one pixel.
    pub fn pixel_height(&self) -> u32 {
        (self.height.round() as u32).max(1)
    }

    /// Top-left corner of the cell at `(row, col)`.
    pub fn cell_origin(&self, row: usize, col: usize) -> (f32, f32) {
        (col as f32 * self.cell_size, row as f32 * self.cell_size)
    }
}
