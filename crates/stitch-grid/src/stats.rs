//! Summary statistics shown next to a preview.

use std::collections::HashMap;

use crate::palette::Palette;
use crate::pattern::Pattern;

/// Counts derived from a pattern and its palette.
///
/// Always computed fresh from the pattern being shown; nothing here is
/// carried over between renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternStats {
    pub rows: usize,
    pub cols: usize,
    /// `rows * cols`
    pub total_stitches: usize,
    /// Number of palette entries, not the number of distinct cell colors
    pub distinct_colors: usize,
    usage: HashMap<String, usize>,
}

impl PatternStats {
    pub fn compute(pattern: &Pattern, palette: &Palette) -> Self {
        let mut usage: HashMap<String, usize> = HashMap::new();
        for (_, _, cell) in pattern.cells() {
            if let Some(id) = cell.thread_id() {
                *usage.entry(id.to_string()).or_default() += 1;
            }
        }

        Self {
            rows: pattern.row_count(),
            cols: pattern.col_count(),
            total_stitches: pattern.row_count() * pattern.col_count(),
            distinct_colors: palette.len(),
            usage,
        }
    }

    /// Number of cells stitched with the given thread.
    pub fn stitches_for(&self, id: &str) -> usize {
        self.usage.get(id).copied().unwrap_or(0)
    }

    /// Cells that carry no thread reference at all.
    pub fn unthreaded(&self) -> usize {
        self.total_stitches - self.usage.values().sum::<usize>()
    }
}
