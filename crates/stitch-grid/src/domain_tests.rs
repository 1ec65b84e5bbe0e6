//! Property-style regression tests for preview geometry and statistics.
//!
//! Each test sweeps many grid shapes instead of checking a single case.

use crate::color::Rgb;
use crate::layout::PreviewLayout;
use crate::palette::{Palette, PaletteEntry};
use crate::pattern::{Cell, Pattern, ThreadRef};
use crate::stats::PatternStats;

const SHAPES: &[(usize, usize)] = &[
    (1, 1),
    (1, 7),
    (7, 1),
    (2, 3),
    (3, 2),
    (10, 10),
    (13, 29),
    (100, 37),
    (250, 400),
];

const TARGETS: &[f32] = &[1.0, 37.5, 100.0, 300.0, 400.0, 1024.0];

/// If this breaks, the longer side no longer lands on the target, so the
/// preview box would be over- or under-filled.
#[test]
fn test_longest_side_matches_target() {
    for &(rows, cols) in SHAPES {
        for &target in TARGETS {
            let layout = PreviewLayout::for_grid(rows, cols, target).unwrap();
            let longest = rows.max(cols) as f32;
            assert!(
                (layout.cell_size * longest - target).abs() <= target * 1e-5,
                "{rows}x{cols} @ {target}: cell {} * {longest} != {target}",
                layout.cell_size
            );
        }
    }
}

/// If this breaks, previews get stretched: height/width must equal
/// rows/cols up to one cell of rounding.
#[test]
fn test_aspect_ratio_preserved() {
    for &(rows, cols) in SHAPES {
        for &target in &[100.0f32, 400.0, 1024.0] {
            let layout = PreviewLayout::for_grid(rows, cols, target).unwrap();
            let w = layout.pixel_width() as f32;
            let h = layout.pixel_height() as f32;
            let expected_h = w * rows as f32 / cols as f32;
            assert!(
                (h - expected_h).abs() <= layout.cell_size.max(1.0),
                "{rows}x{cols} @ {target}: surface {w}x{h}, expected height ~{expected_h}"
            );
        }
    }
}

/// If this breaks, the stitch count shown to the user is wrong.
#[test]
fn test_total_stitches_is_rows_times_cols() {
    let (palette, _) = Palette::dedup(vec![PaletteEntry::new("310", "Black", Rgb::BLACK)]);
    for &(rows, cols) in SHAPES {
        let pattern = Pattern::filled(rows, cols, Rgb::BLACK).unwrap();
        let stats = PatternStats::compute(&pattern, &palette);
        assert_eq!(stats.total_stitches, rows * cols);
        assert_eq!(stats.rows, rows);
        assert_eq!(stats.cols, cols);
    }
}

/// If this breaks, the color count is being derived from cell RGB values
/// instead of the supplied palette.
#[test]
fn test_distinct_colors_ignores_repeated_cell_colors() {
    let thread = ThreadRef::new("666", "Bright Red");
    let cell = Cell::new(Rgb::new(255, 0, 0)).with_thread(thread);
    let pattern = Pattern::new(vec![vec![cell; 40]; 40]).unwrap();

    for n in 1..6 {
        let entries = (0..n).map(|i| PaletteEntry::new(format!("{i}"), "x", Rgb::new(255, 0, 0)));
        let (palette, _) = Palette::dedup(entries);
        let stats = PatternStats::compute(&pattern, &palette);
        assert_eq!(stats.distinct_colors, n);
    }
}
