//! stitch-grid: stitch charts, thread palettes and preview geometry
//!
//! This crate holds the domain types shared by the preview renderer, the
//! boundary decoder and the preview service. It has no dependencies.
//!
//! # Quick Start
//!
//! ```
//! use stitch_grid::{Cell, Palette, PaletteEntry, Pattern, PatternStats, PreviewLayout, Rgb};
//!
//! let red = Cell::new(Rgb::new(255, 0, 0));
//! let blue = Cell::new(Rgb::new(0, 0, 255));
//! let pattern = Pattern::new(vec![
//!     vec![red.clone(), red.clone(), red.clone()],
//!     vec![red.clone(), blue, red],
//! ])
//! .unwrap();
//!
//! let (palette, _) = Palette::dedup(vec![
//!     PaletteEntry::new("666", "Bright Red", Rgb::new(255, 0, 0)),
//!     PaletteEntry::new("820", "Very Dark Royal Blue", Rgb::new(0, 0, 255)),
//! ]);
//!
//! let layout = PreviewLayout::fit(&pattern, 300.0).unwrap();
//! assert_eq!(layout.cell_size, 100.0);
//! assert_eq!((layout.pixel_width(), layout.pixel_height()), (300, 200));
//!
//! let stats = PatternStats::compute(&pattern, &palette);
//! assert_eq!(stats.total_stitches, 6);
//! assert_eq!(stats.distinct_colors, 2);
//! ```
//!
//! # Invariants
//!
//! - A [`Pattern`] always has at least one row and one column, and every
//!   row has the same length. Empty and ragged grids are rejected by
//!   [`Pattern::new`] with a [`PatternError`].
//! - A [`Palette`] is unique by thread identifier and keeps insertion
//!   order.
//! - [`PreviewLayout`] maps the longer side of the grid exactly onto the
//!   target dimension.

pub mod color;
pub mod layout;
pub mod palette;
pub mod pattern;
pub mod stats;

#[cfg(test)]
mod domain_tests;

pub use color::{ParseColorError, Rgb};
pub use layout::PreviewLayout;
pub use palette::{Palette, PaletteAudit, PaletteEntry};
pub use pattern::{Cell, Pattern, PatternError, ThreadRef};
pub use stats::PatternStats;
