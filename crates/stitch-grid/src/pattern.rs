//! Rectangular stitch grid.
//!
//! A [`Pattern`] can only be built through [`Pattern::new`], which rejects
//! empty and ragged input. Everything downstream (layout, statistics,
//! rendering) may therefore assume at least one row, at least one column
//! and equal row lengths.

use std::fmt;

use crate::color::Rgb;

/// Thread assigned to a stitch position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadRef {
    /// Manufacturer thread code (e.g. DMC `310`)
    pub id: String,
    /// Human-readable thread name
    pub name: String,
}

impl ThreadRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One stitch position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Display color; the only field rendering needs
    pub rgb: Rgb,
    /// Palette entry this stitch uses, when the generator supplied one
    pub thread: Option<ThreadRef>,
    /// Chart symbol for printed keys
    pub symbol: Option<char>,
}

impl Cell {
    /// A bare colored cell without a thread reference.
    pub fn new(rgb: Rgb) -> Self {
        Self {
            rgb,
            thread: None,
            symbol: None,
        }
    }

    pub fn with_thread(mut self, thread: ThreadRef) -> Self {
        self.thread = Some(thread);
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Thread identifier, if any.
    pub fn thread_id(&self) -> Option<&str> {
        self.thread.as_ref().map(|t| t.id.as_str())
    }
}

/// Error for grids that cannot be previewed.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    /// The grid has no rows
    NoRows,
    /// The first row has no cells
    EmptyRow,
    /// A row's length differs from the first row's
    Ragged {
        /// Zero-based index of the offending row
        row: usize,
        /// Length of the first row
        expected: usize,
        /// Length of the offending row
        found: usize,
    },
    /// Target preview dimension is not a positive finite number
    InvalidTarget(f32),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::NoRows => write!(f, "invalid pattern: no rows"),
            PatternError::EmptyRow => write!(f, "invalid pattern: first row is empty"),
            PatternError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "invalid pattern: row {} has {} cells, expected {}",
                row, found, expected
            ),
            PatternError::InvalidTarget(target) => {
                write!(f, "invalid pattern: target dimension {} is not positive", target)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Validated, rectangular grid of cells in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    rows: Vec<Vec<Cell>>,
    cols: usize,
}

impl Pattern {
    /// Validate and wrap a grid.
    ///
    /// # Errors
    ///
    /// - [`PatternError::NoRows`] for an empty grid
    /// - [`PatternError::EmptyRow`] when the first row has no cells
    /// - [`PatternError::Ragged`] for the first row whose length differs
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self, PatternError> {
        let first = rows.first().ok_or(PatternError::NoRows)?;
        let cols = first.len();
        if cols == 0 {
            return Err(PatternError::EmptyRow);
        }

        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(PatternError::Ragged {
                row,
                expected: cols,
                found: r.len(),
            });
        }

        Ok(Self { rows, cols })
    }

    /// Grid of a single color, mostly useful in tests and examples.
    pub fn filled(rows: usize, cols: usize, rgb: Rgb) -> Result<Self, PatternError> {
        Self::new(vec![vec![Cell::new(rgb); cols]; rows])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// The longer side, in cells.
    pub fn longest_side(&self) -> usize {
        self.row_count().max(self.col_count())
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Every cell with its `(row, col)` position, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, cell)| (y, x, cell)))
    }
}
