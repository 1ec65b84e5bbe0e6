//! Thread palette: the deduplicated set of threads a pattern uses.

use std::collections::{BTreeSet, HashSet};

use crate::color::Rgb;
use crate::pattern::Pattern;

/// One thread in the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Manufacturer thread code
    pub id: String,
    /// Human-readable thread name
    pub name: String,
    pub rgb: Rgb,
}

impl PaletteEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rgb: Rgb) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rgb,
        }
    }
}

/// Ordered palette, unique by identifier.
///
/// Insertion order is kept; it is the order the legend is drawn in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Build a palette, keeping the first entry for each identifier.
    ///
    /// Returns the palette together with the identifiers that were dropped
    /// as duplicates, in input order.
    pub fn dedup(entries: impl IntoIterator<Item = PaletteEntry>) -> (Self, Vec<String>) {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut dropped = Vec::new();

        for entry in entries {
            if seen.insert(entry.id.clone()) {
                kept.push(entry);
            } else {
                dropped.push(entry.id);
            }
        }

        (Self { entries: kept }, dropped)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Compare palette identifiers against the identifiers cells reference.
    pub fn audit(&self, pattern: &Pattern) -> PaletteAudit {
        let referenced: BTreeSet<&str> = pattern
            .cells()
            .filter_map(|(_, _, cell)| cell.thread_id())
            .collect();

        let unreferenced = self
            .entries
            .iter()
            .filter(|e| !referenced.contains(e.id.as_str()))
            .map(|e| e.id.clone())
            .collect();

        let dangling = referenced
            .into_iter()
            .filter(|id| !self.contains(id))
            .map(str::to_string)
            .collect();

        PaletteAudit {
            unreferenced,
            dangling,
        }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Disagreements between a palette and the cells of its pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteAudit {
    /// Palette identifiers no cell references, in palette order
    pub unreferenced: Vec<String>,
    /// Cell identifiers missing from the palette, sorted
    pub dangling: Vec<String>,
}

impl PaletteAudit {
    pub fn is_clean(&self) -> bool {
        self.unreferenced.is_empty() && self.dangling.is_empty()
    }
}
