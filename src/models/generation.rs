//! Wire format of the pattern generation server and its conversion into
//! validated domain values.
//!
//! Nothing outside this module sees raw JSON: [`GenerationResponse::into_preview`]
//! is the single place where untrusted data becomes a [`Pattern`] and a
//! [`Palette`].

use serde::{Deserialize, Serialize};
use stitch_grid::{Cell, Palette, PaletteAudit, PaletteEntry, Pattern, PatternError, Rgb, ThreadRef};
use thiserror::Error;
use utoipa::ToSchema;

/// Message used when the server rejects a request without saying why
pub const DEFAULT_REJECTION: &str = "Failed to create pattern";

/// Errors converting a generation response into a previewable pattern
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResponseError {
    #[error("{0}")]
    Rejected(String),

    #[error("Malformed generation response: {0}")]
    Malformed(String),

    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// Thread identifier as sent by the server: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    /// Canonical string form; `310` and `"310"` are the same thread.
    pub fn normalize(&self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s.trim().to_string(),
        }
    }

    /// Inverse of [`WireId::normalize`]: numeric strings go back out as numbers.
    pub fn from_normalized(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) if n.to_string() == id => WireId::Number(n),
            _ => WireId::Text(id.to_string()),
        }
    }
}

/// One stitch as sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WireCell {
    #[serde(alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub dmc: Option<WireId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `[r, g, b]`, each 0-255
    pub rgb: Vec<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl WireCell {
    fn to_cell(&self, row: usize, col: usize) -> Result<Cell, ResponseError> {
        let rgb = parse_rgb(&self.rgb)
            .ok_or_else(|| ResponseError::Malformed(format!("cell ({row}, {col}) has invalid rgb {:?}", self.rgb)))?;

        let mut cell = Cell::new(rgb);
        if let Some(id) = &self.dmc {
            let id = id.normalize();
            let name = self.name.clone().unwrap_or_else(|| id.clone());
            cell = cell.with_thread(ThreadRef::new(id, name));
        }
        if let Some(symbol) = self.symbol.as_deref().and_then(|s| s.chars().next()) {
            cell = cell.with_symbol(symbol);
        }
        Ok(cell)
    }

    fn from_cell(cell: &Cell) -> Self {
        Self {
            dmc: cell.thread_id().map(WireId::from_normalized),
            name: cell.thread.as_ref().map(|t| t.name.clone()),
            rgb: cell.rgb.to_bytes().iter().map(|&c| i64::from(c)).collect(),
            symbol: cell.symbol.map(String::from),
        }
    }
}

/// Palette entry: a full object, or just the thread identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum WirePaletteEntry {
    Full {
        #[serde(alias = "id")]
        dmc: WireId,
        #[serde(default)]
        name: String,
        rgb: Vec<i64>,
    },
    Bare(WireId),
}

impl WirePaletteEntry {
    fn resolve(&self, pattern: &Pattern) -> Result<PaletteEntry, ResponseError> {
        match self {
            WirePaletteEntry::Full { dmc, name, rgb } => {
                let id = dmc.normalize();
                let rgb = parse_rgb(rgb).ok_or_else(|| {
                    ResponseError::Malformed(format!("palette entry {id} has invalid rgb {rgb:?}"))
                })?;
                Ok(PaletteEntry::new(id, name.clone(), rgb))
            }
            WirePaletteEntry::Bare(dmc) => {
                let id = dmc.normalize();
                pattern
                    .cells()
                    .find_map(|(_, _, cell)| {
                        cell.thread
                            .as_ref()
                            .filter(|t| t.id == id)
                            .map(|t| PaletteEntry::new(t.id.clone(), t.name.clone(), cell.rgb))
                    })
                    .ok_or_else(|| {
                        ResponseError::Malformed(format!("palette entry {id} is not used by any cell"))
                    })
            }
        }
    }
}

fn parse_rgb(components: &[i64]) -> Option<Rgb> {
    match components {
        [r, g, b] => Rgb::from_components(*r, *g, *b),
        _ => None,
    }
}

/// Grid and palette produced by the generation server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatternData {
    pub pattern: Vec<Vec<WireCell>>,

    #[serde(default)]
    pub colors_used: Vec<WirePaletteEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub symbol_map: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_count: Option<u32>,
}

impl PatternData {
    /// Wire form of a validated preview, used when saving it back.
    ///
    /// Cells are rebuilt from the typed grid; the palette and symbol map
    /// go back exactly as the server sent them.
    pub fn from_preview(preview: &PatternPreview) -> Self {
        let pattern = &preview.pattern;
        Self {
            pattern: pattern
                .rows()
                .iter()
                .map(|row| row.iter().map(WireCell::from_cell).collect())
                .collect(),
            colors_used: preview.colors_used.clone(),
            symbol_map: preview.symbol_map.clone(),
            width: Some(pattern.col_count()),
            height: Some(pattern.row_count()),
            mesh_count: preview.mesh_count,
        }
    }
}

/// Body returned by the generation endpoint, success or failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_data: Option<PatternData>,

    /// Stored name of the uploaded source image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_colors: Option<u32>,
}

/// Validated pattern ready for rendering, with the parameters the server
/// echoed back.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternPreview {
    pub pattern: Pattern,
    pub palette: Palette,
    pub audit: PaletteAudit,
    pub canvas_size: Option<String>,
    pub mesh_count: Option<u32>,
    pub max_colors: Option<u32>,
    pub source_image: Option<String>,
    /// Palette as received, sent back unchanged on save
    pub colors_used: Vec<WirePaletteEntry>,
    pub symbol_map: Option<serde_json::Value>,
}

impl GenerationResponse {
    /// Parse a response body; JSON errors count as malformed responses.
    pub fn from_slice(body: &[u8]) -> Result<Self, ResponseError> {
        serde_json::from_slice(body).map_err(|e| ResponseError::Malformed(e.to_string()))
    }

    /// Validate the response and convert it into domain values.
    ///
    /// Duplicate palette identifiers are dropped (first wins). Unused
    /// palette entries and cells referencing unknown threads are logged
    /// and kept.
    pub fn into_preview(self) -> Result<PatternPreview, ResponseError> {
        if self.success == Some(false) || self.error.is_some() {
            let message = self
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
            return Err(ResponseError::Rejected(message));
        }

        let data = self
            .pattern_data
            .ok_or_else(|| ResponseError::Malformed("missing pattern_data".to_string()))?;

        let rows = data
            .pattern
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, cell)| cell.to_cell(r, c))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pattern = Pattern::new(rows)?;

        if data.width.is_some_and(|w| w != pattern.col_count())
            || data.height.is_some_and(|h| h != pattern.row_count())
        {
            tracing::debug!(
                width = ?data.width,
                height = ?data.height,
                rows = pattern.row_count(),
                cols = pattern.col_count(),
                "Declared size differs from grid, using grid"
            );
        }

        let entries = data
            .colors_used
            .iter()
            .map(|entry| entry.resolve(&pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let (palette, dropped) = Palette::dedup(entries);
        if !dropped.is_empty() {
            tracing::warn!(?dropped, "Dropped duplicate palette entries");
        }

        let audit = palette.audit(&pattern);
        if !audit.unreferenced.is_empty() {
            tracing::warn!(ids = ?audit.unreferenced, "Palette entries not used by any cell");
        }
        if !audit.dangling.is_empty() {
            tracing::warn!(ids = ?audit.dangling, "Cells reference threads missing from palette");
        }

        Ok(PatternPreview {
            pattern,
            palette,
            audit,
            canvas_size: self.canvas_size,
            mesh_count: self.mesh_count.or(data.mesh_count),
            max_colors: self.max_colors,
            source_image: self.original_image,
            colors_used: data.colors_used,
            symbol_map: data.symbol_map,
        })
    }
}

/// Body of `POST /save_pattern`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SavePatternRequest {
    pub name: String,
    pub original_image: Option<String>,
    pub pattern_data: PatternData,
    pub canvas_size: Option<String>,
    pub mesh_count: Option<u32>,
    pub colors_used: Vec<WirePaletteEntry>,
    pub folder_id: Option<WireId>,
}

impl SavePatternRequest {
    pub fn from_preview(name: &str, folder_id: Option<WireId>, preview: &PatternPreview) -> Self {
        Self {
            name: name.to_string(),
            original_image: preview.source_image.clone(),
            pattern_data: PatternData::from_preview(preview),
            canvas_size: preview.canvas_size.clone(),
            mesh_count: preview.mesh_count,
            colors_used: preview.colors_used.clone(),
            folder_id,
        }
    }
}

/// Response of `POST /save_pattern`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SavePatternResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub pattern_id: Option<WireId>,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /create_folder`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

/// Response of `POST /create_folder`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateFolderResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub folder_id: Option<WireId>,
    #[serde(default)]
    pub error: Option<String>,
}
