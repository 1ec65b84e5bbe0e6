//! Generation form inputs and their client-side validation.
//!
//! Everything here runs before a request leaves the client; the server
//! still performs its own checks.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 32 MiB, the generation server's request limit
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// Image formats the generation server can decode
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp", "ico", "ppm", "pgm", "pbm", "pnm",
];

/// Form validation failure, worded for the user
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please select an image file")]
    MissingImage,

    #[error("Invalid file type: {0}")]
    UnsupportedType(String),

    #[error("Image is too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Please enter a custom mesh count")]
    MissingMeshCount,

    #[error("Invalid mesh count: {0}")]
    InvalidMeshCount(String),

    #[error("Please enter custom dimensions")]
    MissingDimensions,

    #[error("Invalid canvas size: {0}")]
    InvalidCanvasSize(String),

    #[error("Invalid max colors: {0}")]
    InvalidMaxColors(String),

    #[error("Please enter a pattern name")]
    MissingPatternName,

    #[error("Please enter a folder name")]
    MissingFolderName,
}

/// Image selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate a selected file against name, type and size rules.
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        max_bytes: u64,
    ) -> Result<Self, FormError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(FormError::MissingImage);
        }

        let extension = extension_of(&file_name)
            .map(str::to_ascii_lowercase)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| FormError::UnsupportedType(file_name.clone()))?;

        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(FormError::TooLarge {
                size,
                max: max_bytes,
            });
        }

        tracing::debug!(file = %file_name, %extension, size = %format_file_size(size), "Image selected");
        Ok(Self { file_name, bytes })
    }

    /// Human-readable size, e.g. `1.5 MB`
    pub fn size_label(&self) -> String {
        format_file_size(self.bytes.len() as u64)
    }

    /// MIME type for the multipart part, derived from the extension
    pub fn mime_type(&self) -> &'static str {
        let ext = extension_of(&self.file_name)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" | "tif" => "image/tiff",
            "webp" => "image/webp",
            "ico" => "image/x-icon",
            "ppm" | "pgm" | "pbm" | "pnm" => "image/x-portable-anymap",
            _ => "application/octet-stream",
        }
    }

    /// Suggested pattern name: the file name without its extension
    pub fn default_pattern_name(&self) -> String {
        default_pattern_name(&self.file_name)
    }
}

fn extension_of(file_name: &str) -> Option<&str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    (!ext.is_empty() && !ext.contains('/')).then_some(ext)
}

/// Canvas dimensions in stitches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CanvasSize {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FormError::InvalidCanvasSize(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Requested canvas: explicit dimensions, or fit to the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasSpec {
    Size(CanvasSize),
    Fit,
}

impl fmt::Display for CanvasSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasSpec::Size(size) => size.fmt(f),
            CanvasSpec::Fit => f.write_str("fit"),
        }
    }
}

/// Validated parameters sent with a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub mesh_count: u32,
    pub canvas: CanvasSpec,
    /// 0 means no palette limit
    pub max_colors: u32,
}

/// Raw generation form fields, as typed by the user.
///
/// `mesh_count` and `canvas_size` accept the literal `custom`, in which
/// case the matching custom fields are used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationForm {
    pub mesh_count: String,
    pub custom_mesh: Option<String>,
    pub canvas_size: String,
    pub custom_width: Option<String>,
    pub custom_height: Option<String>,
    pub max_colors: String,
}

impl GenerationForm {
    /// Form pre-filled with preset values.
    pub fn preset(mesh_count: u32, canvas_size: impl Into<String>, max_colors: u32) -> Self {
        Self {
            mesh_count: mesh_count.to_string(),
            canvas_size: canvas_size.into(),
            max_colors: max_colors.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<GenerationParams, FormError> {
        let mesh_raw = if self.mesh_count.trim() == "custom" {
            non_blank(self.custom_mesh.as_deref()).ok_or(FormError::MissingMeshCount)?
        } else {
            self.mesh_count.trim()
        };
        let mesh_count = mesh_raw
            .parse::<u32>()
            .ok()
            .filter(|&m| m > 0)
            .ok_or_else(|| FormError::InvalidMeshCount(mesh_raw.to_string()))?;

        let canvas = match self.canvas_size.trim() {
            "custom" => {
                let width = non_blank(self.custom_width.as_deref());
                let height = non_blank(self.custom_height.as_deref());
                match (width, height) {
                    (Some(w), Some(h)) => CanvasSpec::Size(format!("{w}x{h}").parse()?),
                    _ => return Err(FormError::MissingDimensions),
                }
            }
            "fit" => CanvasSpec::Fit,
            other => CanvasSpec::Size(other.parse()?),
        };

        let max_raw = self.max_colors.trim();
        let max_colors = max_raw
            .parse::<u32>()
            .map_err(|_| FormError::InvalidMaxColors(max_raw.to_string()))?;

        Ok(GenerationParams {
            mesh_count,
            canvas,
            max_colors,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Require a non-blank pattern name, trimmed.
pub fn validate_pattern_name(name: &str) -> Result<&str, FormError> {
    non_blank(Some(name)).ok_or(FormError::MissingPatternName)
}

/// Require a non-blank folder name, trimmed.
pub fn validate_folder_name(name: &str) -> Result<&str, FormError> {
    non_blank(Some(name)).ok_or(FormError::MissingFolderName)
}

/// Format a byte count with base-1024 units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{scaled:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// File name with its last extension removed.
pub fn default_pattern_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem.to_string(),
        _ => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072 GB");
    }

    #[test]
    fn test_default_pattern_name() {
        assert_eq!(default_pattern_name("cat.photo.jpg"), "cat.photo");
        assert_eq!(default_pattern_name("sunset.PNG"), "sunset");
        assert_eq!(default_pattern_name("noext"), "noext");
        assert_eq!(default_pattern_name("trailing."), "trailing.");
    }

    #[test]
    fn test_image_upload_validation() {
        let ok = ImageUpload::new("Rose.JPG", vec![0; 10], 100).unwrap();
        assert_eq!(ok.mime_type(), "image/jpeg");
        assert_eq!(ok.default_pattern_name(), "Rose");
        assert_eq!(ok.size_label(), "10 Bytes");

        assert_eq!(
            ImageUpload::new("", vec![0; 10], 100),
            Err(FormError::MissingImage)
        );
        assert_eq!(
            ImageUpload::new("notes.txt", vec![0; 10], 100),
            Err(FormError::UnsupportedType("notes.txt".into()))
        );
        assert_eq!(
            ImageUpload::new("big.png", vec![0; 101], 100),
            Err(FormError::TooLarge { size: 101, max: 100 })
        );
    }

    #[test]
    fn test_canvas_size_parsing() {
        assert_eq!(
            "120x80".parse::<CanvasSize>().unwrap(),
            CanvasSize {
                width: 120,
                height: 80
            }
        );
        assert_eq!("50 X 50".parse::<CanvasSize>().unwrap().to_string(), "50x50");
        assert!("0x10".parse::<CanvasSize>().is_err());
        assert!("10by10".parse::<CanvasSize>().is_err());
    }

    #[test]
    fn test_form_presets() {
        let params = GenerationForm::preset(14, "100x100", 30).validate().unwrap();
        assert_eq!(params.mesh_count, 14);
        assert_eq!(params.canvas.to_string(), "100x100");
        assert_eq!(params.max_colors, 30);

        let fit = GenerationForm::preset(18, "fit", 0).validate().unwrap();
        assert_eq!(fit.canvas, CanvasSpec::Fit);
    }

    #[test]
    fn test_form_custom_fields() {
        let mut form = GenerationForm::preset(14, "custom", 30);
        form.mesh_count = "custom".into();
        assert_eq!(form.validate(), Err(FormError::MissingMeshCount));

        form.custom_mesh = Some("13".into());
        assert_eq!(form.validate(), Err(FormError::MissingDimensions));

        form.custom_width = Some("60".into());
        form.custom_height = Some(" ".into());
        assert_eq!(form.validate(), Err(FormError::MissingDimensions));

        form.custom_height = Some("40".into());
        let params = form.validate().unwrap();
        assert_eq!(params.mesh_count, 13);
        assert_eq!(params.canvas.to_string(), "60x40");
    }

    #[test]
    fn test_form_rejects_bad_numbers() {
        let form = GenerationForm::preset(14, "100x100", 30);

        let mut bad_mesh = form.clone();
        bad_mesh.mesh_count = "0".into();
        assert_eq!(
            bad_mesh.validate(),
            Err(FormError::InvalidMeshCount("0".into()))
        );

        let mut bad_colors = form;
        bad_colors.max_colors = "-3".into();
        assert_eq!(
            bad_colors.validate(),
            Err(FormError::InvalidMaxColors("-3".into()))
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(validate_pattern_name("  Roses "), Ok("Roses"));
        assert_eq!(validate_pattern_name("   "), Err(FormError::MissingPatternName));
        assert_eq!(validate_folder_name(""), Err(FormError::MissingFolderName));
    }
}
