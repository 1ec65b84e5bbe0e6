//! 8-bit RGB color used for stitch cells and thread palettes.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Display color of a stitch or thread.
///
/// Components are plain 8-bit sRGB values, the same values the pattern
/// generator sends and the preview surface draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a color from wider integers, as decoded from JSON.
    ///
    /// Returns `None` when any component falls outside `0..=255`.
    pub fn from_components(r: i64, g: i64, b: i64) -> Option<Self> {
        let r = u8::try_from(r).ok()?;
        let g = u8::try_from(g).ok()?;
        let b = u8::try_from(b).ok()?;
        Some(Self::new(r, g, b))
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Not 3 or 6 hex digits after stripping `#`
    InvalidLength,
    /// A digit outside `0-9a-fA-F`
    InvalidHex(ParseIntError),
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 characters)")
            }
            ParseColorError::InvalidHex(err) => write!(f, "invalid hex character: {}", err),
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            _ => None,
        }
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB` (case-insensitive,
    /// surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 => {
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::new(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!("#dddddd".parse::<Rgb>().unwrap(), Rgb::new(221, 221, 221));
        assert_eq!("FF0000".parse::<Rgb>().unwrap(), Rgb::new(255, 0, 0));
        assert_eq!("#abc".parse::<Rgb>().unwrap(), Rgb::new(0xaa, 0xbb, 0xcc));
        assert_eq!("  #000  ".parse::<Rgb>().unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_hex_parsing_errors() {
        assert!(matches!(
            "#GGG".parse::<Rgb>(),
            Err(ParseColorError::InvalidHex(_))
        ));
        assert_eq!("#FFFF".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
        assert_eq!("".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
        assert_eq!("#ééé".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
    }

    #[test]
    fn test_hex_round_trip() {
        let color = Rgb::new(18, 52, 86);
        assert_eq!(color.to_hex(), "#123456");
        assert_eq!(color.to_hex().parse::<Rgb>().unwrap(), color);
    }

    #[test]
    fn test_from_components_range() {
        assert_eq!(Rgb::from_components(0, 128, 255), Some(Rgb::new(0, 128, 255)));
        assert_eq!(Rgb::from_components(256, 0, 0), None);
        assert_eq!(Rgb::from_components(0, -1, 0), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgb::new(255, 0, 0).to_string(), "rgb(255, 0, 0)");
    }
}
