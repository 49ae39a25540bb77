//! Font loading for field text

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use tracing::{debug, info};

use crate::error::OverlayError;

/// Well-known locations of a plain sans-serif face
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub struct FontSource;

impl FontSource {
    pub fn from_bytes(data: Vec<u8>) -> Result<FontArc, OverlayError> {
        FontArc::try_from_vec(data)
            .map_err(|e| OverlayError::Validation(format!("Failed to parse font: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<FontArc, OverlayError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| OverlayError::io(path, e))?;
        let font = Self::from_bytes(data)?;
        info!("Loaded font: {}", path.display());
        Ok(font)
    }

    /// First parseable face from [`SYSTEM_FONT_PATHS`]
    pub fn system() -> Option<(PathBuf, FontArc)> {
        for path in SYSTEM_FONT_PATHS {
            let Ok(data) = std::fs::read(path) else {
                continue;
            };
            if let Ok(font) = FontArc::try_from_vec(data) {
                info!("Loaded system font: {}", path);
                return Some((PathBuf::from(path), font));
            }
        }

        debug!("No system font found");
        None
    }

    /// Explicit path when given, otherwise a system face
    pub fn resolve(path: Option<&Path>) -> Result<Option<FontArc>, OverlayError> {
        match path {
            Some(path) => Self::from_path(path).map(Some),
            None => Ok(Self::system().map(|(_, font)| font)),
        }
    }
}
