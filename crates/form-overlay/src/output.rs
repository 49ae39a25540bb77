//! Output path resolution and atomic image writes

use std::fs::Permissions;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};

use image::buffer::ConvertBuffer;
use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::OverlayError;

pub const DEFAULT_OUTPUT_NAME: &str = "filled_form.png";

/// Where and how a rendered form is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// Place `output_name` next to `input`.
///
/// The name must be a bare file name with a PNG or JPEG extension (no
/// extension means PNG), and must not resolve to the input itself.
pub fn resolve_output(input: &Path, output_name: Option<&str>) -> Result<OutputTarget, OverlayError> {
    let name = output_name.unwrap_or(DEFAULT_OUTPUT_NAME);

    let mut components = Path::new(name).components();
    let is_bare = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !is_bare || name.contains(|c: char| c == '/' || c == '\\') {
        return Err(OverlayError::Validation(format!(
            "Output name '{}' must be a plain file name",
            name
        )));
    }

    let format = match ImageFormat::from_path(name) {
        Ok(ImageFormat::Png) | Err(_) => ImageFormat::Png,
        Ok(ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Ok(other) => {
            return Err(OverlayError::Validation(format!(
                "Unsupported output format {:?}; use .png or .jpg",
                other
            )));
        }
    };

    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let path = dir.join(name);

    if path == input {
        return Err(OverlayError::Validation(
            "Output name must differ from the input file".to_string(),
        ));
    }

    Ok(OutputTarget { path, format })
}

/// Encode `image` in memory
pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, OverlayError> {
    let mut buf = Cursor::new(Vec::new());

    let result = match format {
        ImageFormat::Jpeg => {
            let rgb: RgbImage = image.convert();
            rgb.write_to(&mut buf, format)
        }
        _ => image.write_to(&mut buf, format),
    };
    result.map_err(|e| OverlayError::Encode(e.to_string()))?;

    Ok(buf.into_inner())
}

/// Encode into a temp file beside the target, then rename it into place.
///
/// A reader never sees a half-written target; on failure the temp file
/// is removed when it drops. The temp file is created owner-only, so
/// `permissions`, when given, is applied before the rename.
pub fn write_atomic(
    image: &RgbaImage,
    target: &OutputTarget,
    permissions: Option<&Permissions>,
) -> Result<(), OverlayError> {
    let bytes = encode(image, target.format)?;

    let dir = match target.path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".form-overlay-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| OverlayError::io(dir, e))?;

    tmp.write_all(&bytes)
        .and_then(|_| match permissions {
            Some(permissions) => tmp.as_file().set_permissions(permissions.clone()),
            None => Ok(()),
        })
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| OverlayError::io(tmp.path(), e))?;

    tmp.persist(&target.path)
        .map_err(|e| OverlayError::io(&target.path, e.error))?;

    Ok(())
}

/// Permissions for a filled form: those of the scan it was made from,
/// falling back to `0o644` on Unix when they cannot be read
pub fn output_permissions(input: &Path) -> Option<Permissions> {
    std::fs::metadata(input)
        .map(|meta| meta.permissions())
        .ok()
        .or_else(default_permissions)
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}
