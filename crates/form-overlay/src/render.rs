//! Drawing field text and checkmarks onto a form image
//!
//! Field text is set in the loaded font on its baseline. Checkmarks are
//! not glyphs: each is a stroked two-segment tick sized by the template's
//! `check_size`, so they render without any font.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use tracing::{debug, info};

use crate::error::OverlayError;
use crate::fields::FieldValues;
use crate::output::{output_permissions, resolve_output, write_atomic};
use crate::template::{FieldOverlay, FormTemplate};

const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

const CHECK_COLOR: Rgba<u8> = Rgba([220, 0, 0, 255]);

/// Renders filled copies of one form layout.
///
/// Holds no per-call state; a single renderer can serve concurrent
/// requests.
#[derive(Clone)]
pub struct FormRenderer {
    template: FormTemplate,
    font: Option<FontArc>,
}

impl FormRenderer {
    /// Without a font only checkmarks can be drawn; any non-empty field
    /// value then fails with [`OverlayError::FontUnavailable`].
    pub fn new(template: FormTemplate, font: Option<FontArc>) -> Self {
        Self { template, font }
    }

    pub fn template(&self) -> &FormTemplate {
        &self.template
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw `values` and `checked` over a copy of `base`
    pub fn render(
        &self,
        base: &DynamicImage,
        values: &FieldValues,
        checked: &HashSet<String>,
    ) -> Result<RgbaImage, OverlayError> {
        // Templates built in code bypass the TOML loader's checks
        self.template.validate()?;

        let mut canvas = base.to_rgba8();

        for key in values.present() {
            if self.template.field(key).is_none() {
                debug!(field = %key, template = %self.template.name, "Field has no overlay, skipping");
            }
        }

        for overlay in &self.template.fields {
            let Some(text) = values.get(overlay.field) else {
                continue;
            };
            let font = self
                .font
                .as_ref()
                .ok_or_else(|| OverlayError::FontUnavailable(overlay.field.to_string()))?;
            draw_field_text(&mut canvas, font, overlay, text);
        }

        for label in checked {
            if self.template.checkbox(label).is_none() {
                debug!(label = %label, "Checked item is not on the form, skipping");
            }
        }

        for checkbox in &self.template.checkboxes {
            if checked.contains(&checkbox.label) {
                draw_checkmark(&mut canvas, checkbox.x, checkbox.y, self.template.check_size);
            }
        }

        Ok(canvas)
    }

    /// Render `input` and write the result beside it as `output_name`.
    ///
    /// Returns the path written. The input file is only read.
    pub fn render_file(
        &self,
        input: &Path,
        values: &FieldValues,
        checked: &HashSet<String>,
        output_name: Option<&str>,
    ) -> Result<PathBuf, OverlayError> {
        let target = resolve_output(input, output_name)?;

        // Unreadable input is reported the same way as undecodable input
        let bytes = std::fs::read(input)
            .map_err(|e| OverlayError::ImageDecode(format!("{}: {}", input.display(), e)))?;
        let base = image::load_from_memory(&bytes)
            .map_err(|e| OverlayError::ImageDecode(format!("{}: {}", input.display(), e)))?;

        let rendered = self.render(&base, values, checked)?;
        write_atomic(&rendered, &target, output_permissions(input).as_ref())?;

        info!(
            "Filled form written: {} ({}x{}, {} fields, {} checks)",
            target.path.display(),
            rendered.width(),
            rendered.height(),
            values.present().count(),
            checked.len()
        );

        Ok(target.path)
    }
}

/// Draw `text` with its baseline on the overlay anchor
fn draw_field_text(canvas: &mut RgbaImage, font: &FontArc, overlay: &FieldOverlay, text: &str) {
    let scale = PxScale::from(overlay.font_size());
    // imageproc positions the top of the line box, not the baseline
    let ascent = font.as_scaled(scale).ascent();
    let top = overlay.y - ascent.round() as i32;

    draw_text_mut(canvas, TEXT_COLOR, overlay.x, top, scale, font, text);
}

/// Mark bounds: `[x, x + size]` by `[y - size, y]`
fn draw_checkmark(canvas: &mut RgbaImage, x: i32, y: i32, size: f32) {
    let (x, y) = (x as f32, y as f32);
    let start = (x + size * 0.1, y - size * 0.45);
    let valley = (x + size * 0.4, y - size * 0.1);
    let tip = (x + size * 0.9, y - size * 0.9);

    let half = (size / 12.0).round().max(1.0) as i32;

    for dx in -half..=half {
        for dy in -half..=half {
            let (ox, oy) = (dx as f32, dy as f32);
            draw_line_segment_mut(
                canvas,
                (start.0 + ox, start.1 + oy),
                (valley.0 + ox, valley.1 + oy),
                CHECK_COLOR,
            );
            draw_line_segment_mut(
                canvas,
                (valley.0 + ox, valley.1 + oy),
                (tip.0 + ox, tip.1 + oy),
                CHECK_COLOR,
            );
        }
    }
}
