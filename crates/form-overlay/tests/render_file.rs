//! Filesystem behaviour of `FormRenderer::render_file`

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use form_overlay::{
    FieldKey, FieldValues, FontSource, FormRenderer, FormTemplate, OverlayError,
    DEFAULT_OUTPUT_NAME,
};
use image::{Rgba, RgbaImage};

fn write_blank_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

const FIXTURE_FONT: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/DejaVuSansMono.ttf"
);

fn checked(labels: &[&str]) -> HashSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn leftover_temp_files(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".form-overlay-"))
        .collect()
}

/// Any pixel in the box differs from white
fn region_marked(image: &RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
    (y0.max(0)..y1.min(image.height() as i32)).any(|y| {
        (x0.max(0)..x1.min(image.width() as i32))
            .any(|x| image.get_pixel(x as u32, y as u32) != &Rgba([255, 255, 255, 255]))
    })
}

#[test]
fn writes_default_name_beside_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_blank_png(dir.path(), "induction.png", 800, 600);

    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    let out = renderer
        .render_file(&input, &FieldValues::default(), &checked(&["Signed RAMS"]), None)
        .unwrap();

    assert_eq!(out, dir.path().join(DEFAULT_OUTPUT_NAME));
    let written = image::open(&out).unwrap();
    assert_eq!((written.width(), written.height()), (800, 600));
}

#[test]
fn input_file_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_blank_png(dir.path(), "induction.png", 320, 240);
    let before = fs::read(&input).unwrap();

    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    renderer
        .render_file(&input, &FieldValues::default(), &checked(&["Appropriate PPE"]), Some("out.png"))
        .unwrap();

    assert_eq!(fs::read(&input).unwrap(), before);
}

#[test]
fn jpeg_output_is_written_as_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_blank_png(dir.path(), "induction.png", 800, 600);

    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    let out = renderer
        .render_file(&input, &FieldValues::default(), &HashSet::new(), Some("filled.jpg"))
        .unwrap();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
}

#[test]
fn corrupt_input_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("induction.png");
    fs::write(&input, b"definitely not a png").unwrap();

    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    let err = renderer
        .render_file(&input, &FieldValues::default(), &HashSet::new(), None)
        .unwrap_err();

    assert!(matches!(err, OverlayError::ImageDecode(_)), "{err:?}");
    assert!(!dir.path().join(DEFAULT_OUTPUT_NAME).exists());
}

#[test]
fn missing_input_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    let err = renderer
        .render_file(
            &dir.path().join("absent.png"),
            &FieldValues::default(),
            &HashSet::new(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, OverlayError::ImageDecode(_)), "{err:?}");
}

#[test]
fn failed_write_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_blank_png(dir.path(), "induction.png", 64, 64);
    // A directory squatting on the target name makes the final rename fail
    fs::create_dir(dir.path().join("out.png")).unwrap();

    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    let err = renderer
        .render_file(&input, &FieldValues::default(), &HashSet::new(), Some("out.png"))
        .unwrap_err();

    assert!(matches!(err, OverlayError::Io { .. }), "{err:?}");
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn path_like_output_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_blank_png(dir.path(), "induction.png", 64, 64);

    let renderer = FormRenderer::new(FormTemplate::builtin(), None);
    let err = renderer
        .render_file(&input, &FieldValues::default(), &HashSet::new(), Some("../escape.png"))
        .unwrap_err();
    assert!(matches!(err, OverlayError::Validation(_)));
}

#[test]
fn induction_form_with_name_and_ppe() {
    let font = FontSource::from_path(FIXTURE_FONT).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = write_blank_png(dir.path(), "induction.png", 800, 600);
    let template = FormTemplate::builtin();
    let renderer = FormRenderer::new(template.clone(), Some(font));

    let mut values = FieldValues::default();
    values.set(FieldKey::Name, "J. Smith");

    let out = renderer
        .render_file(&input, &values, &checked(&["Appropriate PPE"]), None)
        .unwrap();
    let image = image::open(&out).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (800, 600));

    let name = template.field(FieldKey::Name).unwrap();
    assert!(region_marked(&image, name.x, name.y - 20, name.x + 200, name.y + 6));

    let size = template.check_size as i32;
    let ppe = template.checkbox("Appropriate PPE").unwrap();
    assert!(region_marked(&image, ppe.x, ppe.y - size, ppe.x + size, ppe.y));

    for overlay in template.fields.iter().filter(|f| f.field != FieldKey::Name) {
        assert!(
            !region_marked(&image, overlay.x, overlay.y - 20, overlay.x + 200, overlay.y + 6),
            "unexpected text at {}",
            overlay.field
        );
    }
    for checkbox in template.checkboxes.iter().filter(|c| c.label != "Appropriate PPE") {
        assert!(
            !region_marked(&image, checkbox.x, checkbox.y - size, checkbox.x + size, checkbox.y),
            "unexpected mark at {}",
            checkbox.label
        );
    }
}

#[cfg(unix)]
#[test]
fn output_takes_input_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let renderer = FormRenderer::new(FormTemplate::builtin(), None);

    for (name, mode) in [("world.png", 0o644), ("group.png", 0o640)] {
        let input = write_blank_png(dir.path(), name, 64, 64);
        fs::set_permissions(&input, fs::Permissions::from_mode(mode)).unwrap();

        let out_name = format!("filled_{name}");
        let out = renderer
            .render_file(&input, &FieldValues::default(), &HashSet::new(), Some(&out_name))
            .unwrap();

        let written = fs::metadata(&out).unwrap().permissions().mode() & 0o777;
        assert_eq!(written, mode, "output mode {written:o} for input mode {mode:o}");
    }
}
