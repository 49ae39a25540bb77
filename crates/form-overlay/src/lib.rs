//! Form overlay rendering for scanned site forms
//!
//! Stamps caller-supplied field values and ticked checklist items onto a
//! scanned form image at fixed coordinates, producing a new image of the
//! same size. The original scan is never modified.
//!
//! ```no_run
//! use std::collections::HashSet;
//! use std::path::Path;
//!
//! use form_overlay::{FieldKey, FieldValues, FontSource, FormRenderer, FormTemplate};
//!
//! # fn example() -> Result<(), form_overlay::OverlayError> {
//! let font = FontSource::resolve(None)?;
//! let renderer = FormRenderer::new(FormTemplate::builtin(), font);
//!
//! let mut values = FieldValues::default();
//! values.set(FieldKey::Name, "J. Smith");
//! let checked: HashSet<String> = ["Appropriate PPE".to_string()].into();
//!
//! let written = renderer.render_file(Path::new("scans/induction.png"), &values, &checked, None)?;
//! println!("{}", written.display());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fields;
pub mod font;
pub mod output;
pub mod render;
pub mod template;

pub use error::OverlayError;
pub use fields::{FieldKey, FieldValues};
pub use font::FontSource;
pub use output::DEFAULT_OUTPUT_NAME;
pub use render::FormRenderer;
pub use template::{CheckboxField, FieldOverlay, FormTemplate, CHECKLIST_LABELS};
