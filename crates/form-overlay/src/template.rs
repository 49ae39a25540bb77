//! Overlay coordinates for a form layout
//!
//! Coordinates are absolute pixels on the scanned form. Text overlays are
//! anchored at their baseline; checkmarks sit with their bottom-left
//! corner on the anchor. The built-in table matches the site induction
//! form. Other layouts can be supplied as TOML:
//!
//! ```toml
//! name = "induction-v2"
//! check_size = 26.0
//!
//! [[fields]]
//! field = "name"
//! x = 120
//! y = 110
//!
//! [[checkboxes]]
//! label = "Signed RAMS"
//! x = 700
//! y = 278
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;
use crate::fields::FieldKey;

/// Field text size when an overlay does not set one
pub const DEFAULT_FONT_SIZE: f32 = 18.0;

/// Checkmark size, kept larger than field text
pub const DEFAULT_CHECK_SIZE: f32 = 26.0;

/// Largest font or checkmark size a template may ask for
pub const MAX_MARK_SIZE: f32 = 256.0;

/// Safety checklist items printed on the induction form, top to bottom
pub const CHECKLIST_LABELS: [&str; 10] = [
    "Site Induction Completed",
    "Signed RAMS",
    "Appropriate PPE",
    "Permit to Work",
    "Toolbox Talk Attended",
    "Fire Exits Identified",
    "First Aid Location Known",
    "Welfare Facilities Shown",
    "Emergency Procedures Explained",
    "Site Rules Understood",
];

const CHECKLIST_X: i32 = 700;
const CHECKLIST_TOP: i32 = 250;
const CHECKLIST_PITCH: i32 = 28;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOverlay {
    pub field: FieldKey,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

impl FieldOverlay {
    pub fn new(field: FieldKey, x: i32, y: i32) -> Self {
        Self {
            field,
            x,
            y,
            font_size: None,
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxField {
    pub label: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub name: String,
    #[serde(default = "default_check_size")]
    pub check_size: f32,
    #[serde(default)]
    pub fields: Vec<FieldOverlay>,
    #[serde(default)]
    pub checkboxes: Vec<CheckboxField>,
}

fn default_check_size() -> f32 {
    DEFAULT_CHECK_SIZE
}

impl FormTemplate {
    /// Layout of the site induction form
    pub fn builtin() -> Self {
        let fields = vec![
            FieldOverlay::new(FieldKey::Name, 120, 110),
            FieldOverlay::new(FieldKey::Position, 480, 110),
            FieldOverlay::new(FieldKey::Date, 120, 150),
            FieldOverlay::new(FieldKey::Signature, 480, 150),
            FieldOverlay::new(FieldKey::ProjectCode, 480, 190),
            FieldOverlay::new(FieldKey::ProjectName, 120, 190),
            FieldOverlay::new(FieldKey::InducteeName, 120, 560),
        ];

        let checkboxes = CHECKLIST_LABELS
            .iter()
            .enumerate()
            .map(|(row, label)| CheckboxField {
                label: label.to_string(),
                x: CHECKLIST_X,
                y: CHECKLIST_TOP + CHECKLIST_PITCH * row as i32,
            })
            .collect();

        Self {
            name: "site-induction".to_string(),
            check_size: DEFAULT_CHECK_SIZE,
            fields,
            checkboxes,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OverlayError> {
        let template: FormTemplate =
            toml::from_str(content).map_err(|e| OverlayError::Template(e.to_string()))?;
        template.validate()?;
        Ok(template)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, OverlayError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| OverlayError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, OverlayError> {
        toml::to_string(self).map_err(|e| OverlayError::Template(e.to_string()))
    }

    /// One overlay per field, unique checklist labels, finite sizes in
    /// `(0, MAX_MARK_SIZE]`
    pub fn validate(&self) -> Result<(), OverlayError> {
        let mut seen_fields = HashSet::new();
        for overlay in &self.fields {
            if !seen_fields.insert(overlay.field) {
                return Err(OverlayError::Template(format!(
                    "field '{}' is placed more than once",
                    overlay.field
                )));
            }
            if !is_usable_size(overlay.font_size()) {
                return Err(OverlayError::Template(format!(
                    "field '{}' font size {} is outside (0, {}]",
                    overlay.field,
                    overlay.font_size(),
                    MAX_MARK_SIZE
                )));
            }
        }

        let mut seen_labels = HashSet::new();
        for checkbox in &self.checkboxes {
            if !seen_labels.insert(checkbox.label.as_str()) {
                return Err(OverlayError::Template(format!(
                    "checklist label '{}' is placed more than once",
                    checkbox.label
                )));
            }
        }

        if !is_usable_size(self.check_size) {
            return Err(OverlayError::Template(format!(
                "check_size {} is outside (0, {}]",
                self.check_size, MAX_MARK_SIZE
            )));
        }

        Ok(())
    }

    pub fn field(&self, key: FieldKey) -> Option<&FieldOverlay> {
        self.fields.iter().find(|overlay| overlay.field == key)
    }

    pub fn checkbox(&self, label: &str) -> Option<&CheckboxField> {
        self.checkboxes.iter().find(|checkbox| checkbox.label == label)
    }
}

fn is_usable_size(size: f32) -> bool {
    size.is_finite() && size > 0.0 && size <= MAX_MARK_SIZE
}

impl Default for FormTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}
