use serde::{Deserialize, Serialize};

/// A text field on the induction form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Name,
    Position,
    Date,
    Signature,
    ProjectName,
    ProjectCode,
    InducteeName,
}

impl FieldKey {
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Name,
        FieldKey::Position,
        FieldKey::Date,
        FieldKey::Signature,
        FieldKey::ProjectName,
        FieldKey::ProjectCode,
        FieldKey::InducteeName,
    ];

    /// Key as it appears in JSON and template files
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Position => "position",
            FieldKey::Date => "date",
            FieldKey::Signature => "signature",
            FieldKey::ProjectName => "projectName",
            FieldKey::ProjectCode => "projectCode",
            FieldKey::InducteeName => "inducteeName",
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values supplied by the caller for one form fill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldValues {
    pub name: Option<String>,
    pub position: Option<String>,
    pub date: Option<String>,
    pub signature: Option<String>,
    pub project_name: Option<String>,
    pub project_code: Option<String>,
    pub inductee_name: Option<String>,
}

impl FieldValues {
    /// Value to draw for `key`: `None` when absent or blank
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        let value = match key {
            FieldKey::Name => &self.name,
            FieldKey::Position => &self.position,
            FieldKey::Date => &self.date,
            FieldKey::Signature => &self.signature,
            FieldKey::ProjectName => &self.project_name,
            FieldKey::ProjectCode => &self.project_code,
            FieldKey::InducteeName => &self.inductee_name,
        };

        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) -> &mut Self {
        let slot = match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Position => &mut self.position,
            FieldKey::Date => &mut self.date,
            FieldKey::Signature => &mut self.signature,
            FieldKey::ProjectName => &mut self.project_name,
            FieldKey::ProjectCode => &mut self.project_code,
            FieldKey::InducteeName => &mut self.inductee_name,
        };
        *slot = Some(value.into());
        self
    }

    /// Keys that will actually be drawn
    pub fn present(&self) -> impl Iterator<Item = FieldKey> + '_ {
        FieldKey::ALL
            .into_iter()
            .filter(move |key| self.get(*key).is_some())
    }
}
