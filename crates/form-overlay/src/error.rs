use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No font loaded, cannot draw field '{0}'")]
    FontUnavailable(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid form template: {0}")]
    Template(String),
}

impl OverlayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OverlayError::Io {
            path: path.into(),
            source,
        }
    }
}
