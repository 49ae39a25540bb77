//! Application state for the site documents server

use std::path::PathBuf;
use std::sync::Arc;

use form_overlay::FormRenderer;
use schedule_extract::ScheduleParser;

use crate::ocr::OcrProvider;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Text detection backend; `None` disables the upload routes
    pub ocr: Option<Arc<dyn OcrProvider>>,
    pub parser: Arc<dyn ScheduleParser>,
    pub renderer: Arc<FormRenderer>,
    /// When set, form images must live under this directory
    pub forms_root: Option<PathBuf>,
    /// Budget for one OCR + extraction request in milliseconds
    pub timeout_ms: u64,
}
