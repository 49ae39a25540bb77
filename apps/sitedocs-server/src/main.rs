//! Site Documents Server
//!
//! HTTP front end for construction site paperwork. Provides REST API
//! endpoints for:
//!
//! - Programme scan extraction (image -> OCR -> task rows)
//! - Schedule parsing of already-recognised text
//! - Induction form filling (field text + checklist marks)
//!
//! ## Architecture
//!
//! Text recognition is delegated to an external vision provider behind
//! the [`ocr::OcrProvider`] trait. Row extraction and form rendering are
//! pure library calls into `schedule-extract` and `form-overlay`.
//!
//! - Rate limiting via tower-governor
//! - Request tracing via tower-http

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use form_overlay::{FontSource, FormRenderer, FormTemplate};
use schedule_extract::{DatePolicy, FixersAnchorParser};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod ocr;
mod state;

use api::{
    handle_extract_schedule, handle_fill_form, handle_form_template, handle_health,
    handle_ocr_text, handle_parse_schedule,
};
use ocr::{GoogleVisionProvider, OcrProvider};
use state::AppState;

/// Command-line arguments for the site documents server
#[derive(Parser, Debug)]
#[command(name = "sitedocs-server")]
#[command(about = "Programme extraction and induction form filling server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// OCR request timeout in milliseconds
    #[arg(long, default_value = "15000")]
    timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Largest accepted request body in bytes
    #[arg(long, default_value = "10485760")]
    max_upload_bytes: usize,

    /// TrueType/OpenType font for form text
    #[arg(long, env = "SITEDOCS_FONT_PATH")]
    font_path: Option<PathBuf>,

    /// TOML form layout replacing the built-in induction form
    #[arg(long)]
    template: Option<PathBuf>,

    /// Only accept form images under this directory
    #[arg(long)]
    forms_root: Option<PathBuf>,

    /// Reject impossible calendar dates such as 31/02/2024
    #[arg(long)]
    strict_dates: bool,

    /// Google Cloud Vision API key; OCR routes answer 503 without one
    #[arg(long, env = "GOOGLE_VISION_API_KEY", hide_env_values = true)]
    vision_api_key: Option<String>,

    /// Override the Vision annotate endpoint
    #[arg(long)]
    vision_endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// All routes, without the network-facing middleware
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Schedule extraction
        .route("/api/schedule/extract", post(handle_extract_schedule))
        .route("/api/schedule/parse", post(handle_parse_schedule))
        .route("/api/ocr/text", post(handle_ocr_text))
        // Forms
        .route("/api/forms/fill", post(handle_fill_form))
        .route("/api/forms/template", get(handle_form_template))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Burst allowance for the per-IP limiter: two seconds' worth
fn burst_size(rate_limit: u32) -> u32 {
    rate_limit.saturating_mul(2)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting site documents server on {}:{}", args.host, args.port);

    let template = match &args.template {
        Some(path) => FormTemplate::from_toml_file(path)
            .with_context(|| format!("Failed to load form template {}", path.display()))?,
        None => FormTemplate::builtin(),
    };

    let font = FontSource::resolve(args.font_path.as_deref()).context("Failed to load font")?;
    if font.is_none() {
        warn!("No font found; form fills with field text will fail");
    }

    let ocr: Option<Arc<dyn OcrProvider>> = match &args.vision_api_key {
        Some(key) if !key.trim().is_empty() => {
            let provider = GoogleVisionProvider::new(
                key.clone(),
                args.vision_endpoint.clone(),
                Duration::from_millis(args.timeout_ms),
            )?;
            Some(Arc::new(provider))
        }
        _ => {
            warn!("GOOGLE_VISION_API_KEY not set; OCR routes are disabled");
            None
        }
    };

    let forms_root = args
        .forms_root
        .as_ref()
        .map(|root| {
            root.canonicalize()
                .with_context(|| format!("Forms root {} is not accessible", root.display()))
        })
        .transpose()?;

    let date_policy = if args.strict_dates {
        DatePolicy::Calendar
    } else {
        DatePolicy::Format
    };

    info!(
        "Form template '{}': {} fields, {} checklist items",
        template.name,
        template.fields.len(),
        template.checkboxes.len()
    );

    let state = AppState {
        ocr,
        parser: Arc::new(FixersAnchorParser::new(date_policy)),
        renderer: Arc::new(FormRenderer::new(template, font)),
        forms_root,
        timeout_ms: args.timeout_ms,
    };

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(burst_size(args.rate_limit))
            .finish()
            .ok_or_else(|| anyhow!("Invalid rate limit: {}", args.rate_limit))?,
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state, args.max_upload_bytes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(GovernorLayer {
                config: governor_conf,
            })
            .layer(cors),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("OCR timeout: {}ms", args.timeout_ms);
    info!("Date policy: {:?}", date_policy);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
