pub mod api;
pub mod callback;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod webhook;

use axum::{Router, routing};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use callback::CallbackReporter;
use config::{CommandMapping, Settings};

/// Path Docker Hub is pointed at
pub const WEBHOOK_PATH: &str = "/autodock/v1/";

/// Built once at startup, shared read-only by every request
pub struct AppState {
    pub commands: CommandMapping,
    pub settings: Settings,
    pub reporter: CallbackReporter,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(commands: CommandMapping, settings: Settings) -> error::Result<Self> {
        let reporter = CallbackReporter::new(settings.callback_timeout)?;
        Ok(Self {
            commands,
            settings,
            reporter,
            start_time: Instant::now(),
            started_at: Utc::now(),
        })
    }
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, routing::any(api::handle_webhook))
        .route("/status", routing::get(api::status))
        .with_state(state)
}
