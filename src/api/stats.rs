//! Status endpoint

use axum::{Json, extract::State as AxumState};
use serde::Serialize;

use crate::SharedState;

/// Server information
#[derive(Debug, Serialize)]
pub struct ServerStats {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: String,
}

/// Configured repositories; command lines are not exposed
#[derive(Debug, Serialize)]
pub struct ConfigStats {
    pub total_repositories: usize,
    pub repositories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: ServerStats,
    pub config: ConfigStats,
}

/// GET /status
pub async fn status(AxumState(state): AxumState<SharedState>) -> Json<StatusResponse> {
    let server = ServerStats {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
    };

    let config = ConfigStats {
        total_repositories: state.commands.len(),
        repositories: state
            .commands
            .repositories()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    Json(StatusResponse { server, config })
}
