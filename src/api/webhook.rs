//! Webhook handler for Docker Hub build notifications

use axum::{Json, body::Bytes, extract::State as AxumState, http::StatusCode};
use tracing::{Instrument, Span, debug, error, field, info, info_span, warn};
use uuid::Uuid;

use crate::SharedState;
use crate::error::AutodockError;
use crate::runner::run_command;
use crate::webhook::{DockerHubPayload, InvocationState, StateBody, salvage_callback_url};

type WebhookResponse = (StatusCode, Json<StateBody>);

/// Handles the Docker Hub webhook. Any method is accepted.
///
/// The matching command runs inline; the response and the optional callback
/// are sent once it has finished.
pub async fn handle_webhook(AxumState(state): AxumState<SharedState>, body: Bytes) -> WebhookResponse {
    let span = info_span!("webhook", invocation = %Uuid::now_v7(), repo = field::Empty);
    process_webhook(state, body).instrument(span).await
}

async fn process_webhook(state: SharedState, body: Bytes) -> WebhookResponse {
    let payload = match DockerHubPayload::decode(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Unable to read payload as JSON: {}", e);
            let callback = salvage_callback_url(&body);
            return finish(&state, callback.as_deref(), InvocationState::Error, StatusCode::BAD_REQUEST)
                .await;
        }
    };
    debug!("{:?}", payload);

    let repo = payload.repo_name();
    Span::current().record("repo", repo);
    let callback = payload.callback();

    let Some(command) = state.commands.get(repo) else {
        warn!("Repository '{}' not enabled", repo);
        return finish(&state, callback, InvocationState::Failure, StatusCode::NOT_FOUND).await;
    };

    info!("Processing '{}'", repo);

    let (outcome, status) = match run_command(command, state.settings.command_timeout).await {
        Ok(_) => (InvocationState::Success, StatusCode::OK),
        Err(e @ AutodockError::CommandTimeout(_)) => {
            error!("Command for '{}' failed: {}", repo, e);
            (InvocationState::Error, StatusCode::GATEWAY_TIMEOUT)
        }
        Err(e) => {
            error!("Command for '{}' failed: {}", repo, e);
            (InvocationState::Error, StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    finish(&state, callback, outcome, status).await
}

/// Reports `outcome` to the callback, if any, and builds the response.
/// A failed callback is logged and does not change the response.
async fn finish(
    state: &SharedState,
    callback: Option<&str>,
    outcome: InvocationState,
    status: StatusCode,
) -> WebhookResponse {
    if let Some(url) = callback {
        if let Err(e) = state.reporter.report(url, outcome).await {
            error!("Could not notify {}: {}", url, e);
        }
    }

    (status, Json(StateBody::from(outcome)))
}
