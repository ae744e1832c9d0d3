//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info, warn};

use super::responses::{ApiResponse, ErrorResponse, HealthResponse, StatusResponse};
use crate::{
    error::{ControlError, TimerError},
    state::{AppState, ControlIntent},
    timer::SettingsPatch,
};

type HandlerResult = Result<Json<ApiResponse>, (StatusCode, Json<ErrorResponse>)>;

/// Handle POST /start - Start a new run
pub async fn start_handler(State(state): State<Arc<AppState>>) -> HandlerResult {
    forward(&state, ControlIntent::Start).await
}

/// Handle POST /pause - Pause the current run
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> HandlerResult {
    forward(&state, ControlIntent::Pause).await
}

/// Handle POST /resume - Resume a paused run
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> HandlerResult {
    forward(&state, ControlIntent::Resume).await
}

/// Handle POST /stop - Stop and reset the timer
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> HandlerResult {
    forward(&state, ControlIntent::Stop).await
}

/// Handle PUT /settings - Reconfigure a stopped timer; omitted fields are kept
pub async fn settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> HandlerResult {
    forward(&state, ControlIntent::Configure(patch)).await
}

async fn forward(state: &AppState, intent: ControlIntent) -> HandlerResult {
    let action = intent.action();
    match state.control(intent).await {
        Ok(timer) => {
            info!("{} endpoint called - timer is {}", action, timer.label);
            Ok(Json(ApiResponse::new(
                format!("{} accepted", action),
                timer,
            )))
        }
        Err(e) => {
            let code = status_code(&e);
            if code.is_server_error() {
                error!("Failed to {} timer: {}", action, e);
            } else {
                warn!("Rejected {} request: {}", action, e);
            }
            Err((code, Json(ErrorResponse::new(e.to_string()))))
        }
    }
}

fn status_code(error: &ControlError) -> StatusCode {
    match error {
        ControlError::Timer(TimerError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
        ControlError::Timer(TimerError::IllegalState { .. }) => StatusCode::CONFLICT,
        ControlError::DriverGone => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer_status(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
