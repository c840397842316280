use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(rename = "llmModel")]
    pub llm_model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Answer one question. Every dispatcher failure maps to a single 500 with a
/// message string; the failure stage survives only in the observability
/// event emitted by the dispatcher.
pub async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("ask", request.id = %request_id);

    let result = state
        .dispatcher
        .handle_question(&request.question)
        .instrument(span)
        .await;

    let response = match result {
        Ok(envelope) => (
            StatusCode::OK,
            Json(AskResponse {
                answer: envelope.answer,
                llm_model: envelope.provider_id,
            }),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    };

    // Buffered telemetry is exported after both branches alike; the caller
    // never waits on it and a flush failure cannot mask the response.
    tokio::task::spawn_blocking(askgate_observability::flush);

    response
}
