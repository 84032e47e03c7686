use axum::{extract::State, routing::post, Json, Router};
use bytes::Bytes;
use tracing::{error, instrument, warn};

use crate::{
    alunos::{
        dto::{LoginRequest, LoginResponse},
        services::authenticate,
    },
    errors::ApiError,
    state::AppState,
};

pub fn login_routes() -> Router<AppState> {
    Router::new().route(
        "/api/alunos/loginaluno",
        post(login_aluno).fallback(method_not_allowed),
    )
}

#[instrument(skip(state, body))]
pub async fn login_aluno(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let payload = parse_login(&body).map_err(|e| {
        warn!(error = %e, "invalid login payload");
        ApiError::BadRequest
    })?;

    match authenticate(
        state.store.as_ref(),
        &payload.email,
        &payload.senha,
        state.config.name_fallback,
    )
    .await
    {
        Ok(aluno) => Ok(Json(aluno.into())),
        Err(ApiError::Internal(e)) => {
            let chain = format!("{e:#}");
            error!(error = %chain, "loginaluno failed");
            Err(ApiError::Internal(e))
        }
        Err(e) => Err(e),
    }
}

/// Only a JSON object with string `email` and `senha` is accepted.
fn parse_login(body: &[u8]) -> serde_json::Result<LoginRequest> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
    serde_json::from_value(serde_json::Value::Object(object))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
