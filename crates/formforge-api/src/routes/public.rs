//! Anonymous respondent endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use formforge_core::{PublicForm, SubmissionCommand, SubmissionReceipt};

use crate::error::ApiResult;
use crate::extract::{Caller, ClientOrigin};
use crate::models::{ApiResponse, SubmitRequest};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:slug", get(public_form))
        .route("/:slug/submit", post(submit))
}

pub async fn public_form(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<PublicForm>>> {
    let form = state.engine.submissions().public_form(&slug).await?;
    Ok(Json(ApiResponse::success(form)))
}

/// Respondent identity is optional; anonymous submissions are the norm
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ClientOrigin(origin): ClientOrigin,
    caller: Option<Caller>,
    Json(input): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SubmissionReceipt>>)> {
    let command = SubmissionCommand {
        values: input.string_values(),
        honeypot: input.honeypot,
        load_timestamp: input.load_timestamp,
        origin,
        respondent_id: caller.map(|Caller(id)| id),
    };
    let receipt = state.engine.submissions().submit(&slug, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}
