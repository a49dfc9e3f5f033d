//! Captured response endpoints, nested under a form version

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use formforge_core::{FormId, Page, ResponseDetails, ResponseId, ResponseSummary};

use crate::error::ApiResult;
use crate::extract::Caller;
use crate::models::*;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_responses))
        .route("/export", get(export_csv))
        .route("/filter", post(filter_responses))
        .route("/:response_id", get(get_response).delete(delete_response))
}

pub async fn list_responses(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(form_id): Path<FormId>,
    Query(params): Query<ListResponsesParams>,
) -> ApiResult<Json<ApiResponse<Page<ResponseSummary>>>> {
    let page = state
        .engine
        .responses()
        .list_responses(form_id, owner, params.into())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn get_response(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path((form_id, response_id)): Path<(FormId, ResponseId)>,
) -> ApiResult<Json<ApiResponse<ResponseDetails>>> {
    let details = state
        .engine
        .responses()
        .get_response(form_id, response_id, owner)
        .await?;
    Ok(Json(ApiResponse::success(details)))
}

pub async fn delete_response(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path((form_id, response_id)): Path<(FormId, ResponseId)>,
) -> ApiResult<StatusCode> {
    state
        .engine
        .responses()
        .delete_response(form_id, response_id, owner)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(form_id): Path<FormId>,
) -> ApiResult<impl IntoResponse> {
    let csv = state.engine.responses().export_csv(form_id, owner).await?;
    let disposition = format!("attachment; filename=\"form-{}-responses.csv\"", form_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

pub async fn filter_responses(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(form_id): Path<FormId>,
    Json(input): Json<FilterRequest>,
) -> ApiResult<Json<ApiResponse<Vec<ResponseSummary>>>> {
    let hits = state
        .engine
        .responses()
        .filter_by_field(form_id, owner, input.field_id, input.filter)
        .await?;
    Ok(Json(ApiResponse::success(hits)))
}
