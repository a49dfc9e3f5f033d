//! Field endpoints, nested under a form version

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use formforge_core::{Field, FieldChanges, FieldId, FieldOrder, FieldSpec, FormId};

use crate::error::ApiResult;
use crate::extract::Caller;
use crate::models::ApiResponse;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_fields).post(create_field))
        .route("/reorder", put(reorder_fields))
        .route("/:field_id", put(update_field).delete(delete_field))
}

pub async fn list_fields(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(form_id): Path<FormId>,
) -> ApiResult<Json<ApiResponse<Vec<Field>>>> {
    let fields = state.engine.fields().list_fields(form_id, owner).await?;
    Ok(Json(ApiResponse::success(fields)))
}

pub async fn create_field(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(form_id): Path<FormId>,
    Json(spec): Json<FieldSpec>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Field>>)> {
    let field = state.engine.fields().create_field(form_id, owner, spec).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(field))))
}

pub async fn update_field(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path((form_id, field_id)): Path<(FormId, FieldId)>,
    Json(changes): Json<FieldChanges>,
) -> ApiResult<Json<ApiResponse<Field>>> {
    let field = state
        .engine
        .fields()
        .update_field(form_id, field_id, owner, changes)
        .await?;
    Ok(Json(ApiResponse::success(field)))
}

pub async fn delete_field(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path((form_id, field_id)): Path<(FormId, FieldId)>,
) -> ApiResult<StatusCode> {
    state.engine.fields().delete_field(form_id, field_id, owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_fields(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(form_id): Path<FormId>,
    Json(order): Json<Vec<FieldOrder>>,
) -> ApiResult<Json<ApiResponse<Vec<Field>>>> {
    let fields = state
        .engine
        .fields()
        .reorder_fields(form_id, owner, order)
        .await?;
    Ok(Json(ApiResponse::success(fields)))
}
