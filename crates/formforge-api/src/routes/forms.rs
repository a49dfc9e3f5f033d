//! Form version lifecycle endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use formforge_core::{
    CreateFormCommand, Form, FormDetails, FormId, FormSummary, Page, UpdateFormCommand,
};

use crate::error::ApiResult;
use crate::extract::Caller;
use crate::models::*;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_forms).post(create_form))
        .route("/:form_id", get(get_form).put(update_form).delete(delete_form))
        .route("/:form_id/versions", get(list_versions))
        .route("/:form_id/draft", post(create_draft))
        .route("/:form_id/publish", post(publish_form))
        .route("/:form_id/archive", post(archive_form))
}

pub async fn list_forms(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Query(params): Query<ListFormsParams>,
) -> ApiResult<Json<ApiResponse<Page<FormSummary>>>> {
    let page = state
        .engine
        .forms()
        .list_forms(owner, params.status, params.page_request())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_form(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Json(input): Json<CreateFormCommand>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Form>>)> {
    let form = state.engine.forms().create_form(owner, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(form))))
}

pub async fn get_form(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
) -> ApiResult<Json<ApiResponse<FormDetails>>> {
    let details = state.engine.forms().get_form(id, owner).await?;
    Ok(Json(ApiResponse::success(details)))
}

pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
    Json(input): Json<UpdateFormCommand>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state.engine.forms().update_form(id, owner, input).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
) -> ApiResult<StatusCode> {
    state.engine.forms().delete_form(id, owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
) -> ApiResult<Json<ApiResponse<Vec<FormSummary>>>> {
    let versions = state.engine.forms().list_versions(id, owner).await?;
    Ok(Json(ApiResponse::success(versions)))
}

pub async fn create_draft(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Form>>)> {
    let draft = state.engine.forms().create_draft(id, owner).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(draft))))
}

pub async fn publish_form(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state.engine.forms().publish_form(id, owner).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn archive_form(
    State(state): State<Arc<AppState>>,
    Caller(owner): Caller,
    Path(id): Path<FormId>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state.engine.forms().archive_form(id, owner).await?;
    Ok(Json(ApiResponse::success(form)))
}
