use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
};
use database::Store;
use pagination::Page;
use scheduling::{
    Params, Resource, ScheduleDetail, TableCount, TeamDetail, TemplateDetail,
};
use serde_json::{Value, json};
use std::sync::Arc;

type Shared<S> = State<Arc<AppState<S>>>;

/// # GET /api/{collection}
/// One page of the collection. Accepts `page`/`pageSize` or `limit`/`offset`
/// plus the collection's filters.
pub async fn list<S: Store, R: Resource>(
    State(state): Shared<S>,
    query: Result<Query<Params>, QueryRejection>,
) -> Result<Json<Page<R>>, AppError> {
    let Query(params) = query?;
    let page = state.service.list::<R>(&params).await?;
    Ok(Json(page))
}

/// # POST /api/{collection}
pub async fn create<S: Store, R: Resource>(
    State(state): Shared<S>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let Json(draft) = payload?;
    let created = state.service.create::<R>(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// # GET /api/{collection}/:id
pub async fn fetch<S: Store, R: Resource>(
    path: Result<Path<i64>, PathRejection>,
    State(state): Shared<S>,
) -> Result<Json<R>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.service.get::<R>(id).await?))
}

/// # PATCH /api/{collection}/:id
/// Only the fields present in the body change; an explicit `null` clears a
/// nullable field.
pub async fn update<S: Store, R: Resource>(
    path: Result<Path<i64>, PathRejection>,
    State(state): Shared<S>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, AppError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.service.update::<R>(id, patch).await?))
}

/// # DELETE /api/{collection}/:id
/// Refused with 409 while live records still reference the target.
pub async fn remove<S: Store, R: Resource>(
    path: Result<Path<i64>, PathRejection>,
    State(state): Shared<S>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    state.service.delete::<R>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// # GET /api/schedules/:id/shifts
pub async fn schedule_shifts<S: Store>(
    path: Result<Path<i64>, PathRejection>,
    State(state): Shared<S>,
) -> Result<Json<ScheduleDetail>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.service.schedule_detail(id).await?))
}

/// # GET /api/shift-templates/:id/week
pub async fn template_week<S: Store>(
    path: Result<Path<i64>, PathRejection>,
    State(state): Shared<S>,
) -> Result<Json<TemplateDetail>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.service.template_detail(id).await?))
}

/// # GET /api/teams/:id/members
pub async fn team_members<S: Store>(
    path: Result<Path<i64>, PathRejection>,
    State(state): Shared<S>,
) -> Result<Json<TeamDetail>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.service.team_detail(id).await?))
}

/// # POST /api/admin/seed
/// Fails with 409 unless the store is empty.
pub async fn seed<S: Store>(
    State(state): Shared<S>,
) -> Result<(StatusCode, Json<Vec<TableCount>>), AppError> {
    let counts = state.service.lifecycle().seed().await?;
    Ok((StatusCode::CREATED, Json(counts)))
}

/// # POST /api/admin/reset
pub async fn reset<S: Store>(State(state): Shared<S>) -> Result<StatusCode, AppError> {
    state.service.lifecycle().reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// # POST /api/admin/reset-and-seed
pub async fn reset_and_seed<S: Store>(
    State(state): Shared<S>,
) -> Result<Json<Vec<TableCount>>, AppError> {
    Ok(Json(state.service.lifecycle().reset_and_seed().await?))
}

/// # GET /api/admin/status
pub async fn status<S: Store>(
    State(state): Shared<S>,
) -> Result<Json<Vec<TableCount>>, AppError> {
    Ok(Json(state.service.lifecycle().status().await?))
}

/// # GET /api/health
/// 503 when the store cannot be reached.
pub async fn health<S: Store>(State(state): Shared<S>) -> Result<Json<Value>, AppError> {
    state.service.health().await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Any path outside the routes above.
pub async fn fallback(uri: Uri) -> AppError {
    AppError::NoRoute(uri.path().to_string())
}
