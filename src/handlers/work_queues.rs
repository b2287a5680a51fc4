// src/handlers/work_queues.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        page_access::{CanCreate, CanEdit, CanView, PageWorkQueues},
        tenancy::TenantContext,
    },
    models::work_queue::{
        AddJobToQueuePayload, AvailableSubJob, AvailableSubJobsQuery, ClearQueueResponse, QueueItemView,
        ReorderQueuePayload, UpdateQueueStatusPayload, WorkQueueEntry,
    },
};

const DEFAULT_PRIORITY: i32 = 1;

#[utoipa::path(
    get,
    path = "/api/work-queues/team/{teamId}",
    tag = "Work Queues",
    params(("teamId" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<QueueItemView>), (status = 404, description = "Equipe não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_team_queue(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkQueues>,
    Path(team_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let queue = app_state
        .work_queue_service
        .list_team_queue(&mut *rls_conn, tenant.0, team_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(queue))
}

/// Enfileira um sub-job. A etapa dele precisa ser do departamento da equipe.
#[utoipa::path(
    post,
    path = "/api/work-queues/add-job",
    tag = "Work Queues",
    request_body = AddJobToQueuePayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 201, body = WorkQueueEntry),
        (status = 400, description = "Etapa não pertence à equipe"),
        (status = 404, description = "Sub-job ou equipe não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_job_to_queue(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageWorkQueues>,
    Json(payload): Json<AddJobToQueuePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .work_queue_service
        .add_job_to_queue(
            &mut *rls_conn,
            tenant.0,
            payload.sub_job_id,
            payload.team_id,
            payload.priority.unwrap_or(DEFAULT_PRIORITY),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/work-queues/reorder",
    tag = "Work Queues",
    request_body = ReorderQueuePayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<QueueItemView>), (status = 404, description = "Item fora da fila")),
    security(("api_jwt" = []))
)]
pub async fn reorder_queue(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkQueues>,
    Json(payload): Json<ReorderQueuePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let queue = app_state
        .work_queue_service
        .reorder_queue(&mut *rls_conn, tenant.0, payload.team_id, &payload.item_ids)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(queue))
}

#[utoipa::path(
    delete,
    path = "/api/work-queues/{queueId}",
    tag = "Work Queues",
    params(("queueId" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 204, description = "Removido"), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn remove_from_queue(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkQueues>,
    Path(queue_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .work_queue_service
        .remove_from_queue(&mut *rls_conn, tenant.0, queue_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/work-queues/team/{teamId}/clear",
    tag = "Work Queues",
    params(("teamId" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = ClearQueueResponse)),
    security(("api_jwt" = []))
)]
pub async fn clear_team_queue(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkQueues>,
    Path(team_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let cleared = app_state
        .work_queue_service
        .clear_team_queue(&mut *rls_conn, tenant.0, team_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(cleared))
}

/// Muda o status do item; o sub-job acompanha (exceto `pending`).
#[utoipa::path(
    patch,
    path = "/api/work-queues/{queueId}/status",
    tag = "Work Queues",
    request_body = UpdateQueueStatusPayload,
    params(("queueId" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = WorkQueueEntry), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_queue_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkQueues>,
    Path(queue_id): Path<Uuid>,
    Json(payload): Json<UpdateQueueStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .work_queue_service
        .update_status(&mut *rls_conn, tenant.0, queue_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

/// Sub-jobs de ordens aprovadas/em andamento que ainda podem ir para a fila.
#[utoipa::path(
    get,
    path = "/api/work-queues/available",
    tag = "Work Queues",
    params(AvailableSubJobsQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<AvailableSubJob>)),
    security(("api_jwt" = []))
)]
pub async fn available_sub_jobs(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkQueues>,
    Query(query): Query<AvailableSubJobsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sub_jobs = app_state
        .work_queue_service
        .available_sub_jobs(&mut *rls_conn, tenant.0, query.work_step_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sub_jobs))
}
