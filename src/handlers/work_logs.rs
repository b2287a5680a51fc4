// src/handlers/work_logs.rs

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
        page_access::{CanCreate, CanEdit, CanView, PageWorkLogs},
        tenancy::TenantContext,
    },
    models::work_logs::{CreateWorkLogPayload, DailyReport, DailyReportQuery, WorkLog, WorkLogListQuery},
};

#[utoipa::path(
    get,
    path = "/api/work-logs",
    tag = "Work Logs",
    params(WorkLogListQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<WorkLog>)),
    security(("api_jwt" = []))
)]
pub async fn list_work_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkLogs>,
    Query(query): Query<WorkLogListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let logs = app_state
        .work_log_service
        .list(&mut *rls_conn, tenant.0, query.date, query.team_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(logs))
}

#[utoipa::path(
    post,
    path = "/api/work-logs",
    tag = "Work Logs",
    request_body = CreateWorkLogPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 201, body = WorkLog), (status = 404, description = "Equipe não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn create_work_log(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageWorkLogs>,
    Json(payload): Json<CreateWorkLogPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let log = app_state
        .work_log_service
        .create(&mut *rls_conn, tenant.0, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    delete,
    path = "/api/work-logs/{id}",
    tag = "Work Logs",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 204, description = "Removido"), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_work_log(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkLogs>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .work_log_service
        .delete(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Produção e custo de mão de obra por equipe no dia.
#[utoipa::path(
    get,
    path = "/api/work-logs/daily-report",
    tag = "Work Logs",
    params(DailyReportQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = DailyReport)),
    security(("api_jwt" = []))
)]
pub async fn daily_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkLogs>,
    Query(query): Query<DailyReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .work_log_service
        .daily_report(&mut *rls_conn, tenant.0, query.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(report))
}
