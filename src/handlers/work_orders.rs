// src/handlers/work_orders.rs

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
        page_access::{CanCreate, CanEdit, CanView, PageWorkOrders},
        tenancy::TenantContext,
    },
    models::work_orders::{
        CreateWorkOrderPayload, GenerateSubJobsPayload, OrderCountPayload, OrderCountResponse,
        PriceCheckPayload, PriceCheckResult, ReorderSubJobsPayload, SubJob, SubJobDraft,
        UpdateWorkOrderPayload, WorkOrder, WorkOrderDetail, WorkOrderListQuery, WorkOrderUpdateResponse,
    },
};

// =============================================================================
//  CRUD
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/work-orders",
    tag = "Work Orders",
    params(WorkOrderListQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<WorkOrder>)),
    security(("api_jwt" = []))
)]
pub async fn list_work_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkOrders>,
    Query(query): Query<WorkOrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let orders = app_state
        .work_order_service
        .list(&mut *rls_conn, tenant.0, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

/// Cria a ordem com número gerado (JB + AAAAMM + sequência do mês) e os sub-jobs.
#[utoipa::path(
    post,
    path = "/api/work-orders",
    tag = "Work Orders",
    request_body = CreateWorkOrderPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 201, body = WorkOrderDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_work_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageWorkOrders>,
    Json(payload): Json<CreateWorkOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .work_order_service
        .create(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/work-orders/{id}",
    tag = "Work Orders",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = WorkOrderDetail), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_work_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkOrders>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .work_order_service
        .get_detail(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

/// Atualiza o cabeçalho e reconcilia a lista de sub-jobs enviada com a gravada.
#[utoipa::path(
    put,
    path = "/api/work-orders/{id}",
    tag = "Work Orders",
    request_body = UpdateWorkOrderPayload,
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 200, body = WorkOrderUpdateResponse),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_work_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkOrders>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .work_order_service
        .update(&mut *rls_conn, tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/work-orders/{id}",
    tag = "Work Orders",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 204, description = "Removida"), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn delete_work_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkOrders>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .work_order_service
        .delete(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  SUB-JOBS
// =============================================================================

#[utoipa::path(
    put,
    path = "/api/work-orders/{id}/sub-jobs/reorder",
    tag = "Work Orders",
    request_body = ReorderSubJobsPayload,
    params(("id" = Uuid, Path, description = "ID da ordem"), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 200, body = Vec<SubJob>),
        (status = 404, description = "Ordem ou sub-job não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reorder_sub_jobs(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkOrders>,
    Path(work_order_id): Path<Uuid>,
    Json(payload): Json<ReorderSubJobsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sub_jobs = app_state
        .work_order_service
        .reorder_sub_jobs(&mut *rls_conn, tenant.0, work_order_id, &payload.sub_job_ids)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sub_jobs))
}

/// Gera os rascunhos de sub-jobs (departamento x cor x tamanho). Nada é gravado.
#[utoipa::path(
    post,
    path = "/api/work-orders/sub-jobs/generate",
    tag = "Work Orders",
    request_body = GenerateSubJobsPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<SubJobDraft>), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn generate_sub_jobs(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkOrders>,
    Json(payload): Json<GenerateSubJobsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let drafts = app_state
        .work_order_service
        .generate_drafts(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(drafts))
}

// =============================================================================
//  AUXILIARES DO FORMULÁRIO
// =============================================================================

/// Quantas ordens a loja já criou no mês e qual seria o próximo número.
#[utoipa::path(
    post,
    path = "/api/work-orders/count",
    tag = "Work Orders",
    request_body = OrderCountPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = OrderCountResponse), (status = 400, description = "Mês inválido")),
    security(("api_jwt" = []))
)]
pub async fn count_work_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkOrders>,
    Json(payload): Json<OrderCountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let count = app_state
        .work_order_service
        .count_orders(&mut *rls_conn, tenant.0, payload.year, payload.month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(count))
}

/// Compara os sub-jobs do formulário com os gravados antes de salvar.
#[utoipa::path(
    post,
    path = "/api/work-orders/{id}/price-check",
    tag = "Work Orders",
    request_body = PriceCheckPayload,
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = PriceCheckResult), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn price_check(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkOrders>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PriceCheckPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .work_order_service
        .price_check(&mut *rls_conn, tenant.0, id, &payload.sub_jobs)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(result))
}
