// src/handlers/page_access.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
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
        page_access::{CanCreate, CanEdit, CanView, PagePageAccess},
        tenancy::{MemberRole, TenantContext},
    },
    models::page_access::{
        BulkUpdatePageAccessPayload, BulkUpdateResult, CreateRolePayload, PageAccess, PageAccessConfig,
        PageAccessQuery, Role, UpsertPageAccessPayload,
    },
};

// =============================================================================
//  CARGOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Page Access",
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<Role>)),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PagePageAccess>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let roles = app_state
        .page_access_service
        .list_roles(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Page Access",
    request_body = CreateRolePayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 201, body = Role), (status = 409, description = "Nome já usado")),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PagePageAccess>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let role = app_state
        .page_access_service
        .create_role(&mut *rls_conn, tenant.0, &payload.name, payload.description.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(role)))
}

// =============================================================================
//  MATRIZ DE ACESSO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/page-access",
    tag = "Page Access",
    params(PageAccessQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<PageAccess>), (status = 404, description = "Cargo não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_page_access(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PagePageAccess>,
    Query(query): Query<PageAccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entries = app_state
        .page_access_service
        .get_page_access(&mut *rls_conn, tenant.0, query.role_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}

/// Cria ou substitui o nível de um cargo numa página.
#[utoipa::path(
    post,
    path = "/api/page-access",
    tag = "Page Access",
    request_body = UpsertPageAccessPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = PageAccess), (status = 404, description = "Cargo não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn upsert_page_access(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PagePageAccess>,
    Json(payload): Json<UpsertPageAccessPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .page_access_service
        .upsert_page_access(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/api/page-access-management/config",
    tag = "Page Access",
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = PageAccessConfig)),
    security(("api_jwt" = []))
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PagePageAccess>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let config = app_state
        .page_access_service
        .config(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(config))
}

#[utoipa::path(
    post,
    path = "/api/page-access-management/bulk-update",
    tag = "Page Access",
    request_body = BulkUpdatePageAccessPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 200, body = BulkUpdateResult),
        (status = 404, description = "Cargo não encontrado (nada foi gravado)")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_update(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PagePageAccess>,
    Json(payload): Json<BulkUpdatePageAccessPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .page_access_service
        .bulk_update(&mut *rls_conn, tenant.0, &payload.updates)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(result))
}

/// Os níveis do próprio usuário na loja atual (o cliente usa para montar o menu).
#[utoipa::path(
    get,
    path = "/api/page-access/me",
    tag = "Page Access",
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<PageAccess>)),
    security(("api_jwt" = []))
)]
pub async fn get_my_page_access(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    role: MemberRole,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entries = app_state
        .page_access_service
        .get_page_access(&mut *rls_conn, tenant.0, role.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}
