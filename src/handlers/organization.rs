// src/handlers/organization.rs

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
        page_access::{CanCreate, CanEdit, CanView, PageDepartments, PageEmployees, PageTeams, PageWorkSteps},
        tenancy::TenantContext,
    },
    models::organization::{
        CreateDepartmentPayload, CreateEmployeePayload, CreateTeamPayload, CreateWorkStepPayload, Department,
        EmployeeListQuery, EmployeeWithCost, Team, TeamDailyCost, TeamListQuery, UpdateDepartmentPayload,
        UpdateEmployeePayload, UpdateTeamPayload, UpdateWorkStepPayload, WorkStep, WorkStepListQuery,
    },
};

// =============================================================================
//  DEPARTAMENTOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Departments",
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<Department>)),
    security(("api_jwt" = []))
)]
pub async fn list_departments(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageDepartments>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let departments = app_state
        .organization_service
        .list_departments(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Department), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageDepartments>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let department = app_state
        .organization_service
        .get_department(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(department))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Departments",
    request_body = CreateDepartmentPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 201, body = Department), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageDepartments>,
    Json(payload): Json<CreateDepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let department = app_state
        .organization_service
        .create_department(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/departments/{id}",
    tag = "Departments",
    request_body = UpdateDepartmentPayload,
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Department), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageDepartments>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let department = app_state
        .organization_service
        .update_department(&mut *rls_conn, tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(department))
}

/// Remove o departamento junto com pessoal, equipes e etapas dele.
#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Departments",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Etapas ainda usadas por sub-jobs")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageDepartments>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .organization_service
        .delete_department(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  EQUIPES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "Teams",
    params(TeamListQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<Team>)),
    security(("api_jwt" = []))
)]
pub async fn list_teams(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageTeams>,
    Query(query): Query<TeamListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let teams = app_state
        .organization_service
        .list_teams(&mut *rls_conn, tenant.0, query.department_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(teams))
}

#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    tag = "Teams",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Team), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_team(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageTeams>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let team = app_state
        .organization_service
        .get_team(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(team))
}

#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "Teams",
    request_body = CreateTeamPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 201, body = Team), (status = 404, description = "Departamento não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn create_team(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageTeams>,
    Json(payload): Json<CreateTeamPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let team = app_state
        .organization_service
        .create_team(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/teams/{id}",
    tag = "Teams",
    request_body = UpdateTeamPayload,
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Team), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_team(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageTeams>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeamPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let team = app_state
        .organization_service
        .update_team(&mut *rls_conn, tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(team))
}

#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    tag = "Teams",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 204, description = "Removida"), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn delete_team(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageTeams>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .organization_service
        .delete_team(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Soma do custo diário do pessoal ativo da equipe.
#[utoipa::path(
    get,
    path = "/api/teams/{id}/daily-cost",
    tag = "Teams",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = TeamDailyCost), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_team_daily_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageTeams>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let cost = app_state
        .organization_service
        .team_daily_cost(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(cost))
}

// =============================================================================
//  PESSOAL
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    params(EmployeeListQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<EmployeeWithCost>)),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageEmployees>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let employees = app_state
        .organization_service
        .list_employees(&mut *rls_conn, tenant.0, query.team_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = EmployeeWithCost), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageEmployees>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .organization_service
        .get_employee(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(employee))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 201, body = EmployeeWithCost), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageEmployees>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .organization_service
        .create_employee(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/employees/{id}",
    tag = "Employees",
    request_body = UpdateEmployeePayload,
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = EmployeeWithCost), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageEmployees>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .organization_service
        .update_employee(&mut *rls_conn, tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 204, description = "Removido"), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageEmployees>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .organization_service
        .delete_employee(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ETAPAS DE TRABALHO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/work-steps",
    tag = "Work Steps",
    params(WorkStepListQuery, ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = Vec<WorkStep>)),
    security(("api_jwt" = []))
)]
pub async fn list_work_steps(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkSteps>,
    Query(query): Query<WorkStepListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let steps = app_state
        .organization_service
        .list_work_steps(&mut *rls_conn, tenant.0, query.department_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(steps))
}

#[utoipa::path(
    get,
    path = "/api/work-steps/{id}",
    tag = "Work Steps",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = WorkStep), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_work_step(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanView<PageWorkSteps>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let step = app_state
        .organization_service
        .get_work_step(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(step))
}

#[utoipa::path(
    post,
    path = "/api/work-steps",
    tag = "Work Steps",
    request_body = CreateWorkStepPayload,
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 201, body = WorkStep), (status = 404, description = "Departamento não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn create_work_step(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanCreate<PageWorkSteps>,
    Json(payload): Json<CreateWorkStepPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let step = app_state
        .organization_service
        .create_work_step(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(step)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/work-steps/{id}",
    tag = "Work Steps",
    request_body = UpdateWorkStepPayload,
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses((status = 200, body = WorkStep), (status = 404, description = "Não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn update_work_step(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkSteps>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkStepPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let step = app_state
        .organization_service
        .update_work_step(&mut *rls_conn, tenant.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(step))
}

#[utoipa::path(
    delete,
    path = "/api/work-steps/{id}",
    tag = "Work Steps",
    params(("id" = Uuid, Path), ("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    responses(
        (status = 204, description = "Removida"),
        (status = 404, description = "Não encontrada"),
        (status = 409, description = "Ainda usada por sub-jobs")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_work_step(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: CanEdit<PageWorkSteps>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .organization_service
        .delete_work_step(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
