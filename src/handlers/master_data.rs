// src/handlers/master_data.rs

// Cores, tamanhos e tipos de trabalho: o mesmo CRUD sobre tabelas diferentes.
// A macro gera um módulo de handlers por tabela; a lógica fica no MasterDataService.

macro_rules! lookup_handlers {
    (
        $module:ident,
        kind = $kind:expr,
        page = $page:ty,
        tag = $tag:literal,
        slug = $slug:literal,
        collection = $collection:literal,
        item = $item:literal
    ) => {
        pub mod $module {
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
                    page_access::{CanCreate, CanEdit, CanView},
                    tenancy::TenantContext,
                },
                models::master_data::{CreateLookupPayload, LookupItem, LookupListQuery, UpdateLookupPayload},
            };

            #[utoipa::path(
                get,
                path = $collection,
                tag = $tag,
                operation_id = concat!("list_", $slug),
                params(
                    LookupListQuery,
                    ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
                ),
                responses((status = 200, body = Vec<LookupItem>)),
                security(("api_jwt" = []))
            )]
            pub async fn list(
                State(app_state): State<AppState>,
                locale: Locale,
                user: AuthenticatedUser,
                tenant: TenantContext,
                _guard: CanView<$page>,
                Query(query): Query<LookupListQuery>,
            ) -> Result<impl IntoResponse, ApiError> {
                let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                let items = app_state
                    .master_data_service
                    .list(&mut *rls_conn, $kind, tenant.0, query.active_only.unwrap_or(false))
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok(Json(items))
            }

            #[utoipa::path(
                get,
                path = $item,
                tag = $tag,
                operation_id = concat!("get_", $slug),
                params(
                    ("id" = Uuid, Path),
                    ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
                ),
                responses(
                    (status = 200, body = LookupItem),
                    (status = 404, description = "Não encontrado")
                ),
                security(("api_jwt" = []))
            )]
            pub async fn get_one(
                State(app_state): State<AppState>,
                locale: Locale,
                user: AuthenticatedUser,
                tenant: TenantContext,
                _guard: CanView<$page>,
                Path(id): Path<Uuid>,
            ) -> Result<impl IntoResponse, ApiError> {
                let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                let item = app_state
                    .master_data_service
                    .get(&mut *rls_conn, $kind, tenant.0, id)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok(Json(item))
            }

            #[utoipa::path(
                post,
                path = $collection,
                tag = $tag,
                operation_id = concat!("create_", $slug),
                request_body = CreateLookupPayload,
                params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
                responses(
                    (status = 201, body = LookupItem),
                    (status = 400, description = "Dados inválidos")
                ),
                security(("api_jwt" = []))
            )]
            pub async fn create(
                State(app_state): State<AppState>,
                locale: Locale,
                user: AuthenticatedUser,
                tenant: TenantContext,
                _guard: CanCreate<$page>,
                Json(payload): Json<CreateLookupPayload>,
            ) -> Result<impl IntoResponse, ApiError> {
                payload
                    .validate()
                    .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

                let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                let item = app_state
                    .master_data_service
                    .create(&mut *rls_conn, $kind, tenant.0, &payload)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok((StatusCode::CREATED, Json(item)))
            }

            // PUT e PATCH: campos ausentes ficam como estão
            #[utoipa::path(
                method(put, patch),
                path = $item,
                tag = $tag,
                operation_id = concat!("update_", $slug),
                request_body = UpdateLookupPayload,
                params(
                    ("id" = Uuid, Path),
                    ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
                ),
                responses(
                    (status = 200, body = LookupItem),
                    (status = 404, description = "Não encontrado")
                ),
                security(("api_jwt" = []))
            )]
            pub async fn update(
                State(app_state): State<AppState>,
                locale: Locale,
                user: AuthenticatedUser,
                tenant: TenantContext,
                _guard: CanEdit<$page>,
                Path(id): Path<Uuid>,
                Json(payload): Json<UpdateLookupPayload>,
            ) -> Result<impl IntoResponse, ApiError> {
                payload
                    .validate()
                    .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

                let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                let item = app_state
                    .master_data_service
                    .update(&mut *rls_conn, $kind, tenant.0, id, &payload)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok(Json(item))
            }

            #[utoipa::path(
                delete,
                path = $item,
                tag = $tag,
                operation_id = concat!("delete_", $slug),
                params(
                    ("id" = Uuid, Path),
                    ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
                ),
                responses(
                    (status = 204, description = "Removido"),
                    (status = 404, description = "Não encontrado"),
                    (status = 409, description = "Ainda usado por sub-jobs")
                ),
                security(("api_jwt" = []))
            )]
            pub async fn delete(
                State(app_state): State<AppState>,
                locale: Locale,
                user: AuthenticatedUser,
                tenant: TenantContext,
                _guard: CanEdit<$page>,
                Path(id): Path<Uuid>,
            ) -> Result<impl IntoResponse, ApiError> {
                let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                app_state
                    .master_data_service
                    .delete(&mut *rls_conn, $kind, tenant.0, id)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok(StatusCode::NO_CONTENT)
            }
        }
    };
}

lookup_handlers!(
    colors,
    kind = crate::models::master_data::LookupKind::Color,
    page = crate::middleware::page_access::PageColors,
    tag = "Colors",
    slug = "color",
    collection = "/api/colors",
    item = "/api/colors/{id}"
);

lookup_handlers!(
    sizes,
    kind = crate::models::master_data::LookupKind::Size,
    page = crate::middleware::page_access::PageSizes,
    tag = "Sizes",
    slug = "size",
    collection = "/api/sizes",
    item = "/api/sizes/{id}"
);

lookup_handlers!(
    work_types,
    kind = crate::models::master_data::LookupKind::WorkType,
    page = crate::middleware::page_access::PageWorkTypes,
    tag = "Work Types",
    slug = "work_type",
    collection = "/api/work-types",
    item = "/api/work-types/{id}"
);
