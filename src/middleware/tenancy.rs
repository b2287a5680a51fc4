// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{authenticate, AuthenticatedUser},
        i18n::Locale,
    },
};

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// A loja que o usuário está acessando nesta requisição.
// Só existe depois que o `tenant_guard` confirmou o vínculo.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

// Cargo do usuário na loja (vem do vínculo em tenant_members)
#[derive(Debug, Clone, Copy)]
pub struct MemberRole(pub Uuid);

pub fn parse_tenant_header(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get(TENANT_ID_HEADER)
        .ok_or(AppError::TenantHeaderMissing)?;

    let value_str = value.to_str().map_err(|_| AppError::TenantHeaderInvalid)?;

    Uuid::parse_str(value_str.trim()).map_err(|_| AppError::TenantHeaderInvalid)
}

/// Autentica, lê o X-Tenant-ID e exige vínculo ativo do usuário com a loja.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let user = authenticate(&app_state, request.headers()).await.map_err(to_api)?;
    let tenant_id = parse_tenant_header(request.headers()).map_err(to_api)?;

    let membership = app_state
        .tenant_repo
        .find_active_membership(user.id, tenant_id)
        .await
        .map_err(to_api)?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user.id, %tenant_id, "Acesso negado: usuário sem vínculo com a loja");
            to_api(AppError::TenantAccessDenied)
        })?;

    let extensions = request.extensions_mut();
    extensions.insert(AuthenticatedUser(user));
    extensions.insert(TenantContext(tenant_id));
    extensions.insert(MemberRole(membership.role_id));

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::TenantHeaderMissing)
    }
}

impl<S> FromRequestParts<S> for MemberRole
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<MemberRole>()
            .copied()
            .ok_or(AppError::TenantAccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_uuid_from_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());

        assert_eq!(parse_tenant_header(&headers).unwrap(), id);
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = parse_tenant_header(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::TenantHeaderMissing));
    }

    #[test]
    fn malformed_uuid_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("loja-1"));

        let err = parse_tenant_header(&headers).unwrap_err();
        assert!(matches!(err, AppError::TenantHeaderInvalid));
    }
}
