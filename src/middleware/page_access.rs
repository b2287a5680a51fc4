// src/middleware/page_access.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::page_access::AccessLevel,
    services::page_access_service::pages,
};

/// Uma página do manifesto.
pub trait PageDef: Send + Sync + 'static {
    fn url() -> &'static str;
}

/// Nível mínimo exigido.
pub trait LevelDef: Send + Sync + 'static {
    fn level() -> AccessLevel;
}

/// Guardião: o cargo do usuário precisa ter pelo menos `L` na página `P`.
/// Deve rodar depois do `tenant_guard` (usa usuário e loja dos extensions).
pub struct RequirePageAccess<P, L>(PhantomData<(P, L)>);

pub type CanView<P> = RequirePageAccess<P, LevelView>;
pub type CanEdit<P> = RequirePageAccess<P, LevelEdit>;
pub type CanCreate<P> = RequirePageAccess<P, LevelCreate>;

impl<P, L, S> FromRequestParts<S> for RequirePageAccess<P, L>
where
    P: PageDef,
    L: LevelDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
        let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)
            .map_err(to_api)?;

        let tenant = parts
            .extensions
            .get::<TenantContext>()
            .ok_or(AppError::TenantHeaderMissing)
            .map_err(to_api)?;

        let granted = app_state
            .page_access_repo
            .member_access_level(user.0.id, tenant.0, P::url())
            .await
            .map_err(to_api)?;

        let required = L::level();
        if !granted.allows(required) {
            tracing::debug!(page = P::url(), %granted, %required, "Acesso à página negado");
            return Err(to_api(AppError::PageAccessDenied { page: P::url(), required }));
        }

        Ok(RequirePageAccess(PhantomData))
    }
}

// ---
// NÍVEIS
// ---

pub struct LevelView;
impl LevelDef for LevelView {
    fn level() -> AccessLevel { AccessLevel::View }
}

pub struct LevelEdit;
impl LevelDef for LevelEdit {
    fn level() -> AccessLevel { AccessLevel::Edit }
}

pub struct LevelCreate;
impl LevelDef for LevelCreate {
    fn level() -> AccessLevel { AccessLevel::Create }
}

// ---
// PÁGINAS (TIPOS)
// ---

macro_rules! page {
    ($name:ident, $url:expr) => {
        pub struct $name;
        impl PageDef for $name {
            fn url() -> &'static str { $url }
        }
    };
}

page!(PageColors, pages::COLORS);
page!(PageSizes, pages::SIZES);
page!(PageWorkTypes, pages::WORK_TYPES);
page!(PageDepartments, pages::DEPARTMENTS);
page!(PageTeams, pages::TEAMS);
page!(PageEmployees, pages::EMPLOYEES);
page!(PageWorkSteps, pages::WORK_STEPS);
page!(PageWorkOrders, pages::WORK_ORDERS);
page!(PageWorkQueues, pages::WORK_QUEUES);
page!(PageWorkLogs, pages::WORK_LOGS);
page!(PagePageAccess, pages::PAGE_ACCESS_MANAGEMENT);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::page_access_service::PAGE_MANIFEST;

    fn in_manifest<P: PageDef>() -> bool {
        PAGE_MANIFEST.iter().any(|page| page.url == P::url())
    }

    #[test]
    fn every_guarded_page_is_in_the_manifest() {
        assert!(in_manifest::<PageColors>());
        assert!(in_manifest::<PageSizes>());
        assert!(in_manifest::<PageWorkTypes>());
        assert!(in_manifest::<PageDepartments>());
        assert!(in_manifest::<PageTeams>());
        assert!(in_manifest::<PageEmployees>());
        assert!(in_manifest::<PageWorkSteps>());
        assert!(in_manifest::<PageWorkOrders>());
        assert!(in_manifest::<PageWorkQueues>());
        assert!(in_manifest::<PageWorkLogs>());
        assert!(in_manifest::<PagePageAccess>());
    }

    #[test]
    fn level_markers_map_to_access_levels() {
        assert_eq!(LevelView::level(), AccessLevel::View);
        assert_eq!(LevelEdit::level(), AccessLevel::Edit);
        assert_eq!(LevelCreate::level(), AccessLevel::Create);
    }
}
