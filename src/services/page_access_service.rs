// src/services/page_access_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PageAccessRepository,
    models::page_access::{
        AccessLevel, BulkUpdateResult, PageAccess, PageAccessConfig, PageDefinition, Role,
        UpsertPageAccessPayload,
    },
};

// =============================================================================
//  MANIFESTO DE PÁGINAS
// =============================================================================
// Lista fechada das telas do cliente. O cliente usa o mesmo arquivo;
// qualquer página nova entra aqui e incrementa a versão.

pub const MANIFEST_VERSION: u32 = 1;

pub mod pages {
    pub const WORK_ORDERS: &str = "/work-orders";
    pub const WORK_QUEUES: &str = "/work-queues";
    pub const WORK_LOGS: &str = "/work-logs";
    pub const DEPARTMENTS: &str = "/departments";
    pub const TEAMS: &str = "/teams";
    pub const EMPLOYEES: &str = "/employees";
    pub const WORK_STEPS: &str = "/work-steps";
    pub const COLORS: &str = "/colors";
    pub const SIZES: &str = "/sizes";
    pub const WORK_TYPES: &str = "/work-types";
    pub const PAGE_ACCESS_MANAGEMENT: &str = "/page-access-management";
}

pub const PAGE_MANIFEST: &[PageDefinition] = &[
    PageDefinition { url: pages::WORK_ORDERS, name: "Work Orders", group: "Production" },
    PageDefinition { url: pages::WORK_QUEUES, name: "Work Queues", group: "Production" },
    PageDefinition { url: pages::WORK_LOGS, name: "Daily Work Logs", group: "Production" },
    PageDefinition { url: pages::DEPARTMENTS, name: "Departments", group: "Organization" },
    PageDefinition { url: pages::TEAMS, name: "Teams", group: "Organization" },
    PageDefinition { url: pages::EMPLOYEES, name: "Employees", group: "Organization" },
    PageDefinition { url: pages::WORK_STEPS, name: "Work Steps", group: "Organization" },
    PageDefinition { url: pages::COLORS, name: "Colors", group: "Master Data" },
    PageDefinition { url: pages::SIZES, name: "Sizes", group: "Master Data" },
    PageDefinition { url: pages::WORK_TYPES, name: "Work Types", group: "Master Data" },
    PageDefinition { url: pages::PAGE_ACCESS_MANAGEMENT, name: "Page Access", group: "Administration" },
];

pub const OWNER_ROLE_NAME: &str = "Owner";

/// Página do manifesto para a URL; fora dele não se grava acesso.
pub fn manifest_page(url: &str) -> Result<&'static PageDefinition, AppError> {
    PAGE_MANIFEST
        .iter()
        .find(|page| page.url == url)
        .ok_or_else(|| AppError::BadRequest(format!("page '{url}' is not in the page manifest")))
}

#[derive(Clone)]
pub struct PageAccessService {
    repo: PageAccessRepository,
}

impl PageAccessService {
    pub fn new(repo: PageAccessRepository) -> Self {
        Self { repo }
    }

    // --- CARGOS ---

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_role(executor, tenant_id, name, description).await
    }

    pub async fn list_roles<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_roles(executor, tenant_id).await
    }

    /// Cria o cargo "Owner" com `create` em todas as páginas do manifesto.
    /// Roda na transação de quem chamou (criação da loja).
    pub async fn seed_owner_role<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let role = self
            .repo
            .create_role(&mut *tx, tenant_id, OWNER_ROLE_NAME, Some("Full access (created with the tenant)"))
            .await?;

        for page in PAGE_MANIFEST {
            self.repo
                .upsert(&mut *tx, tenant_id, role.id, page.url, page.name, AccessLevel::Create)
                .await?;
        }

        tx.commit().await?;
        Ok(role)
    }

    // --- MATRIZ ---

    pub async fn get_page_access<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<PageAccess>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if !self.repo.role_exists(&mut *tx, tenant_id, role_id).await? {
            return Err(AppError::ResourceNotFound("Role".into()));
        }

        let entries = self.repo.list_by_role(&mut *tx, tenant_id, role_id).await?;
        tx.commit().await?;
        Ok(entries)
    }

    pub async fn upsert_page_access<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &UpsertPageAccessPayload,
    ) -> Result<PageAccess, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let page = manifest_page(&payload.page_url)?;
        let mut tx = executor.begin().await?;

        if !self.repo.role_exists(&mut *tx, tenant_id, payload.role_id).await? {
            return Err(AppError::ResourceNotFound("Role".into()));
        }

        let entry = self
            .repo
            .upsert(&mut *tx, tenant_id, payload.role_id, page.url, page.name, payload.access_level)
            .await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Aplica todas as linhas numa única transação: ou entram todas, ou nenhuma.
    pub async fn bulk_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        updates: &[UpsertPageAccessPayload],
    ) -> Result<BulkUpdateResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let mut entries = Vec::with_capacity(updates.len());

        for update in updates {
            let page = manifest_page(&update.page_url)?;
            if !self.repo.role_exists(&mut *tx, tenant_id, update.role_id).await? {
                return Err(AppError::ResourceNotFound("Role".into()));
            }

            let entry = self
                .repo
                .upsert(&mut *tx, tenant_id, update.role_id, page.url, page.name, update.access_level)
                .await?;
            entries.push(entry);
        }

        tx.commit().await?;

        tracing::info!(%tenant_id, updated = entries.len(), "Matriz de acesso atualizada em lote");

        Ok(BulkUpdateResult { updated: entries.len(), entries })
    }

    /// Tudo que a tela de gestão de acesso precisa numa chamada.
    pub async fn config<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<PageAccessConfig, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let roles = self.repo.list_roles(&mut *tx, tenant_id).await?;
        let entries = self.repo.list_all(&mut *tx, tenant_id).await?;
        tx.commit().await?;

        Ok(PageAccessConfig {
            manifest_version: MANIFEST_VERSION,
            pages: PAGE_MANIFEST.to_vec(),
            roles,
            access_levels: AccessLevel::ALL.to_vec(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing;
    use sqlx::PgPool;
    use std::collections::HashSet;

    #[test]
    fn manifest_urls_are_unique() {
        let urls: HashSet<&str> = PAGE_MANIFEST.iter().map(|p| p.url).collect();
        assert_eq!(urls.len(), PAGE_MANIFEST.len());
    }

    #[test]
    fn manifest_urls_are_absolute_paths() {
        assert!(PAGE_MANIFEST.iter().all(|p| p.url.starts_with('/') && !p.name.is_empty()));
    }

    #[test]
    fn manifest_lookup_rejects_unknown_pages() {
        assert_eq!(manifest_page(pages::WORK_QUEUES).map(|p| p.name).ok(), Some("Work Queues"));
        assert!(matches!(manifest_page("/admin/secret"), Err(AppError::BadRequest(_))));
    }

    // --- contra o banco ---

    fn service(pool: &PgPool) -> PageAccessService {
        PageAccessService::new(PageAccessRepository::new(pool.clone()))
    }

    fn grant(role_id: Uuid, page_url: &str, access_level: AccessLevel) -> UpsertPageAccessPayload {
        UpsertPageAccessPayload {
            role_id,
            page_url: page_url.to_string(),
            page_name: None,
            access_level,
        }
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn upsert_updates_the_row_of_role_and_page(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service(&pool);
        let role = svc.create_role(&pool, f.tenant_id, "Costura", None).await?;

        let mut renamed = grant(role.id, pages::WORK_ORDERS, AccessLevel::View);
        renamed.page_name = Some("Outro nome".to_string());
        let first = svc.upsert_page_access(&pool, f.tenant_id, &renamed).await?;
        let second = svc
            .upsert_page_access(&pool, f.tenant_id, &grant(role.id, pages::WORK_ORDERS, AccessLevel::Edit))
            .await?;

        assert_eq!(first.id, second.id);
        assert_eq!(first.page_name, "Work Orders");
        assert_eq!(second.access_level, AccessLevel::Edit);
        assert_eq!(svc.get_page_access(&pool, f.tenant_id, role.id).await?.len(), 1);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn upsert_rejects_page_outside_the_manifest(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service(&pool);
        let role = svc.create_role(&pool, f.tenant_id, "Costura", None).await?;

        let err = svc
            .upsert_page_access(&pool, f.tenant_id, &grant(role.id, "/relatorios-secretos", AccessLevel::Create))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(svc.get_page_access(&pool, f.tenant_id, role.id).await?.is_empty());
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn bulk_update_with_unknown_role_changes_nothing(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service(&pool);
        let role = svc.create_role(&pool, f.tenant_id, "Costura", None).await?;

        let err = svc
            .bulk_update(
                &pool,
                f.tenant_id,
                &[
                    grant(role.id, pages::COLORS, AccessLevel::View),
                    grant(Uuid::new_v4(), pages::SIZES, AccessLevel::View),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ResourceNotFound(_)));
        assert!(svc.get_page_access(&pool, f.tenant_id, role.id).await?.is_empty());
        Ok(())
    }
}
