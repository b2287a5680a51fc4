// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenantRepository,
    models::tenancy::Tenant,
    services::page_access_service::PageAccessService,
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    page_access_service: PageAccessService,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl TenantService {
    pub fn new(tenant_repo: TenantRepository, page_access_service: PageAccessService, pool: PgPool) -> Self {
        Self { tenant_repo, page_access_service, pool }
    }

    /// Cria a loja e, na mesma transação, o cargo "Owner" com acesso total
    /// e o vínculo do usuário criador com esse cargo.
    pub async fn create_tenant_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Tenant, AppError> {
        let mut tx = self.pool.begin().await?;

        let tenant = self.tenant_repo.create_tenant(&mut *tx, name, description).await?;

        let owner_role = self.page_access_service.seed_owner_role(&mut *tx, tenant.id).await?;

        self.tenant_repo
            .add_member(&mut *tx, owner_id, tenant.id, owner_role.id)
            .await?;

        tx.commit().await?;

        tracing::info!(tenant_id = %tenant.id, %owner_id, "Nova loja criada");
        Ok(tenant)
    }

    pub async fn list_user_tenants(&self, user_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        self.tenant_repo.list_user_tenants(user_id).await
    }
}
