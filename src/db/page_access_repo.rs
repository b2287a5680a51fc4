// src/db/page_access_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::page_access::{AccessLevel, PageAccess, Role},
};

#[derive(Clone)]
pub struct PageAccessRepository {
    pool: PgPool,
}

impl PageAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
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
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (tenant_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, name, description, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "A role with this name already exists"))
    }

    pub async fn list_roles<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, tenant_id, name, description, created_at, updated_at
            FROM roles
            WHERE tenant_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(roles)
    }

    pub async fn role_exists<'e, E>(&self, executor: E, tenant_id: Uuid, role_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(role_id)
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    // --- MATRIZ DE ACESSO ---

    pub async fn list_by_role<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<PageAccess>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, PageAccess>(
            r#"
            SELECT id, tenant_id, role_id, page_url, page_name, access_level, updated_at
            FROM page_access
            WHERE tenant_id = $1 AND role_id = $2
            ORDER BY page_url ASC
            "#,
        )
        .bind(tenant_id)
        .bind(role_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn list_all<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<PageAccess>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, PageAccess>(
            r#"
            SELECT id, tenant_id, role_id, page_url, page_name, access_level, updated_at
            FROM page_access
            WHERE tenant_id = $1
            ORDER BY role_id, page_url ASC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Grava o nível de um cargo numa página; a chave é (role_id, page_url).
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        role_id: Uuid,
        page_url: &str,
        page_name: &str,
        access_level: AccessLevel,
    ) -> Result<PageAccess, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, PageAccess>(
            r#"
            INSERT INTO page_access (tenant_id, role_id, page_url, page_name, access_level)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (role_id, page_url) DO UPDATE SET
                page_name = EXCLUDED.page_name,
                access_level = EXCLUDED.access_level,
                updated_at = NOW()
            RETURNING id, tenant_id, role_id, page_url, page_name, access_level, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(role_id)
        .bind(page_url)
        .bind(page_name)
        .bind(access_level)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Nível efetivo do usuário numa página (via cargo do vínculo ativo).
    /// Sem linha na matriz = `none`.
    pub async fn member_access_level(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        page_url: &str,
    ) -> Result<AccessLevel, AppError> {
        let level = sqlx::query_scalar::<_, AccessLevel>(
            r#"
            SELECT pa.access_level
            FROM tenant_members tm
            JOIN page_access pa ON pa.role_id = tm.role_id AND pa.tenant_id = tm.tenant_id
            WHERE tm.user_id = $1
              AND tm.tenant_id = $2
              AND tm.is_active = true
              AND pa.page_url = $3
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(page_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level.unwrap_or(AccessLevel::None))
    }
}
