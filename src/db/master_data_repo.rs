// src/db/master_data_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_foreign_key_violation, map_unique_violation, AppError},
    models::master_data::{CreateLookupPayload, LookupItem, LookupKind, UpdateLookupPayload},
};

// Cores, tamanhos e tipos de trabalho compartilham o mesmo SQL.
// O nome da tabela vem de `LookupKind::table()` (estático), nunca do cliente.
#[derive(Clone, Default)]
pub struct MasterDataRepository;

impl MasterDataRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<LookupItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT * FROM {}
            WHERE tenant_id = $1 AND ($2 = false OR is_active = true)
            ORDER BY sort_order ASC, name ASC
            "#,
            kind.table()
        );

        let items = sqlx::query_as::<_, LookupItem>(&sql)
            .bind(tenant_id)
            .bind(active_only)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<LookupItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND tenant_id = $2", kind.table());

        let item = sqlx::query_as::<_, LookupItem>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(item)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        payload: &CreateLookupPayload,
    ) -> Result<LookupItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO {} (tenant_id, name, code, description, sort_order, is_active)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, true))
            RETURNING *
            "#,
            kind.table()
        );

        sqlx::query_as::<_, LookupItem>(&sql)
            .bind(tenant_id)
            .bind(&payload.name)
            .bind(payload.code.as_deref())
            .bind(payload.description.as_deref())
            .bind(payload.sort_order)
            .bind(payload.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, kind.label()))
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateLookupPayload,
    ) -> Result<Option<LookupItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE {} SET
                name = COALESCE($3, name),
                code = COALESCE($4, code),
                description = COALESCE($5, description),
                sort_order = COALESCE($6, sort_order),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
            kind.table()
        );

        let item = sqlx::query_as::<_, LookupItem>(&sql)
            .bind(id)
            .bind(tenant_id)
            .bind(payload.name.as_deref())
            .bind(payload.code.as_deref())
            .bind(payload.description.as_deref())
            .bind(payload.sort_order)
            .bind(payload.is_active)
            .fetch_optional(executor)
            .await?;

        Ok(item)
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND tenant_id = $2", kind.table());

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await
            .map_err(|e| map_foreign_key_violation(e, kind.label()))?;

        Ok(result.rows_affected() > 0)
    }
}
