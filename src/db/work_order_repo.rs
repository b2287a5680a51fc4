// src/db/work_order_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_foreign_key_violation, AppError},
    models::work_orders::{
        CreateWorkOrderPayload, SubJob, UpdateWorkOrderPayload, WorkOrder, WorkOrderStatus,
    },
    services::sub_job_sync::SubJobValues,
};

#[derive(Clone, Default)]
pub struct WorkOrderRepository;

impl WorkOrderRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CABEÇALHO
    // =========================================================================

    /// Quantas ordens a loja criou no intervalo [start, end).
    pub async fn count_created_between<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM work_orders
            WHERE tenant_id = $1
              AND created_at >= $2::date
              AND created_at < $3::date
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Quantos dos ids (distintos) existem na tabela e são da loja.
    /// `table` é sempre um nome estático do código, nunca do cliente.
    pub async fn count_owned<'e, E>(
        &self,
        executor: E,
        table: &'static str,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE tenant_id = $1 AND id = ANY($2)");

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(tenant_id)
            .bind(ids)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    pub async fn insert_work_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_number: &str,
        total_amount: Decimal,
        payload: &CreateWorkOrderPayload,
    ) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WorkOrder>(
            r#"
            INSERT INTO work_orders (
                tenant_id, order_number, quotation_id, customer_id, title, description,
                work_type_id, delivery_date, notes, total_amount, status, priority
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, 1))
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(order_number)
        .bind(payload.quotation_id)
        .bind(payload.customer_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref())
        .bind(payload.work_type_id)
        .bind(payload.delivery_date)
        .bind(payload.notes.as_deref())
        .bind(total_amount)
        .bind(payload.status)
        .bind(payload.priority)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Work type does not exist"))
    }

    pub async fn list_work_orders<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<WorkOrderStatus>,
    ) -> Result<Vec<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, WorkOrder>(
            r#"
            SELECT * FROM work_orders
            WHERE tenant_id = $1 AND ($2::work_order_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn find_work_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }

    /// Atualiza o cabeçalho. `total_amount` já vem resolvido pelo serviço.
    pub async fn update_work_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        total_amount: Decimal,
        payload: &UpdateWorkOrderPayload,
    ) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WorkOrder>(
            r#"
            UPDATE work_orders SET
                quotation_id = COALESCE($3, quotation_id),
                customer_id = COALESCE($4, customer_id),
                title = COALESCE($5, title),
                description = COALESCE($6, description),
                work_type_id = COALESCE($7, work_type_id),
                delivery_date = COALESCE($8, delivery_date),
                notes = COALESCE($9, notes),
                total_amount = $10,
                status = COALESCE($11, status),
                priority = COALESCE($12, priority),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.quotation_id)
        .bind(payload.customer_id)
        .bind(payload.title.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.work_type_id)
        .bind(payload.delivery_date)
        .bind(payload.notes.as_deref())
        .bind(total_amount)
        .bind(payload.status)
        .bind(payload.priority)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Work type does not exist"))
    }

    pub async fn delete_work_order<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_orders WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  SUB-JOBS
    // =========================================================================

    pub async fn list_sub_jobs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<Vec<SubJob>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SubJob>(
            r#"
            SELECT * FROM sub_jobs
            WHERE tenant_id = $1 AND work_order_id = $2
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn insert_sub_job<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        values: &SubJobValues,
    ) -> Result<SubJob, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SubJob>(
            r#"
            INSERT INTO sub_jobs (
                tenant_id, work_order_id, product_name, department_id, work_step_id,
                color_id, size_id, quantity, production_cost, total_cost, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(&values.product_name)
        .bind(values.department_id)
        .bind(values.work_step_id)
        .bind(values.color_id)
        .bind(values.size_id)
        .bind(values.quantity)
        .bind(values.production_cost)
        .bind(values.total_cost)
        .bind(values.sort_order)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Sub-job references a missing department, step, color or size"))
    }

    pub async fn update_sub_job<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        values: &SubJobValues,
    ) -> Result<SubJob, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SubJob>(
            r#"
            UPDATE sub_jobs SET
                product_name = $3,
                department_id = $4,
                work_step_id = $5,
                color_id = $6,
                size_id = $7,
                quantity = $8,
                production_cost = $9,
                total_cost = $10,
                sort_order = $11,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&values.product_name)
        .bind(values.department_id)
        .bind(values.work_step_id)
        .bind(values.color_id)
        .bind(values.size_id)
        .bind(values.quantity)
        .bind(values.production_cost)
        .bind(values.total_cost)
        .bind(values.sort_order)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Sub-job references a missing department, step, color or size"))
    }

    pub async fn delete_sub_jobs<'e, E>(&self, executor: E, tenant_id: Uuid, ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sub_jobs WHERE tenant_id = $1 AND id = ANY($2)")
            .bind(tenant_id)
            .bind(ids)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_sub_jobs_of_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sub_jobs WHERE tenant_id = $1 AND work_order_id = $2")
            .bind(tenant_id)
            .bind(work_order_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn set_sub_job_sort_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        sub_job_id: Uuid,
        sort_order: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE sub_jobs SET sort_order = $4, updated_at = NOW()
            WHERE tenant_id = $1 AND work_order_id = $2 AND id = $3
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .bind(sub_job_id)
        .bind(sort_order)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LIGAÇÕES COM A FILA
    // =========================================================================

    pub async fn has_queued_jobs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM work_queues wq
                JOIN sub_jobs sj ON sj.id = wq.sub_job_id
                WHERE wq.tenant_id = $1 AND sj.work_order_id = $2
            )
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn delete_queue_entries_for_sub_jobs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sub_job_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_queues WHERE tenant_id = $1 AND sub_job_id = ANY($2)")
            .bind(tenant_id)
            .bind(sub_job_ids)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_queue_entries_of_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM work_queues
            WHERE tenant_id = $1
              AND sub_job_id IN (SELECT id FROM sub_jobs WHERE tenant_id = $1 AND work_order_id = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(work_order_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Apontamentos de sub-jobs apagados continuam existindo, sem o vínculo.
    pub async fn unlink_work_logs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sub_job_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE work_logs SET sub_job_id = NULL, updated_at = NOW()
            WHERE tenant_id = $1 AND sub_job_id = ANY($2)
            "#,
        )
        .bind(tenant_id)
        .bind(sub_job_ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
