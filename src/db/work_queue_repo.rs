// src/db/work_queue_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        work_orders::{JobStatus, SubJob},
        work_queue::{AvailableSubJob, QueueItemView, WorkQueueEntry},
    },
};

#[derive(Clone, Default)]
pub struct WorkQueueRepository;

impl WorkQueueRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_sub_job<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sub_job_id: Uuid,
    ) -> Result<Option<SubJob>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SubJob>("SELECT * FROM sub_jobs WHERE id = $1 AND tenant_id = $2")
            .bind(sub_job_id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }

    pub async fn insert_entry<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sub_job_id: Uuid,
        team_id: Uuid,
        priority: i32,
    ) -> Result<WorkQueueEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkQueueEntry>(
            r#"
            INSERT INTO work_queues (tenant_id, sub_job_id, team_id, priority, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(sub_job_id)
        .bind(team_id)
        .bind(priority)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Fila da equipe com os dados do sub-job e da ordem, por prioridade.
    pub async fn list_team_queue<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
    ) -> Result<Vec<QueueItemView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, QueueItemView>(
            r#"
            SELECT
                wq.id, wq.team_id, wq.priority, wq.status,
                sj.id AS sub_job_id, sj.product_name, sj.work_step_id, sj.color_id, sj.size_id,
                sj.quantity, sj.production_cost, sj.total_cost,
                wo.id AS work_order_id, wo.order_number, wo.title AS work_order_title, wo.delivery_date
            FROM work_queues wq
            JOIN sub_jobs sj ON sj.id = wq.sub_job_id
            JOIN work_orders wo ON wo.id = sj.work_order_id
            WHERE wq.tenant_id = $1 AND wq.team_id = $2
            ORDER BY wq.priority ASC, wq.created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(team_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn set_priority<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
        id: Uuid,
        priority: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE work_queues SET priority = $4, updated_at = NOW()
            WHERE tenant_id = $1 AND team_id = $2 AND id = $3
            "#,
        )
        .bind(tenant_id)
        .bind(team_id)
        .bind(id)
        .bind(priority)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        status: JobStatus,
    ) -> Result<Option<WorkQueueEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkQueueEntry>(
            r#"
            UPDATE work_queues SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    pub async fn set_sub_job_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sub_job_id: Uuid,
        status: JobStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE sub_jobs SET status = $3, updated_at = NOW() WHERE id = $1 AND tenant_id = $2")
            .bind(sub_job_id)
            .bind(tenant_id)
            .bind(status)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn delete_entry<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_queues WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_team<'e, E>(&self, executor: E, tenant_id: Uuid, team_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_queues WHERE tenant_id = $1 AND team_id = $2")
            .bind(tenant_id)
            .bind(team_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Sub-jobs de uma etapa que ainda podem entrar em fila: ordem liberada
    /// (approved/in_progress) e sub-job não finalizado.
    pub async fn available_sub_jobs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_step_id: Uuid,
    ) -> Result<Vec<AvailableSubJob>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, AvailableSubJob>(
            r#"
            SELECT
                sj.id, sj.work_order_id, wo.order_number, wo.status AS work_order_status,
                sj.product_name, sj.department_id, sj.work_step_id, sj.color_id, sj.size_id,
                sj.quantity, sj.production_cost, sj.total_cost, sj.status, wo.delivery_date
            FROM sub_jobs sj
            JOIN work_orders wo ON wo.id = sj.work_order_id
            WHERE sj.tenant_id = $1
              AND sj.work_step_id = $2
              AND wo.status IN ('approved', 'in_progress')
              AND sj.status NOT IN ('completed', 'cancelled')
            ORDER BY wo.delivery_date ASC, wo.priority ASC, sj.sort_order ASC
            "#,
        )
        .bind(tenant_id)
        .bind(work_step_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }
}
