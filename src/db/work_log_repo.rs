// src/db/work_log_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_foreign_key_violation, AppError},
    models::work_logs::{CreateWorkLogPayload, TeamLogTotals, WorkLog},
};

#[derive(Clone, Default)]
pub struct WorkLogRepository;

impl WorkLogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        date: Option<NaiveDate>,
        team_id: Option<Uuid>,
    ) -> Result<Vec<WorkLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, WorkLog>(
            r#"
            SELECT * FROM work_logs
            WHERE tenant_id = $1
              AND ($2::date IS NULL OR work_date = $2)
              AND ($3::uuid IS NULL OR team_id = $3)
            ORDER BY work_date DESC, created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(date)
        .bind(team_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        created_by: Uuid,
        payload: &CreateWorkLogPayload,
    ) -> Result<WorkLog, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WorkLog>(
            r#"
            INSERT INTO work_logs (
                tenant_id, team_id, sub_job_id, work_date,
                quantity_completed, hours_worked, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.team_id)
        .bind(payload.sub_job_id)
        .bind(payload.work_date)
        .bind(payload.quantity_completed)
        .bind(payload.hours_worked)
        .bind(payload.notes.as_deref())
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Team or sub-job does not exist"))
    }

    pub async fn sub_job_exists<'e, E>(&self, executor: E, tenant_id: Uuid, sub_job_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sub_jobs WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(sub_job_id)
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_logs WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soma os apontamentos do dia por equipe.
    pub async fn daily_totals<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TeamLogTotals>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TeamLogTotals>(
            r#"
            SELECT
                t.id AS team_id,
                t.name AS team_name,
                COUNT(wl.id) AS entries,
                COALESCE(SUM(wl.quantity_completed), 0)::BIGINT AS quantity_completed,
                COALESCE(SUM(wl.hours_worked), 0) AS hours_worked
            FROM work_logs wl
            JOIN teams t ON t.id = wl.team_id
            WHERE wl.tenant_id = $1 AND wl.work_date = $2
            GROUP BY t.id, t.name
            ORDER BY t.name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(date)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }
}
