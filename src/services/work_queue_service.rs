// src/services/work_queue_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, WorkQueueRepository},
    models::{
        work_orders::JobStatus,
        work_queue::{AvailableSubJob, ClearQueueResponse, QueueItemView, WorkQueueEntry},
    },
};

/// A etapa do sub-job precisa ser uma das etapas do departamento da equipe.
pub fn ensure_step_belongs_to_team(
    team_id: Uuid,
    sub_job_step: Uuid,
    team_steps: &[Uuid],
) -> Result<(), AppError> {
    if team_steps.contains(&sub_job_step) {
        return Ok(());
    }
    Err(AppError::WorkStepMismatch {
        team_id,
        sub_job_step,
        team_steps: team_steps.to_vec(),
    })
}

/// Status da fila que é copiado para o sub-job. Voltar para `pending` não
/// mexe no sub-job (ele pode estar em outra fila).
fn mirrored_status(status: JobStatus) -> Option<JobStatus> {
    match status {
        JobStatus::Pending => None,
        other => Some(other),
    }
}

#[derive(Clone)]
pub struct WorkQueueService {
    repo: WorkQueueRepository,
    org_repo: OrganizationRepository,
}

impl WorkQueueService {
    pub fn new(repo: WorkQueueRepository, org_repo: OrganizationRepository) -> Self {
        Self { repo, org_repo }
    }

    pub async fn list_team_queue<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
    ) -> Result<Vec<QueueItemView>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.org_repo.find_team(&mut *tx, tenant_id, team_id).await?.is_none() {
            return Err(AppError::ResourceNotFound("Team".into()));
        }

        let queue = self.repo.list_team_queue(&mut *tx, tenant_id, team_id).await?;
        tx.commit().await?;
        Ok(queue)
    }

    /// Coloca o sub-job na fila da equipe, se a etapa dele for do departamento dela.
    pub async fn add_job_to_queue<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        sub_job_id: Uuid,
        team_id: Uuid,
        priority: i32,
    ) -> Result<WorkQueueEntry, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sub_job = self
            .repo
            .find_sub_job(&mut *tx, tenant_id, sub_job_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Sub-job".into()))?;

        if self.org_repo.find_team(&mut *tx, tenant_id, team_id).await?.is_none() {
            return Err(AppError::ResourceNotFound("Team".into()));
        }

        let team_steps = self.org_repo.work_step_ids_for_team(&mut *tx, tenant_id, team_id).await?;
        ensure_step_belongs_to_team(team_id, sub_job.work_step_id, &team_steps)?;

        let entry = self
            .repo
            .insert_entry(&mut *tx, tenant_id, sub_job_id, team_id, priority)
            .await?;
        tx.commit().await?;

        tracing::debug!(queue_id = %entry.id, %sub_job_id, %team_id, "Sub-job adicionado à fila");
        Ok(entry)
    }

    /// priority = posição (1-based). Um id que não é da equipe desfaz tudo.
    pub async fn reorder_queue<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<QueueItemView>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        for (index, item_id) in item_ids.iter().enumerate() {
            let priority = i32::try_from(index + 1)
                .map_err(|_| AppError::BadRequest("too many queue items".into()))?;
            if !self.repo.set_priority(&mut *tx, tenant_id, team_id, *item_id, priority).await? {
                return Err(AppError::ResourceNotFound(format!("Queue item {item_id}")));
            }
        }

        let queue = self.repo.list_team_queue(&mut *tx, tenant_id, team_id).await?;
        tx.commit().await?;

        Ok(queue)
    }

    pub async fn remove_from_queue<'e, E>(&self, executor: E, tenant_id: Uuid, queue_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_entry(executor, tenant_id, queue_id).await? {
            return Err(AppError::ResourceNotFound("Queue item".into()));
        }
        Ok(())
    }

    pub async fn clear_team_queue<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
    ) -> Result<ClearQueueResponse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.clear_team(executor, tenant_id, team_id).await?;

        tracing::info!(%team_id, deleted, "Fila da equipe limpa");
        Ok(ClearQueueResponse { team_id, deleted })
    }

    /// Atualiza o status do item e espelha no sub-job na mesma transação.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        queue_id: Uuid,
        status: JobStatus,
    ) -> Result<WorkQueueEntry, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let entry = self
            .repo
            .set_status(&mut *tx, tenant_id, queue_id, status)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Queue item".into()))?;

        if let Some(sub_job_status) = mirrored_status(status) {
            self.repo
                .set_sub_job_status(&mut *tx, tenant_id, entry.sub_job_id, sub_job_status)
                .await?;
        }

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn available_sub_jobs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_step_id: Uuid,
    ) -> Result<Vec<AvailableSubJob>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.available_sub_jobs(executor, tenant_id, work_step_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::testing,
        db::WorkOrderRepository,
        models::work_orders::{CreateWorkOrderPayload, SubJobInput, WorkOrderStatus},
        services::work_order_service::WorkOrderService,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[test]
    fn accepts_step_of_team_department() {
        let cutting = Uuid::new_v4();
        let sewing = Uuid::new_v4();
        assert!(ensure_step_belongs_to_team(Uuid::new_v4(), sewing, &[cutting, sewing]).is_ok());
    }

    #[test]
    fn rejects_step_from_another_department() {
        let team = Uuid::new_v4();
        let cutting = Uuid::new_v4();
        let printing = Uuid::new_v4();

        let err = ensure_step_belongs_to_team(team, printing, &[cutting]).unwrap_err();
        match err {
            AppError::WorkStepMismatch { team_id, sub_job_step, team_steps } => {
                assert_eq!(team_id, team);
                assert_eq!(sub_job_step, printing);
                assert_eq!(team_steps, vec![cutting]);
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn team_without_steps_rejects_everything() {
        assert!(ensure_step_belongs_to_team(Uuid::new_v4(), Uuid::new_v4(), &[]).is_err());
    }

    #[test]
    fn only_progress_statuses_are_mirrored() {
        assert_eq!(mirrored_status(JobStatus::Pending), None);
        assert_eq!(mirrored_status(JobStatus::InProgress), Some(JobStatus::InProgress));
        assert_eq!(mirrored_status(JobStatus::Completed), Some(JobStatus::Completed));
        assert_eq!(mirrored_status(JobStatus::Cancelled), Some(JobStatus::Cancelled));
    }

    // --- contra o banco ---

    fn service() -> WorkQueueService {
        WorkQueueService::new(WorkQueueRepository::new(), OrganizationRepository::new())
    }

    async fn seed_sub_job(pool: &PgPool, f: &testing::Factory) -> anyhow::Result<Uuid> {
        seed_sub_job_in(pool, f, WorkOrderStatus::Approved).await
    }

    async fn seed_sub_job_in(pool: &PgPool, f: &testing::Factory, status: WorkOrderStatus) -> anyhow::Result<Uuid> {
        let input = SubJobInput {
            id: None,
            product_name: "Camiseta".to_string(),
            department_id: f.cutting_department,
            work_step_id: f.cutting_step,
            color_id: f.color_id,
            size_id: f.size_id,
            quantity: 10,
            production_cost: Decimal::from(5),
            sort_order: None,
        };
        let payload = CreateWorkOrderPayload {
            quotation_id: None,
            customer_id: Uuid::new_v4(),
            title: "Pedido".to_string(),
            description: None,
            work_type_id: None,
            delivery_date: NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
            notes: None,
            total_amount: None,
            status,
            priority: None,
            sub_jobs: vec![input],
        };
        let detail = WorkOrderService::new(WorkOrderRepository::new(), OrganizationRepository::new())
            .create(pool, f.tenant_id, &payload)
            .await?;
        Ok(detail.sub_jobs[0].id)
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn queueing_on_foreign_department_team_is_rejected(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let sub_job = seed_sub_job(&pool, &f).await?;

        let err = service()
            .add_job_to_queue(&pool, f.tenant_id, sub_job, f.printing_team, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::WorkStepMismatch { sub_job_step, .. } if sub_job_step == f.cutting_step));
        let queued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM work_queues")
            .fetch_one(&pool)
            .await?;
        assert_eq!(queued, 0);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn status_change_is_mirrored_on_sub_job(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let sub_job = seed_sub_job(&pool, &f).await?;
        let svc = service();

        let entry = svc.add_job_to_queue(&pool, f.tenant_id, sub_job, f.cutting_team, 1).await?;
        assert_eq!(entry.status, JobStatus::Pending);

        svc.update_status(&pool, f.tenant_id, entry.id, JobStatus::Completed).await?;

        let status: JobStatus = sqlx::query_scalar("SELECT status FROM sub_jobs WHERE id = $1")
            .bind(sub_job)
            .fetch_one(&pool)
            .await?;
        assert_eq!(status, JobStatus::Completed);

        let available = svc.available_sub_jobs(&pool, f.tenant_id, f.cutting_step).await?;
        assert!(available.iter().all(|s| s.id != sub_job));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn reorder_with_foreign_item_changes_nothing(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let sub_job = seed_sub_job(&pool, &f).await?;
        let svc = service();

        let entry = svc.add_job_to_queue(&pool, f.tenant_id, sub_job, f.cutting_team, 7).await?;

        let err = svc
            .reorder_queue(&pool, f.tenant_id, f.cutting_team, &[entry.id, Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));

        let priority: i32 = sqlx::query_scalar("SELECT priority FROM work_queues WHERE id = $1")
            .bind(entry.id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(priority, 7);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn only_released_orders_offer_sub_jobs(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let approved = seed_sub_job_in(&pool, &f, WorkOrderStatus::Approved).await?;
        let in_progress = seed_sub_job_in(&pool, &f, WorkOrderStatus::InProgress).await?;
        let mut held = Vec::new();
        for status in [
            WorkOrderStatus::Draft,
            WorkOrderStatus::Pending,
            WorkOrderStatus::Completed,
            WorkOrderStatus::Cancelled,
        ] {
            held.push(seed_sub_job_in(&pool, &f, status).await?);
        }

        let available: Vec<Uuid> = service()
            .available_sub_jobs(&pool, f.tenant_id, f.cutting_step)
            .await?
            .iter()
            .map(|s| s.id)
            .collect();

        assert!(available.contains(&approved));
        assert!(available.contains(&in_progress));
        assert!(held.iter().all(|id| !available.contains(id)));

        // Etapa de outro departamento não enxerga estes sub-jobs
        let printing = service().available_sub_jobs(&pool, f.tenant_id, f.printing_step).await?;
        assert!(printing.is_empty());
        Ok(())
    }
}
