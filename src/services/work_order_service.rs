// src/services/work_order_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, WorkOrderRepository},
    models::master_data::LookupKind,
    models::work_orders::{
        CreateWorkOrderPayload, EditedSubJob, GenerateSubJobsPayload, OrderCountResponse,
        PriceCheckResult, SubJob, SubJobDraft, SubJobInput, UpdateWorkOrderPayload, WorkOrder,
        WorkOrderDetail, WorkOrderStatus, WorkOrderUpdateResponse,
    },
    services::{
        bulk_generator::{generate_sub_job_drafts, quantity_matrix, DepartmentPlan, GeneratorInput},
        order_number::{format_order_number, month_bounds, year_month},
        price_change::{detect_price_change, PriceSnapshot},
        sub_job_sync::{
            check_step_departments, distinct_ids, plan_sub_job_sync, summarize, SubJobChange, SubJobValues,
        },
    },
};

fn work_order_not_found() -> AppError {
    AppError::ResourceNotFound("Work order".into())
}

// O formulário de edição manda SubJobInput; o detector trabalha com EditedSubJob.
impl From<&SubJobInput> for EditedSubJob {
    fn from(input: &SubJobInput) -> Self {
        Self {
            id: input.id,
            product_name: input.product_name.clone(),
            color_id: Some(input.color_id),
            size_id: Some(input.size_id),
            production_cost: input.production_cost,
        }
    }
}

#[derive(Clone)]
pub struct WorkOrderService {
    repo: WorkOrderRepository,
    org_repo: OrganizationRepository,
}

impl WorkOrderService {
    pub fn new(repo: WorkOrderRepository, org_repo: OrganizationRepository) -> Self {
        Self { repo, org_repo }
    }

    // =========================================================================
    //  REFERÊNCIAS
    // =========================================================================

    async fn ensure_owned(
        &self,
        conn: &mut PgConnection,
        table: &'static str,
        label: &str,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        let owned = self.repo.count_owned(&mut *conn, table, tenant_id, ids).await?;
        if owned != ids.len() as i64 {
            return Err(AppError::ResourceNotFound(label.to_string()));
        }
        Ok(())
    }

    /// Tudo que a ordem e os sub-jobs referenciam precisa ser da loja, e a etapa
    /// de cada sub-job precisa ser do departamento dele.
    async fn check_references(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        work_type_id: Option<Uuid>,
        sub_jobs: &[SubJobInput],
    ) -> Result<(), AppError> {
        if let Some(work_type_id) = work_type_id {
            self.ensure_owned(&mut *conn, LookupKind::WorkType.table(), "Work type", tenant_id, &[work_type_id])
                .await?;
        }
        if sub_jobs.is_empty() {
            return Ok(());
        }

        let departments = distinct_ids(sub_jobs.iter().map(|s| s.department_id));
        let colors = distinct_ids(sub_jobs.iter().map(|s| s.color_id));
        let sizes = distinct_ids(sub_jobs.iter().map(|s| s.size_id));
        let steps = distinct_ids(sub_jobs.iter().map(|s| s.work_step_id));

        self.ensure_owned(&mut *conn, "departments", "Department", tenant_id, &departments).await?;
        self.ensure_owned(&mut *conn, LookupKind::Color.table(), "Color", tenant_id, &colors).await?;
        self.ensure_owned(&mut *conn, LookupKind::Size.table(), "Size", tenant_id, &sizes).await?;

        let step_departments: HashMap<Uuid, Uuid> = self
            .org_repo
            .work_step_departments(&mut *conn, tenant_id, &steps)
            .await?
            .into_iter()
            .collect();

        check_step_departments(sub_jobs, &step_departments)
    }

    // =========================================================================
    //  NUMERAÇÃO
    // =========================================================================

    pub async fn count_orders<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<OrderCountResponse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (start, end) = month_bounds(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("invalid month {year}-{month:02}")))?;

        let count = self.repo.count_created_between(executor, tenant_id, start, end).await?;

        Ok(OrderCountResponse {
            count,
            next_order_number: format_order_number(year, month, count),
        })
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    /// Cria cabeçalho + sub-jobs numa transação.
    ///
    /// O número vem da contagem do mês: dois pedidos simultâneos podem
    /// receber o mesmo número (não há UNIQUE em order_number).
    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateWorkOrderPayload,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.check_references(&mut *tx, tenant_id, payload.work_type_id, &payload.sub_jobs).await?;

        let (year, month) = year_month(Utc::now().date_naive());
        let (start, end) = month_bounds(year, month)
            .ok_or_else(|| anyhow::anyhow!("mês corrente inválido: {year}-{month}"))?;
        let count = self.repo.count_created_between(&mut *tx, tenant_id, start, end).await?;
        let order_number = format_order_number(year, month, count);

        let values: Vec<SubJobValues> = payload
            .sub_jobs
            .iter()
            .enumerate()
            .map(|(position, input)| SubJobValues::from_input(input, position))
            .collect();

        let total_amount = payload
            .total_amount
            .unwrap_or_else(|| values.iter().map(|v| v.total_cost).sum());

        let header = self
            .repo
            .insert_work_order(&mut *tx, tenant_id, &order_number, total_amount, payload)
            .await?;

        let mut sub_jobs = Vec::with_capacity(values.len());
        for value in &values {
            sub_jobs.push(self.repo.insert_sub_job(&mut *tx, tenant_id, header.id, value).await?);
        }

        tx.commit().await?;

        tracing::info!(work_order_id = %header.id, %order_number, sub_jobs = sub_jobs.len(), "Ordem de produção criada");

        Ok(WorkOrderDetail {
            header,
            sub_jobs,
            has_queued_jobs: false,
        })
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<WorkOrderStatus>,
    ) -> Result<Vec<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_work_orders(executor, tenant_id, status).await
    }

    pub async fn get_detail<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let header = self
            .repo
            .find_work_order(&mut *tx, tenant_id, id)
            .await?
            .ok_or_else(work_order_not_found)?;
        let sub_jobs = self.repo.list_sub_jobs(&mut *tx, tenant_id, id).await?;
        let has_queued_jobs = self.repo.has_queued_jobs(&mut *tx, tenant_id, id).await?;
        tx.commit().await?;

        Ok(WorkOrderDetail { header, sub_jobs, has_queued_jobs })
    }

    /// Atualiza o cabeçalho e reconcilia os sub-jobs com a lista recebida.
    ///
    /// Os sinalizadores de preço comparam a lista recebida com o estado salvo
    /// ANTES da atualização; `has_queued_jobs` também é o de antes.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateWorkOrderPayload,
    ) -> Result<WorkOrderUpdateResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_work_order(&mut *tx, tenant_id, id).await?.is_none() {
            return Err(work_order_not_found());
        }

        self.check_references(&mut *tx, tenant_id, payload.work_type_id, &payload.sub_jobs).await?;

        let existing = self.repo.list_sub_jobs(&mut *tx, tenant_id, id).await?;
        let had_queued_jobs = self.repo.has_queued_jobs(&mut *tx, tenant_id, id).await?;

        let snapshot: Vec<PriceSnapshot> = existing.iter().map(PriceSnapshot::from).collect();
        let edited: Vec<EditedSubJob> = payload.sub_jobs.iter().map(EditedSubJob::from).collect();
        let price_changed = detect_price_change(&snapshot, &edited);

        let existing_ids: Vec<Uuid> = existing.iter().map(|s| s.id).collect();
        let changes = plan_sub_job_sync(&existing_ids, &payload.sub_jobs);

        let deleted_ids: Vec<Uuid> = changes
            .iter()
            .filter_map(|change| match change {
                SubJobChange::Deleted { id } => Some(*id),
                _ => None,
            })
            .collect();

        if !deleted_ids.is_empty() {
            self.repo.delete_queue_entries_for_sub_jobs(&mut *tx, tenant_id, &deleted_ids).await?;
            self.repo.unlink_work_logs(&mut *tx, tenant_id, &deleted_ids).await?;
            self.repo.delete_sub_jobs(&mut *tx, tenant_id, &deleted_ids).await?;
        }

        let mut subtotal = Decimal::ZERO;
        for change in &changes {
            match change {
                SubJobChange::Kept { id: sub_job_id, values } => {
                    self.repo.update_sub_job(&mut *tx, tenant_id, *sub_job_id, values).await?;
                    subtotal += values.total_cost;
                }
                SubJobChange::Inserted { values } => {
                    self.repo.insert_sub_job(&mut *tx, tenant_id, id, values).await?;
                    subtotal += values.total_cost;
                }
                SubJobChange::Deleted { .. } => {}
            }
        }

        let total_amount = payload.total_amount.unwrap_or(subtotal);
        let header = self.repo.update_work_order(&mut *tx, tenant_id, id, total_amount, payload).await?;
        let sub_jobs = self.repo.list_sub_jobs(&mut *tx, tenant_id, id).await?;
        let has_queued_now = self.repo.has_queued_jobs(&mut *tx, tenant_id, id).await?;

        tx.commit().await?;

        let reconciliation = summarize(&changes);
        tracing::info!(
            work_order_id = %id,
            kept = reconciliation.kept,
            inserted = reconciliation.inserted,
            deleted = reconciliation.deleted,
            price_changed,
            "Sub-jobs reconciliados"
        );

        let flags = PriceCheckResult::new(price_changed, had_queued_jobs);

        Ok(WorkOrderUpdateResponse {
            work_order: WorkOrderDetail {
                header,
                sub_jobs,
                has_queued_jobs: has_queued_now,
            },
            reconciliation,
            price_changed: flags.price_changed,
            has_queued_jobs: flags.has_queued_jobs,
            requires_replan: flags.requires_replan,
        })
    }

    /// Compara o formulário em edição com o que está salvo, sem gravar nada.
    pub async fn price_check<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        edited: &[EditedSubJob],
    ) -> Result<PriceCheckResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_work_order(&mut *tx, tenant_id, id).await?.is_none() {
            return Err(work_order_not_found());
        }

        let existing = self.repo.list_sub_jobs(&mut *tx, tenant_id, id).await?;
        let has_queued_jobs = self.repo.has_queued_jobs(&mut *tx, tenant_id, id).await?;
        tx.commit().await?;

        let snapshot: Vec<PriceSnapshot> = existing.iter().map(PriceSnapshot::from).collect();
        Ok(PriceCheckResult::new(detect_price_change(&snapshot, edited), has_queued_jobs))
    }

    /// sort_order = posição (1-based) de cada id na lista recebida.
    pub async fn reorder_sub_jobs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        work_order_id: Uuid,
        sub_job_ids: &[Uuid],
    ) -> Result<Vec<SubJob>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_work_order(&mut *tx, tenant_id, work_order_id).await?.is_none() {
            return Err(work_order_not_found());
        }

        for (index, sub_job_id) in sub_job_ids.iter().enumerate() {
            let sort_order = i32::try_from(index + 1)
                .map_err(|_| AppError::BadRequest("too many sub-jobs".into()))?;
            let updated = self
                .repo
                .set_sub_job_sort_order(&mut *tx, tenant_id, work_order_id, *sub_job_id, sort_order)
                .await?;
            if !updated {
                return Err(AppError::ResourceNotFound(format!("Sub-job {sub_job_id}")));
            }
        }

        let sub_jobs = self.repo.list_sub_jobs(&mut *tx, tenant_id, work_order_id).await?;
        tx.commit().await?;

        Ok(sub_jobs)
    }

    /// Remove a ordem, suas entradas de fila e seus sub-jobs.
    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_work_order(&mut *tx, tenant_id, id).await?.is_none() {
            return Err(work_order_not_found());
        }

        let sub_job_ids: Vec<Uuid> = self
            .repo
            .list_sub_jobs(&mut *tx, tenant_id, id)
            .await?
            .iter()
            .map(|s| s.id)
            .collect();

        let queue_entries = self.repo.delete_queue_entries_of_order(&mut *tx, tenant_id, id).await?;
        self.repo.unlink_work_logs(&mut *tx, tenant_id, &sub_job_ids).await?;
        self.repo.delete_sub_jobs_of_order(&mut *tx, tenant_id, id).await?;
        self.repo.delete_work_order(&mut *tx, tenant_id, id).await?;

        tx.commit().await?;

        tracing::info!(work_order_id = %id, sub_jobs = sub_job_ids.len(), queue_entries, "Ordem de produção removida");
        Ok(())
    }

    // =========================================================================
    //  GERADOR EM LOTE
    // =========================================================================

    /// Carrega etapas e equipes dos departamentos escolhidos e expande a matriz.
    /// Nada é gravado: os rascunhos voltam para o formulário.
    pub async fn generate_drafts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &GenerateSubJobsPayload,
    ) -> Result<Vec<SubJobDraft>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let steps = self
            .org_repo
            .list_work_steps_of_departments(&mut *tx, tenant_id, &payload.department_ids)
            .await?;
        let teams = self
            .org_repo
            .list_teams_of_departments(&mut *tx, tenant_id, &payload.department_ids)
            .await?;
        tx.commit().await?;

        let departments = distinct_ids(payload.department_ids.iter().copied())
            .into_iter()
            .map(|department_id| DepartmentPlan {
                department_id,
                work_step_ids: steps
                    .iter()
                    .filter(|s| s.department_id == department_id)
                    .map(|s| s.id)
                    .collect(),
                team_ids: teams
                    .iter()
                    .filter(|t| t.department_id == department_id)
                    .map(|t| t.id)
                    .collect(),
            })
            .collect();

        let input = GeneratorInput {
            product_name: payload.product_name.clone(),
            production_cost: payload.production_cost,
            departments,
            selected_team_ids: payload.team_ids.iter().copied().collect(),
            color_ids: payload.color_ids.clone(),
            size_ids: payload.size_ids.clone(),
            quantities: quantity_matrix(&payload.quantities),
        };

        let drafts = generate_sub_job_drafts(&input);
        tracing::debug!(drafts = drafts.len(), "Rascunhos de sub-jobs gerados");

        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::testing, db::WorkQueueRepository};
    use chrono::NaiveDate;
    use sqlx::PgPool;

    fn service() -> WorkOrderService {
        WorkOrderService::new(WorkOrderRepository::new(), OrganizationRepository::new())
    }

    fn line(f: &testing::Factory, id: Option<Uuid>, product: &str, quantity: i32, cost: i64) -> SubJobInput {
        SubJobInput {
            id,
            product_name: product.to_string(),
            department_id: f.cutting_department,
            work_step_id: f.cutting_step,
            color_id: f.color_id,
            size_id: f.size_id,
            quantity,
            production_cost: Decimal::from(cost),
            sort_order: None,
        }
    }

    fn new_order(sub_jobs: Vec<SubJobInput>) -> CreateWorkOrderPayload {
        CreateWorkOrderPayload {
            quotation_id: None,
            customer_id: Uuid::new_v4(),
            title: "Camisetas evento".to_string(),
            description: None,
            work_type_id: None,
            delivery_date: NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
            notes: None,
            total_amount: None,
            status: WorkOrderStatus::Approved,
            priority: None,
            sub_jobs,
        }
    }

    fn edit(sub_jobs: Vec<SubJobInput>) -> UpdateWorkOrderPayload {
        UpdateWorkOrderPayload {
            quotation_id: None,
            customer_id: None,
            title: None,
            description: None,
            work_type_id: None,
            delivery_date: None,
            notes: None,
            total_amount: None,
            status: None,
            priority: None,
            sub_jobs,
        }
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn numbers_orders_sequentially_within_the_month(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service();

        let first = svc.create(&pool, f.tenant_id, &new_order(vec![])).await?;
        let second = svc.create(&pool, f.tenant_id, &new_order(vec![])).await?;

        let (year, month) = year_month(Utc::now().date_naive());
        assert_eq!(first.header.order_number, format_order_number(year, month, 0));
        assert_eq!(second.header.order_number, format_order_number(year, month, 1));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn create_sums_sub_job_totals(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;

        let detail = service()
            .create(&pool, f.tenant_id, &new_order(vec![line(&f, None, "Camiseta", 10, 5), line(&f, None, "Boné", 4, 3)]))
            .await?;

        assert_eq!(detail.sub_jobs.len(), 2);
        assert_eq!(detail.header.total_amount, Decimal::from(62));
        assert_eq!(detail.sub_jobs[1].sort_order, 2);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn update_reconciles_sub_jobs_and_cleans_queue(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service();

        let created = svc
            .create(
                &pool,
                f.tenant_id,
                &new_order(vec![
                    line(&f, None, "A", 10, 5),
                    line(&f, None, "B", 10, 5),
                    line(&f, None, "C", 10, 5),
                ]),
            )
            .await?;
        let (a, b, c) = (created.sub_jobs[0].id, created.sub_jobs[1].id, created.sub_jobs[2].id);

        WorkQueueRepository::new()
            .insert_entry(&pool, f.tenant_id, c, f.cutting_team, 1)
            .await?;
        let log_id: Uuid = sqlx::query_scalar(
            "INSERT INTO work_logs (tenant_id, team_id, sub_job_id, work_date, quantity_completed) \
             VALUES ($1, $2, $3, CURRENT_DATE, 4) RETURNING id",
        )
        .bind(f.tenant_id)
        .bind(f.cutting_team)
        .bind(b)
        .fetch_one(&pool)
        .await?;

        // A com novo custo, D novo; B e C saem
        let response = svc
            .update(
                &pool,
                f.tenant_id,
                created.header.id,
                &edit(vec![line(&f, Some(a), "A", 12, 6), line(&f, None, "D", 1, 2)]),
            )
            .await?;

        assert_eq!(response.reconciliation.kept, 1);
        assert_eq!(response.reconciliation.inserted, 1);
        assert_eq!(response.reconciliation.deleted, 2);
        assert!(response.price_changed);
        assert!(response.has_queued_jobs);
        assert!(response.requires_replan);
        assert!(!response.work_order.has_queued_jobs);

        let sub_jobs = &response.work_order.sub_jobs;
        assert_eq!(sub_jobs.len(), 2);
        assert_eq!(sub_jobs[0].id, a);
        assert_eq!(sub_jobs[0].quantity, 12);
        assert_eq!(sub_jobs[0].total_cost, Decimal::from(72));
        assert_eq!(sub_jobs[1].product_name, "D");
        assert_eq!(response.work_order.header.total_amount, Decimal::from(74));

        let queued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM work_queues WHERE sub_job_id = $1")
            .bind(c)
            .fetch_one(&pool)
            .await?;
        assert_eq!(queued, 0);

        let linked: Option<Uuid> = sqlx::query_scalar("SELECT sub_job_id FROM work_logs WHERE id = $1")
            .bind(log_id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(linked, None);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn update_of_missing_order_is_not_found(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;

        let err = service()
            .update(&pool, f.tenant_id, Uuid::new_v4(), &edit(vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ResourceNotFound(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn create_rejects_references_of_another_tenant(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let (other_tenant, _) = testing::other_tenant(&pool).await?;

        // Departamento, etapa, cor e tamanho são todos da loja `f`
        let err = service()
            .create(&pool, other_tenant, &new_order(vec![line(&f, None, "Camiseta", 10, 5)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM work_orders WHERE tenant_id = $1")
            .bind(other_tenant)
            .fetch_one(&pool)
            .await?;
        assert_eq!(orders, 0);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn create_rejects_work_type_of_another_tenant(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let (other_tenant, _) = testing::other_tenant(&pool).await?;
        let foreign_type: Uuid = sqlx::query_scalar("INSERT INTO work_types (tenant_id, name) VALUES ($1, 'Bordado') RETURNING id")
            .bind(other_tenant)
            .fetch_one(&pool)
            .await?;

        let mut payload = new_order(vec![]);
        payload.work_type_id = Some(foreign_type);
        let err = service().create(&pool, f.tenant_id, &payload).await.unwrap_err();

        assert!(matches!(err, AppError::ResourceNotFound(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn update_rejects_step_outside_the_sub_job_department(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service();

        let created = svc.create(&pool, f.tenant_id, &new_order(vec![line(&f, None, "A", 1, 1)])).await?;

        let mut crossed = line(&f, Some(created.sub_jobs[0].id), "A", 1, 1);
        crossed.work_step_id = f.printing_step;
        let err = svc
            .update(&pool, f.tenant_id, created.header.id, &edit(vec![crossed]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Nada mudou
        let detail = svc.get_detail(&pool, f.tenant_id, created.header.id).await?;
        assert_eq!(detail.sub_jobs[0].work_step_id, f.cutting_step);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn reorder_rewrites_sort_order(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let svc = service();

        let created = svc
            .create(&pool, f.tenant_id, &new_order(vec![line(&f, None, "A", 1, 1), line(&f, None, "B", 1, 1)]))
            .await?;
        let (a, b) = (created.sub_jobs[0].id, created.sub_jobs[1].id);

        let reordered = svc.reorder_sub_jobs(&pool, f.tenant_id, created.header.id, &[b, a]).await?;

        assert_eq!(reordered[0].id, b);
        assert_eq!(reordered[0].sort_order, 1);
        assert_eq!(reordered[1].id, a);
        assert_eq!(reordered[1].sort_order, 2);
        Ok(())
    }
}
