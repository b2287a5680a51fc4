// src/services/work_log_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, WorkLogRepository},
    models::{
        organization::Employee,
        work_logs::{CreateWorkLogPayload, DailyReport, TeamDailyReport, TeamLogTotals, WorkLog},
    },
    services::cost_calculator::team_daily_cost,
};

/// Junta os totais do dia com o custo diário de cada equipe.
pub fn build_daily_report(date: NaiveDate, totals: Vec<TeamLogTotals>, employees: &[Employee]) -> DailyReport {
    let mut by_team: HashMap<Uuid, Vec<Employee>> = HashMap::new();
    for employee in employees {
        by_team.entry(employee.team_id).or_default().push(employee.clone());
    }

    let teams: Vec<TeamDailyReport> = totals
        .into_iter()
        .map(|row| {
            let (_, labor_cost) = by_team
                .get(&row.team_id)
                .map(|list| team_daily_cost(list))
                .unwrap_or((0, Decimal::ZERO));
            TeamDailyReport {
                team_id: row.team_id,
                team_name: row.team_name,
                entries: row.entries,
                quantity_completed: row.quantity_completed,
                hours_worked: row.hours_worked,
                labor_cost,
            }
        })
        .collect();

    let total_quantity = teams.iter().map(|t| t.quantity_completed).sum();
    let total_labor_cost = teams.iter().map(|t| t.labor_cost).sum();

    DailyReport { date, teams, total_quantity, total_labor_cost }
}

#[derive(Clone)]
pub struct WorkLogService {
    repo: WorkLogRepository,
    org_repo: OrganizationRepository,
}

impl WorkLogService {
    pub fn new(repo: WorkLogRepository, org_repo: OrganizationRepository) -> Self {
        Self { repo, org_repo }
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
        self.repo.list(executor, tenant_id, date, team_id).await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        payload: &CreateWorkLogPayload,
    ) -> Result<WorkLog, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.org_repo.find_team(&mut *tx, tenant_id, payload.team_id).await?.is_none() {
            return Err(AppError::ResourceNotFound("Team".into()));
        }

        // O sub-job apontado tem que ser da mesma loja
        if let Some(sub_job_id) = payload.sub_job_id {
            if !self.repo.sub_job_exists(&mut *tx, tenant_id, sub_job_id).await? {
                return Err(AppError::ResourceNotFound("Sub-job".into()));
            }
        }

        let log = self.repo.create(&mut *tx, tenant_id, user_id, payload).await?;
        tx.commit().await?;
        Ok(log)
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("Work log".into()));
        }
        Ok(())
    }

    pub async fn daily_report<'e, E>(&self, executor: E, tenant_id: Uuid, date: NaiveDate) -> Result<DailyReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let totals = self.repo.daily_totals(&mut *tx, tenant_id, date).await?;
        let team_ids: Vec<Uuid> = totals.iter().map(|t| t.team_id).collect();
        let employees = self.org_repo.list_employees_of_teams(&mut *tx, tenant_id, &team_ids).await?;
        tx.commit().await?;

        Ok(build_daily_report(date, totals, &employees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::testing,
        db::WorkOrderRepository,
        models::{
            organization::EntityStatus,
            work_orders::{CreateWorkOrderPayload, SubJobInput, WorkOrderStatus},
        },
        services::work_order_service::WorkOrderService,
    };
    use chrono::Utc;
    use sqlx::PgPool;

    fn employee(team_id: Uuid, count: i32, wage: i64, status: EntityStatus) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            team_id,
            count,
            average_wage: Decimal::from(wage),
            overhead_percentage: Decimal::from(15),
            management_percentage: Decimal::from(10),
            description: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn totals(team_id: Uuid, name: &str, quantity: i64) -> TeamLogTotals {
        TeamLogTotals {
            team_id,
            team_name: name.to_string(),
            entries: 2,
            quantity_completed: quantity,
            hours_worked: Decimal::from(16),
        }
    }

    #[test]
    fn labor_cost_uses_only_active_staff_of_each_team() {
        let cutting = Uuid::new_v4();
        let sewing = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let staff = vec![
            employee(cutting, 5, 400, EntityStatus::Active),
            employee(cutting, 3, 400, EntityStatus::Inactive),
            employee(sewing, 2, 100, EntityStatus::Active),
        ];

        let report = build_daily_report(
            date,
            vec![totals(cutting, "Corte", 120), totals(sewing, "Costura", 80)],
            &staff,
        );

        assert_eq!(report.teams.len(), 2);
        assert_eq!(report.teams[0].labor_cost, Decimal::from(2530));
        assert_eq!(report.teams[1].labor_cost, Decimal::from(253));
        assert_eq!(report.total_quantity, 200);
        assert_eq!(report.total_labor_cost, Decimal::from(2783));
    }

    #[test]
    fn team_without_staff_costs_nothing() {
        let team = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let report = build_daily_report(date, vec![totals(team, "Acabamento", 10)], &[]);

        assert_eq!(report.teams[0].labor_cost, Decimal::ZERO);
        assert_eq!(report.total_labor_cost, Decimal::ZERO);
    }

    fn log(team_id: Uuid, sub_job_id: Option<Uuid>) -> CreateWorkLogPayload {
        CreateWorkLogPayload {
            team_id,
            sub_job_id,
            work_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            quantity_completed: 40,
            hours_worked: Decimal::from(8),
            notes: None,
        }
    }

    async fn sub_job_of(pool: &PgPool, f: &testing::Factory) -> anyhow::Result<Uuid> {
        let payload = CreateWorkOrderPayload {
            quotation_id: None,
            customer_id: Uuid::new_v4(),
            title: "Pedido".to_string(),
            description: None,
            work_type_id: None,
            delivery_date: NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
            notes: None,
            total_amount: None,
            status: WorkOrderStatus::Approved,
            priority: None,
            sub_jobs: vec![SubJobInput {
                id: None,
                product_name: "Camiseta".to_string(),
                department_id: f.cutting_department,
                work_step_id: f.cutting_step,
                color_id: f.color_id,
                size_id: f.size_id,
                quantity: 10,
                production_cost: Decimal::from(5),
                sort_order: None,
            }],
        };
        let detail = WorkOrderService::new(WorkOrderRepository::new(), OrganizationRepository::new())
            .create(pool, f.tenant_id, &payload)
            .await?;
        Ok(detail.sub_jobs[0].id)
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn log_cannot_point_at_sub_job_of_another_tenant(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        let (other_tenant, other_team) = testing::other_tenant(&pool).await?;
        let foreign_sub_job = sub_job_of(&pool, &f).await?;
        let svc = WorkLogService::new(WorkLogRepository::new(), OrganizationRepository::new());

        let err = svc
            .create(&pool, other_tenant, f.user_id, &log(other_team, Some(foreign_sub_job)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));

        // Na própria loja o mesmo apontamento entra
        let created = svc
            .create(&pool, f.tenant_id, f.user_id, &log(f.cutting_team, Some(foreign_sub_job)))
            .await?;
        assert_eq!(created.sub_job_id, Some(foreign_sub_job));
        Ok(())
    }
}
