// src/services/organization_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrganizationRepository,
    models::organization::{
        CreateDepartmentPayload, CreateEmployeePayload, CreateTeamPayload, CreateWorkStepPayload,
        Department, Employee, EmployeeWithCost, Team, TeamDailyCost, UpdateDepartmentPayload,
        UpdateEmployeePayload, UpdateTeamPayload, UpdateWorkStepPayload, WorkStep,
    },
    services::cost_calculator::team_daily_cost,
};

fn not_found(resource: &str) -> AppError {
    AppError::ResourceNotFound(resource.to_string())
}

impl From<Employee> for EmployeeWithCost {
    fn from(employee: Employee) -> Self {
        let daily_cost = employee.daily_cost();
        Self { employee, daily_cost }
    }
}

#[derive(Clone)]
pub struct OrganizationService {
    repo: OrganizationRepository,
}

impl OrganizationService {
    pub fn new(repo: OrganizationRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  DEPARTAMENTOS
    // =========================================================================

    pub async fn list_departments<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_departments(executor, tenant_id).await
    }

    pub async fn get_department<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_department(executor, tenant_id, id)
            .await?
            .ok_or_else(|| not_found("Department"))
    }

    pub async fn create_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateDepartmentPayload,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_department(executor, tenant_id, payload).await
    }

    pub async fn update_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateDepartmentPayload,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_department(executor, tenant_id, id, payload)
            .await?
            .ok_or_else(|| not_found("Department"))
    }

    /// Apaga o departamento com suas equipes (e o pessoal delas) e suas etapas.
    /// Tudo numa transação; se alguma etapa ainda é usada por sub-jobs, nada é apagado.
    pub async fn delete_department<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_department(&mut *tx, tenant_id, id).await?.is_none() {
            return Err(not_found("Department"));
        }

        let employees = self.repo.delete_employees_of_department(&mut *tx, tenant_id, id).await?;
        let teams = self.repo.delete_teams_of_department(&mut *tx, tenant_id, id).await?;
        let steps = self.repo.delete_work_steps_of_department(&mut *tx, tenant_id, id).await?;
        self.repo.delete_department(&mut *tx, tenant_id, id).await?;

        tx.commit().await?;

        tracing::info!(department_id = %id, teams, employees, steps, "Departamento removido em cascata");
        Ok(())
    }

    // =========================================================================
    //  EQUIPES
    // =========================================================================

    pub async fn list_teams<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_id: Option<Uuid>,
    ) -> Result<Vec<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_teams(executor, tenant_id, department_id).await
    }

    pub async fn get_team<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Team, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_team(executor, tenant_id, id)
            .await?
            .ok_or_else(|| not_found("Team"))
    }

    pub async fn create_team<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateTeamPayload,
    ) -> Result<Team, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // O departamento precisa ser da mesma loja
        if self.repo.find_department(&mut *tx, tenant_id, payload.department_id).await?.is_none() {
            return Err(not_found("Department"));
        }

        let team = self.repo.create_team(&mut *tx, tenant_id, payload).await?;
        tx.commit().await?;
        Ok(team)
    }

    pub async fn update_team<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateTeamPayload,
    ) -> Result<Team, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(department_id) = payload.department_id {
            if self.repo.find_department(&mut *tx, tenant_id, department_id).await?.is_none() {
                return Err(not_found("Department"));
            }
        }

        let team = self
            .repo
            .update_team(&mut *tx, tenant_id, id, payload)
            .await?
            .ok_or_else(|| not_found("Team"))?;
        tx.commit().await?;
        Ok(team)
    }

    /// Remove a equipe e seu pessoal. Fila e apontamentos caem por cascata.
    pub async fn delete_team<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.repo.delete_employees_of_team(&mut *tx, tenant_id, id).await?;
        if !self.repo.delete_team(&mut *tx, tenant_id, id).await? {
            return Err(not_found("Team"));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Custo diário da equipe: soma do custo dos registros de pessoal ativos.
    pub async fn team_daily_cost<'e, E>(&self, executor: E, tenant_id: Uuid, team_id: Uuid) -> Result<TeamDailyCost, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_team(&mut *tx, tenant_id, team_id).await?.is_none() {
            return Err(not_found("Team"));
        }

        let employees = self.repo.list_employees(&mut *tx, tenant_id, Some(team_id)).await?;
        tx.commit().await?;
        let (headcount, daily_cost) = team_daily_cost(&employees);

        Ok(TeamDailyCost { team_id, headcount, daily_cost })
    }

    // =========================================================================
    //  PESSOAL
    // =========================================================================

    pub async fn list_employees<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Option<Uuid>,
    ) -> Result<Vec<EmployeeWithCost>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = self.repo.list_employees(executor, tenant_id, team_id).await?;
        Ok(employees.into_iter().map(EmployeeWithCost::from).collect())
    }

    pub async fn get_employee<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<EmployeeWithCost, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_employee(executor, tenant_id, id)
            .await?
            .map(EmployeeWithCost::from)
            .ok_or_else(|| not_found("Employee"))
    }

    pub async fn create_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateEmployeePayload,
    ) -> Result<EmployeeWithCost, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_team(&mut *tx, tenant_id, payload.team_id).await?.is_none() {
            return Err(not_found("Team"));
        }

        let employee = self.repo.create_employee(&mut *tx, tenant_id, payload).await?;
        tx.commit().await?;
        Ok(employee.into())
    }

    pub async fn update_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateEmployeePayload,
    ) -> Result<EmployeeWithCost, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(team_id) = payload.team_id {
            if self.repo.find_team(&mut *tx, tenant_id, team_id).await?.is_none() {
                return Err(not_found("Team"));
            }
        }

        let employee = self
            .repo
            .update_employee(&mut *tx, tenant_id, id, payload)
            .await?
            .ok_or_else(|| not_found("Employee"))?;
        tx.commit().await?;
        Ok(employee.into())
    }

    pub async fn delete_employee<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_employee(executor, tenant_id, id).await? {
            return Err(not_found("Employee"));
        }
        Ok(())
    }

    // =========================================================================
    //  ETAPAS DE TRABALHO
    // =========================================================================

    pub async fn list_work_steps<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_id: Option<Uuid>,
    ) -> Result<Vec<WorkStep>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_work_steps(executor, tenant_id, department_id).await
    }

    pub async fn get_work_step<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<WorkStep, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_work_step(executor, tenant_id, id)
            .await?
            .ok_or_else(|| not_found("Work step"))
    }

    pub async fn create_work_step<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateWorkStepPayload,
    ) -> Result<WorkStep, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_department(&mut *tx, tenant_id, payload.department_id).await?.is_none() {
            return Err(not_found("Department"));
        }

        let step = self.repo.create_work_step(&mut *tx, tenant_id, payload).await?;
        tx.commit().await?;
        Ok(step)
    }

    pub async fn update_work_step<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateWorkStepPayload,
    ) -> Result<WorkStep, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(department_id) = payload.department_id {
            if self.repo.find_department(&mut *tx, tenant_id, department_id).await?.is_none() {
                return Err(not_found("Department"));
            }
        }

        let step = self
            .repo
            .update_work_step(&mut *tx, tenant_id, id, payload)
            .await?
            .ok_or_else(|| not_found("Work step"))?;
        tx.commit().await?;
        Ok(step)
    }

    pub async fn delete_work_step<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_work_step(executor, tenant_id, id).await? {
            return Err(not_found("Work step"));
        }
        Ok(())
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

    fn service() -> OrganizationService {
        OrganizationService::new(OrganizationRepository::new())
    }

    async fn count(pool: &PgPool, table: &str, department_id: Uuid) -> anyhow::Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE department_id = $1");
        Ok(sqlx::query_scalar::<_, i64>(&sql).bind(department_id).fetch_one(pool).await?)
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn deleting_department_takes_teams_staff_and_steps(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
        sqlx::query(
            "INSERT INTO employees (tenant_id, team_id, count, average_wage, overhead_percentage, management_percentage) \
             VALUES ($1, $2, 3, 400, 15, 10)",
        )
        .bind(f.tenant_id)
        .bind(f.cutting_team)
        .execute(&pool)
        .await?;

        service().delete_department(&pool, f.tenant_id, f.cutting_department).await?;

        assert_eq!(count(&pool, "teams", f.cutting_department).await?, 0);
        assert_eq!(count(&pool, "work_steps", f.cutting_department).await?, 0);
        let staff: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE team_id = $1")
            .bind(f.cutting_team)
            .fetch_one(&pool)
            .await?;
        assert_eq!(staff, 0);

        // O outro departamento fica intacto
        assert_eq!(count(&pool, "teams", f.printing_department).await?, 1);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL"]
    async fn department_with_step_in_use_is_a_conflict(pool: PgPool) -> anyhow::Result<()> {
        let f = testing::seed(&pool).await?;
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
        WorkOrderService::new(WorkOrderRepository::new(), OrganizationRepository::new())
            .create(&pool, f.tenant_id, &payload)
            .await?;

        let err = service()
            .delete_department(&pool, f.tenant_id, f.cutting_department)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Nada foi apagado
        assert_eq!(count(&pool, "teams", f.cutting_department).await?, 1);
        assert_eq!(count(&pool, "work_steps", f.cutting_department).await?, 1);
        assert!(service().get_department(&pool, f.tenant_id, f.cutting_department).await.is_ok());
        Ok(())
    }
}
