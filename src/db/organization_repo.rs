// src/db/organization_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_foreign_key_violation, AppError},
    models::organization::{
        CreateDepartmentPayload, CreateEmployeePayload, CreateTeamPayload, CreateWorkStepPayload,
        Department, Employee, Team, UpdateDepartmentPayload, UpdateEmployeePayload,
        UpdateTeamPayload, UpdateWorkStepPayload, WorkStep,
    },
};

#[derive(Clone, Default)]
pub struct OrganizationRepository;

impl OrganizationRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  DEPARTAMENTOS
    // =========================================================================

    pub async fn list_departments<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn find_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
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
        let row = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (tenant_id, name, department_type, manager, location, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.department_type)
        .bind(payload.manager.as_deref())
        .bind(&payload.location)
        .bind(payload.status)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    pub async fn update_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateDepartmentPayload,
    ) -> Result<Option<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments SET
                name = COALESCE($3, name),
                department_type = COALESCE($4, department_type),
                manager = COALESCE($5, manager),
                location = COALESCE($6, location),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.name.as_deref())
        .bind(payload.department_type.as_deref())
        .bind(payload.manager.as_deref())
        .bind(payload.location.as_deref())
        .bind(payload.status)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    pub async fn delete_department<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await
            .map_err(|e| map_foreign_key_violation(e, "Department is referenced by sub-jobs"))?;

        Ok(result.rows_affected() > 0)
    }

    // Cascata manual do departamento: pessoal das equipes, equipes e etapas.
    // Filas e apontamentos das equipes caem junto via ON DELETE CASCADE.

    pub async fn delete_employees_of_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM employees
            WHERE tenant_id = $1
              AND team_id IN (SELECT id FROM teams WHERE tenant_id = $1 AND department_id = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(department_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_teams_of_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM teams WHERE tenant_id = $1 AND department_id = $2")
            .bind(tenant_id)
            .bind(department_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_work_steps_of_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_steps WHERE tenant_id = $1 AND department_id = $2")
            .bind(tenant_id)
            .bind(department_id)
            .execute(executor)
            .await
            .map_err(|e| map_foreign_key_violation(e, "Work step is referenced by sub-jobs"))?;

        Ok(result.rows_affected())
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
        let rows = sqlx::query_as::<_, Team>(
            r#"
            SELECT * FROM teams
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR department_id = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(department_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn list_teams_of_departments<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_ids: &[Uuid],
    ) -> Result<Vec<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Team>(
            r#"
            SELECT * FROM teams
            WHERE tenant_id = $1 AND department_id = ANY($2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(department_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn find_team<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Option<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }

    pub async fn create_team<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateTeamPayload,
    ) -> Result<Team, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (tenant_id, department_id, name, leader, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.department_id)
        .bind(&payload.name)
        .bind(payload.leader.as_deref())
        .bind(payload.status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Department does not exist"))
    }

    pub async fn update_team<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateTeamPayload,
    ) -> Result<Option<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams SET
                department_id = COALESCE($3, department_id),
                name = COALESCE($4, name),
                leader = COALESCE($5, leader),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.department_id)
        .bind(payload.name.as_deref())
        .bind(payload.leader.as_deref())
        .bind(payload.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Department does not exist"))?;

        Ok(row)
    }

    pub async fn delete_team<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Etapas do departamento da equipe, na ordem de produção.
    pub async fn work_step_ids_for_team<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT ws.id
            FROM work_steps ws
            JOIN teams t ON t.department_id = ws.department_id AND t.tenant_id = ws.tenant_id
            WHERE t.id = $1 AND t.tenant_id = $2
            ORDER BY ws.step_order ASC
            "#,
        )
        .bind(team_id)
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    // =========================================================================
    //  PESSOAL
    // =========================================================================

    pub async fn list_employees<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Option<Uuid>,
    ) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR team_id = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(team_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Pessoal de várias equipes de uma vez (relatório diário).
    pub async fn list_employees_of_teams<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE tenant_id = $1 AND team_id = ANY($2)",
        )
        .bind(tenant_id)
        .bind(team_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn find_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }

    pub async fn create_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateEmployeePayload,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (
                tenant_id, team_id, count, average_wage,
                overhead_percentage, management_percentage, description, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.team_id)
        .bind(payload.count)
        .bind(payload.average_wage)
        .bind(payload.overhead_percentage)
        .bind(payload.management_percentage)
        .bind(payload.description.as_deref())
        .bind(payload.status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Team does not exist"))
    }

    pub async fn update_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateEmployeePayload,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                team_id = COALESCE($3, team_id),
                count = COALESCE($4, count),
                average_wage = COALESCE($5, average_wage),
                overhead_percentage = COALESCE($6, overhead_percentage),
                management_percentage = COALESCE($7, management_percentage),
                description = COALESCE($8, description),
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.team_id)
        .bind(payload.count)
        .bind(payload.average_wage)
        .bind(payload.overhead_percentage)
        .bind(payload.management_percentage)
        .bind(payload.description.as_deref())
        .bind(payload.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Team does not exist"))?;

        Ok(row)
    }

    pub async fn delete_employee<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_employees_of_team<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        team_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employees WHERE tenant_id = $1 AND team_id = $2")
            .bind(tenant_id)
            .bind(team_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
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
        let rows = sqlx::query_as::<_, WorkStep>(
            r#"
            SELECT * FROM work_steps
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR department_id = $2)
            ORDER BY department_id, step_order ASC, name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(department_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn list_work_steps_of_departments<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_ids: &[Uuid],
    ) -> Result<Vec<WorkStep>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, WorkStep>(
            r#"
            SELECT * FROM work_steps
            WHERE tenant_id = $1 AND department_id = ANY($2)
            ORDER BY step_order ASC, name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(department_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Pares (etapa, departamento) das etapas da loja entre os ids pedidos.
    pub async fn work_step_departments<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        step_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT id, department_id FROM work_steps WHERE tenant_id = $1 AND id = ANY($2)",
        )
        .bind(tenant_id)
        .bind(step_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn find_work_step<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<WorkStep>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkStep>("SELECT * FROM work_steps WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }

    /// Sem `order` explícito, a etapa vai para o fim do departamento.
    pub async fn create_work_step<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateWorkStepPayload,
    ) -> Result<WorkStep, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WorkStep>(
            r#"
            INSERT INTO work_steps (
                tenant_id, department_id, name, description, duration, required_skills, step_order
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, (
                    SELECT COALESCE(MAX(step_order), 0) + 1
                    FROM work_steps
                    WHERE tenant_id = $1 AND department_id = $2
                ))
            )
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.department_id)
        .bind(&payload.name)
        .bind(payload.description.as_deref())
        .bind(payload.duration)
        .bind(&payload.required_skills)
        .bind(payload.order)
        .fetch_one(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Department does not exist"))
    }

    pub async fn update_work_step<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateWorkStepPayload,
    ) -> Result<Option<WorkStep>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkStep>(
            r#"
            UPDATE work_steps SET
                department_id = COALESCE($3, department_id),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                duration = COALESCE($6, duration),
                required_skills = COALESCE($7, required_skills),
                step_order = COALESCE($8, step_order),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(payload.department_id)
        .bind(payload.name.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.duration)
        .bind(payload.required_skills.as_deref())
        .bind(payload.order)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, "Department does not exist"))?;

        Ok(row)
    }

    pub async fn delete_work_step<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_steps WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await
            .map_err(|e| map_foreign_key_violation(e, "Work step is referenced by sub-jobs"))?;

        Ok(result.rows_affected() > 0)
    }
}
