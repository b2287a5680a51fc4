// src/models/organization.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entity_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Active,
    Inactive,
}

// ---
// Validação Customizada
// ---
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.not_negative".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.percentage".into());
        return Err(err);
    }
    Ok(())
}

// =============================================================================
//  DEPARTAMENTOS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Costura")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "production")]
    pub department_type: String,
    #[schema(example = "Maria Souza")]
    pub manager: Option<String>,
    #[schema(example = "Galpão 2")]
    pub location: String,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "validation.required"))]
    pub department_type: String,
    pub manager: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub department_type: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
    pub status: Option<EntityStatus>,
}

// =============================================================================
//  EQUIPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub department_id: Uuid,
    #[schema(example = "Equipe A")]
    pub name: String,
    pub leader: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamPayload {
    pub department_id: Uuid,
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    pub leader: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamPayload {
    pub department_id: Option<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: Option<String>,
    pub leader: Option<String>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TeamListQuery {
    pub department_id: Option<Uuid>,
}

/// Custo diário da equipe (soma dos registros de pessoal ativos).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamDailyCost {
    pub team_id: Uuid,
    #[schema(example = 12)]
    pub headcount: i64,
    #[schema(example = "2530.00")]
    pub daily_cost: Decimal,
}

// =============================================================================
//  PESSOAL (registro de custo)
// =============================================================================

// Um registro representa um grupo de pessoas da equipe, não um indivíduo:
// `count` multiplica o salário médio.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub team_id: Uuid,
    #[schema(example = 5)]
    pub count: i32,
    #[schema(example = "400.00")]
    pub average_wage: Decimal,
    #[schema(example = "15.00")]
    pub overhead_percentage: Decimal,
    #[schema(example = "10.00")]
    pub management_percentage: Decimal,
    pub description: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithCost {
    #[serde(flatten)]
    pub employee: Employee,
    #[schema(example = "2530.00")]
    pub daily_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    pub team_id: Uuid,
    #[validate(range(min = 1, message = "validation.count_min"))]
    #[schema(example = 5)]
    pub count: i32,
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "400.00")]
    pub average_wage: Decimal,
    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    pub overhead_percentage: Decimal,
    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    pub management_percentage: Decimal,
    pub description: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeePayload {
    pub team_id: Option<Uuid>,
    #[validate(range(min = 1, message = "validation.count_min"))]
    pub count: Option<i32>,
    #[validate(custom(function = "validate_not_negative"))]
    pub average_wage: Option<Decimal>,
    #[validate(custom(function = "validate_percentage"))]
    pub overhead_percentage: Option<Decimal>,
    #[validate(custom(function = "validate_percentage"))]
    pub management_percentage: Option<Decimal>,
    pub description: Option<String>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeListQuery {
    pub team_id: Option<Uuid>,
}

// =============================================================================
//  ETAPAS DE TRABALHO
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkStep {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub department_id: Uuid,
    #[schema(example = "Corte")]
    pub name: String,
    pub description: Option<String>,
    // Minutos
    #[schema(example = 30)]
    pub duration: i32,
    #[schema(example = json!(["overloque", "reta"]))]
    pub required_skills: Vec<String>,
    #[sqlx(rename = "step_order")]
    #[schema(example = 1)]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkStepPayload {
    pub department_id: Uuid,
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "validation.not_negative"))]
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkStepPayload {
    pub department_id: Option<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub duration: Option<i32>,
    pub required_skills: Option<Vec<String>>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WorkStepListQuery {
    pub department_id: Option<Uuid>,
}
