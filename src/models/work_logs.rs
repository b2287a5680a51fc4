// src/models/work_logs.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::organization::validate_not_negative;

// Apontamento diário de produção de uma equipe
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub team_id: Uuid,
    pub sub_job_id: Option<Uuid>,
    #[schema(example = "2025-03-14")]
    pub work_date: NaiveDate,
    #[schema(example = 80)]
    pub quantity_completed: i32,
    #[schema(example = "7.5")]
    pub hours_worked: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkLogPayload {
    pub team_id: Uuid,
    pub sub_job_id: Option<Uuid>,
    #[schema(example = "2025-03-14")]
    pub work_date: NaiveDate,
    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub quantity_completed: i32,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub hours_worked: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WorkLogListQuery {
    pub date: Option<NaiveDate>,
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    pub date: NaiveDate,
}

/// Totais de apontamento de uma equipe num dia (linha vinda do banco).
#[derive(Debug, Clone, FromRow)]
pub struct TeamLogTotals {
    pub team_id: Uuid,
    pub team_name: String,
    pub entries: i64,
    pub quantity_completed: i64,
    pub hours_worked: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamDailyReport {
    pub team_id: Uuid,
    pub team_name: String,
    pub entries: i64,
    pub quantity_completed: i64,
    pub hours_worked: Decimal,
    pub labor_cost: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub teams: Vec<TeamDailyReport>,
    pub total_quantity: i64,
    pub total_labor_cost: Decimal,
}
