// src/models/work_queue.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::work_orders::{JobStatus, WorkOrderStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkQueueEntry {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub sub_job_id: Uuid,
    pub team_id: Uuid,
    #[schema(example = 1)]
    pub priority: i32,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item da fila com os dados do sub-job e da ordem (tela da equipe).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemView {
    pub id: Uuid,
    pub team_id: Uuid,
    pub priority: i32,
    pub status: JobStatus,
    pub sub_job_id: Uuid,
    pub product_name: String,
    pub work_step_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
    pub production_cost: Decimal,
    pub total_cost: Decimal,
    pub work_order_id: Uuid,
    pub order_number: String,
    pub work_order_title: String,
    pub delivery_date: NaiveDate,
}

/// Sub-job disponível para entrar em fila numa etapa.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSubJob {
    pub id: Uuid,
    pub work_order_id: Uuid,
    pub order_number: String,
    pub work_order_status: WorkOrderStatus,
    pub product_name: String,
    pub department_id: Uuid,
    pub work_step_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
    pub production_cost: Decimal,
    pub total_cost: Decimal,
    pub status: JobStatus,
    pub delivery_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddJobToQueuePayload {
    pub sub_job_id: Uuid,
    pub team_id: Uuid,
    #[validate(range(min = 1, message = "validation.count_min"))]
    #[schema(example = 1)]
    pub priority: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderQueuePayload {
    pub team_id: Uuid,
    /// IDs dos itens de fila na nova ordem; priority = posição (1-based)
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQueueStatusPayload {
    pub status: JobStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearQueueResponse {
    pub team_id: Uuid,
    #[schema(example = 4)]
    pub deleted: u64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableSubJobsQuery {
    pub work_step_id: Uuid,
}
