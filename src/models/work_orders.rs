// src/models/work_orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::organization::validate_not_negative;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

// Status compartilhado por sub-jobs e itens de fila
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

// =============================================================================
//  ORDEM DE PRODUÇÃO
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "JB202503007")]
    pub order_number: String,
    pub quotation_id: Option<Uuid>,
    pub customer_id: Uuid,
    #[schema(example = "Camisetas uniforme escolar")]
    pub title: String,
    pub description: Option<String>,
    pub work_type_id: Option<Uuid>,
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
    #[schema(example = "15000.00")]
    pub total_amount: Decimal,
    pub status: WorkOrderStatus,
    #[schema(example = 1)]
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubJob {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub work_order_id: Uuid,
    #[schema(example = "Camiseta Polo")]
    pub product_name: String,
    pub department_id: Uuid,
    pub work_step_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    #[schema(example = 100)]
    pub quantity: i32,
    // Custo unitário
    #[schema(example = "12.50")]
    pub production_cost: Decimal,
    // quantity × production_cost
    #[schema(example = "1250.00")]
    pub total_cost: Decimal,
    #[schema(example = 1)]
    pub sort_order: i32,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item da lista desejada de sub-jobs (criação e atualização).
/// `id` ausente ou desconhecido = novo sub-job.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubJobInput {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub product_name: String,
    pub department_id: Uuid,
    pub work_step_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub quantity: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub production_cost: Decimal,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkOrderPayload {
    pub quotation_id: Option<Uuid>,
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "validation.required"))]
    pub title: String,
    pub description: Option<String>,
    pub work_type_id: Option<Uuid>,
    #[schema(example = "2025-04-30")]
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
    // Ausente = soma dos totais dos sub-jobs
    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub status: WorkOrderStatus,
    pub priority: Option<i32>,
    #[validate(nested)]
    #[serde(default)]
    pub sub_jobs: Vec<SubJobInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkOrderPayload {
    pub quotation_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub work_type_id: Option<Uuid>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Option<Decimal>,
    pub status: Option<WorkOrderStatus>,
    pub priority: Option<i32>,
    /// Lista COMPLETA desejada: o que não vier aqui é apagado.
    #[validate(nested)]
    pub sub_jobs: Vec<SubJobInput>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDetail {
    #[serde(flatten)]
    pub header: WorkOrder,
    pub sub_jobs: Vec<SubJob>,
    /// Algum sub-job desta ordem já está na fila de uma equipe
    pub has_queued_jobs: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    pub kept: usize,
    pub inserted: usize,
    pub deleted: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderUpdateResponse {
    pub work_order: WorkOrderDetail,
    pub reconciliation: ReconciliationSummary,
    pub price_changed: bool,
    pub has_queued_jobs: bool,
    /// priceChanged && hasQueuedJobs: o cliente deve avisar e levar ao replanejamento
    pub requires_replan: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WorkOrderListQuery {
    pub status: Option<WorkOrderStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSubJobsPayload {
    #[schema(example = json!(["550e8400-e29b-41d4-a716-446655440001", "550e8400-e29b-41d4-a716-446655440000"]))]
    pub sub_job_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCountPayload {
    #[validate(range(min = 2000, max = 9999, message = "validation.year"))]
    #[schema(example = 2025)]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "validation.month"))]
    #[schema(example = 3)]
    pub month: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCountResponse {
    #[schema(example = 6)]
    pub count: i64,
    #[schema(example = "JB202503007")]
    pub next_order_number: String,
}

// =============================================================================
//  DETECÇÃO DE MUDANÇA DE PREÇO
// =============================================================================

/// Sub-job como está no formulário de edição. O custo chega do cliente
/// como número ou texto; qualquer coisa não numérica conta como 0.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditedSubJob {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub product_name: String,
    pub color_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = String, example = "12.50")]
    pub production_cost: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceCheckPayload {
    pub sub_jobs: Vec<EditedSubJob>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceCheckResult {
    pub price_changed: bool,
    pub has_queued_jobs: bool,
    pub requires_replan: bool,
}

impl PriceCheckResult {
    pub fn new(price_changed: bool, has_queued_jobs: bool) -> Self {
        Self {
            price_changed,
            has_queued_jobs,
            requires_replan: price_changed && has_queued_jobs,
        }
    }
}

pub fn parse_cost(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_cost).unwrap_or(Decimal::ZERO))
}

// =============================================================================
//  GERADOR DE SUB-JOBS EM LOTE
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuantityCell {
    pub department_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSubJobsPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub product_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub production_cost: Decimal,
    #[validate(length(min = 1, message = "validation.required"))]
    pub department_ids: Vec<Uuid>,
    #[serde(default)]
    pub team_ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub color_ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub size_ids: Vec<Uuid>,
    /// Matriz esparsa (departamento, cor, tamanho) -> quantidade
    #[serde(default)]
    pub quantities: Vec<QuantityCell>,
}

/// Rascunho gerado; só vira sub-job quando o usuário confirma.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubJobDraft {
    pub product_name: String,
    pub department_id: Uuid,
    pub work_step_id: Uuid,
    pub team_id: Option<Uuid>,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
    pub production_cost: Decimal,
    pub total_cost: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case(json!(12), dec("12"))]
    #[case(json!(12.5), dec("12.5"))]
    #[case(json!("7.25"), dec("7.25"))]
    #[case(json!(" 3 "), dec("3"))]
    #[case(json!("abc"), Decimal::ZERO)]
    #[case(json!(null), Decimal::ZERO)]
    #[case(json!(true), Decimal::ZERO)]
    fn parses_costs_leniently(#[case] raw: Value, #[case] expected: Decimal) {
        assert_eq!(parse_cost(&raw), expected);
    }

    #[test]
    fn edited_sub_job_accepts_missing_or_textual_cost() {
        let parsed: EditedSubJob = serde_json::from_value(json!({
            "productName": "Polo",
            "productionCost": "not a number"
        }))
        .unwrap();
        assert_eq!(parsed.production_cost, Decimal::ZERO);

        let parsed: EditedSubJob = serde_json::from_value(json!({ "productName": "Polo" })).unwrap();
        assert_eq!(parsed.production_cost, Decimal::ZERO);
    }

    #[test]
    fn requires_replan_only_when_price_changed_and_queued() {
        assert!(PriceCheckResult::new(true, true).requires_replan);
        assert!(!PriceCheckResult::new(true, false).requires_replan);
        assert!(!PriceCheckResult::new(false, true).requires_replan);
    }
}
