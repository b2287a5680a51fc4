// src/models/master_data.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Tabelas de consulta ---
// Cores, tamanhos e tipos de trabalho têm o mesmo formato; só muda a tabela.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Color,
    Size,
    WorkType,
}

impl LookupKind {
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Color => "colors",
            LookupKind::Size => "sizes",
            LookupKind::WorkType => "work_types",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookupKind::Color => "Color",
            LookupKind::Size => "Size",
            LookupKind::WorkType => "Work type",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Vermelho")]
    pub name: String,
    // Hex para cores ("#FF0000"), sigla para tamanhos ("M")
    #[schema(example = "#FF0000")]
    pub code: Option<String>,
    pub description: Option<String>,
    #[schema(example = 1)]
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLookupPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "Azul Marinho")]
    pub name: String,
    #[schema(example = "#1F2A44")]
    pub code: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

// PUT e PATCH usam o mesmo payload: campos ausentes não mudam
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLookupPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LookupListQuery {
    /// Só registros ativos
    pub active_only: Option<bool>,
}
