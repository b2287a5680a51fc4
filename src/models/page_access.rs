// src/models/page_access.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// A ordem das variantes importa: none < view < edit < create
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "access_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    None,
    View,
    Edit,
    Create,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 4] = [AccessLevel::None, AccessLevel::View, AccessLevel::Edit, AccessLevel::Create];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::View => "view",
            AccessLevel::Edit => "edit",
            AccessLevel::Create => "create",
        }
    }

    pub fn allows(&self, required: AccessLevel) -> bool {
        *self >= required
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Supervisor de Produção")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "Líder de Costura")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageAccess {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub role_id: Uuid,
    #[schema(example = "/work-orders")]
    pub page_url: String,
    #[schema(example = "Work Orders")]
    pub page_name: String,
    pub access_level: AccessLevel,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageAccessQuery {
    pub role_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPageAccessPayload {
    pub role_id: Uuid,
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "/work-orders")]
    pub page_url: String,
    /// Aceito por compatibilidade; o nome gravado é sempre o do manifesto.
    #[serde(default)]
    #[schema(example = "Work Orders")]
    pub page_name: Option<String>,
    #[schema(example = "edit")]
    pub access_level: AccessLevel,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdatePageAccessPayload {
    #[validate(nested)]
    #[schema(example = json!([{"roleId": "550e8400-e29b-41d4-a716-446655440000", "pageUrl": "/work-queues", "pageName": "Work Queues", "accessLevel": "view"}]))]
    pub updates: Vec<UpsertPageAccessPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResult {
    pub updated: usize,
    pub entries: Vec<PageAccess>,
}

/// Uma página do manifesto estático (ver `services::page_access_service::PAGE_MANIFEST`).
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    #[schema(example = "/work-orders")]
    pub url: &'static str,
    #[schema(example = "Work Orders")]
    pub name: &'static str,
    #[schema(example = "Production")]
    pub group: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageAccessConfig {
    #[schema(example = 1)]
    pub manifest_version: u32,
    pub pages: Vec<PageDefinition>,
    pub roles: Vec<Role>,
    pub access_levels: Vec<AccessLevel>,
    pub entries: Vec<PageAccess>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_from_none_to_create() {
        assert!(AccessLevel::Create.allows(AccessLevel::Edit));
        assert!(AccessLevel::Edit.allows(AccessLevel::View));
        assert!(AccessLevel::View.allows(AccessLevel::View));
        assert!(!AccessLevel::View.allows(AccessLevel::Edit));
        assert!(!AccessLevel::None.allows(AccessLevel::View));
    }

    #[test]
    fn serializes_as_lowercase_strings() {
        assert_eq!(serde_json::to_string(&AccessLevel::Create).unwrap(), "\"create\"");
        let level: AccessLevel = serde_json::from_str("\"view\"").unwrap();
        assert_eq!(level, AccessLevel::View);
    }
}
