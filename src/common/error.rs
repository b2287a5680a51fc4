// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale, models::page_access::AccessLevel};

// Erro de domínio. Serviços e repositórios só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Etapa {sub_job_step} do sub-job não pertence ao departamento da equipe {team_id}")]
    WorkStepMismatch {
        team_id: Uuid,
        sub_job_step: Uuid,
        team_steps: Vec<Uuid>,
    },

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cabeçalho X-Tenant-ID ausente")]
    TenantHeaderMissing,

    #[error("Cabeçalho X-Tenant-ID inválido")]
    TenantHeaderInvalid,

    #[error("Usuário não é membro ativo da loja")]
    TenantAccessDenied,

    #[error("Acesso '{required}' exigido na página {page}")]
    PageAccessDenied {
        page: &'static str,
        required: AccessLevel,
    },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// O erro que sai pela API: status + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::WorkStepMismatch { .. }
            | AppError::TenantHeaderMissing
            | AppError::TenantHeaderInvalid => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound(_) | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::TenantAccessDenied | AppError::PageAccessDenied { .. } => StatusCode::FORBIDDEN,
            AppError::DatabaseError(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para `ApiError` no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let error = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(key) => i18n.translate(lang, key),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status,
                    error: i18n.translate(lang, "error.validation"),
                    details: Some(json!(details)),
                };
            }
            AppError::BadRequest(detail) => {
                i18n.format(lang, "error.bad_request", &[("detail", detail.clone())])
            }
            AppError::ResourceNotFound(resource) => {
                i18n.format(lang, "error.not_found", &[("resource", resource.clone())])
            }
            AppError::WorkStepMismatch { sub_job_step, team_steps, .. } => {
                let steps = team_steps.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ");
                i18n.format(
                    lang,
                    "error.work_step_mismatch",
                    &[("subJobStep", sub_job_step.to_string()), ("teamSteps", steps)],
                )
            }
            AppError::Conflict(detail) => i18n.format(lang, "error.conflict", &[("detail", detail.clone())]),
            AppError::EmailAlreadyExists => i18n.translate(lang, "error.email_exists"),
            AppError::InvalidCredentials => i18n.translate(lang, "error.invalid_credentials"),
            AppError::InvalidToken => i18n.translate(lang, "error.invalid_token"),
            AppError::UserNotFound => i18n.translate(lang, "error.user_not_found"),
            AppError::TenantHeaderMissing => i18n.translate(lang, "error.tenant_header_missing"),
            AppError::TenantHeaderInvalid => i18n.translate(lang, "error.tenant_header_invalid"),
            AppError::TenantAccessDenied => i18n.translate(lang, "error.tenant_forbidden"),
            AppError::PageAccessDenied { page, required } => i18n.format(
                lang,
                "error.page_forbidden",
                &[("page", page.to_string()), ("required", required.to_string())],
            ),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                i18n.format(lang, "error.not_found", &[("resource", "Record".to_string())])
            }
            // Todo o resto vira 500: loga o detalhe e devolve mensagem genérica.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                i18n.translate(lang, "error.internal")
            }
        };

        let details = match &self {
            AppError::WorkStepMismatch { team_id, sub_job_step, team_steps } => Some(json!({
                "teamId": team_id,
                "subJobWorkStepId": sub_job_step,
                "teamWorkStepIds": team_steps,
            })),
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// Fallback para quando não há Locale disponível (ex.: rejeições de extratores).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::new()).into_response()
    }
}

/// Traduz violações de unicidade do Postgres em `Conflict`.
pub fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    e.into()
}

/// Registro ainda referenciado (FK) vira `Conflict` em vez de 500.
pub fn map_foreign_key_violation(e: sqlx::Error, message: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[rstest]
    #[case(AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::ResourceNotFound("Team".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::Conflict("dup".into()), StatusCode::CONFLICT)]
    #[case(AppError::InvalidToken, StatusCode::UNAUTHORIZED)]
    #[case(AppError::TenantAccessDenied, StatusCode::FORBIDDEN)]
    #[case(AppError::TenantHeaderMissing, StatusCode::BAD_REQUEST)]
    #[case(AppError::DatabaseError(sqlx::Error::RowNotFound), StatusCode::NOT_FOUND)]
    #[case(AppError::DatabaseError(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AppError::InternalServerError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_errors_to_http_status(#[case] err: AppError, #[case] expected: StatusCode) {
        let api = err.to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, expected);
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("connection string leaked"))
            .to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }

    #[test]
    fn step_mismatch_names_both_steps() {
        let sub_job_step = Uuid::new_v4();
        let team_step = Uuid::new_v4();
        let api = AppError::WorkStepMismatch {
            team_id: Uuid::new_v4(),
            sub_job_step,
            team_steps: vec![team_step],
        }
        .to_api_error(&en(), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.contains(&sub_job_step.to_string()));
        assert!(api.error.contains(&team_step.to_string()));
        let details = api.details.expect("details");
        assert_eq!(details["subJobWorkStepId"], json!(sub_job_step));
    }

    #[test]
    fn validation_errors_are_translated_per_field() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("range");
        err.message = Some("validation.count_min".into());
        errors.add("count", err);

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("pt".to_string()), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Um ou mais campos são inválidos.");
        let details = api.details.expect("details");
        assert_eq!(details["count"][0], "A quantidade de pessoas deve ser no mínimo 1.");
    }
}
