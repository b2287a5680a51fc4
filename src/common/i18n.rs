// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_LANG: &str = "en";

// (chave, en, pt)
// Placeholders no formato {nome} são substituídos em `format`.
const MESSAGES: &[(&str, &str, &str)] = &[
    ("error.validation", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    ("error.bad_request", "Invalid request: {detail}", "Requisição inválida: {detail}"),
    ("error.not_found", "{resource} not found.", "{resource} não encontrado."),
    (
        "error.work_step_mismatch",
        "Sub-job work step {subJobStep} does not belong to the team's department (team steps: {teamSteps}).",
        "A etapa {subJobStep} do sub-job não pertence ao departamento da equipe (etapas da equipe: {teamSteps}).",
    ),
    ("error.conflict", "Conflict: {detail}", "Conflito: {detail}"),
    ("error.email_exists", "This e-mail is already in use.", "Este e-mail já está em uso."),
    ("error.invalid_credentials", "Invalid e-mail or password.", "E-mail ou senha inválidos."),
    ("error.invalid_token", "Missing or invalid authentication token.", "Token de autenticação inválido ou ausente."),
    ("error.user_not_found", "User not found.", "Usuário não encontrado."),
    ("error.tenant_header_missing", "The X-Tenant-ID header is required.", "O cabeçalho X-Tenant-ID é obrigatório."),
    ("error.tenant_header_invalid", "The X-Tenant-ID header is not a valid UUID.", "O cabeçalho X-Tenant-ID inválido (não é um UUID)."),
    ("error.tenant_forbidden", "You do not have access to this tenant.", "Você não tem acesso a esta loja."),
    (
        "error.page_forbidden",
        "Access level '{required}' on page '{page}' is required for this action.",
        "Você precisa do nível '{required}' na página '{page}' para realizar esta ação.",
    ),
    ("error.internal", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
    ("validation.required", "This field is required.", "Este campo é obrigatório."),
    ("validation.count_min", "Count must be at least 1.", "A quantidade de pessoas deve ser no mínimo 1."),
    ("validation.percentage", "Percentage must be between 0 and 100.", "O percentual deve estar entre 0 e 100."),
    ("validation.not_negative", "The value cannot be negative.", "O valor não pode ser negativo."),
    ("validation.email", "The e-mail is invalid.", "O e-mail fornecido é inválido."),
    ("validation.password", "The password must have at least 6 characters.", "A senha deve ter no mínimo 6 caracteres."),
    ("validation.year", "Year must have four digits.", "O ano deve ter quatro dígitos."),
    ("validation.month", "Month must be between 1 and 12.", "O mês deve estar entre 1 e 12."),
];

/// Catálogo de mensagens por idioma, carregado uma vez e compartilhado pelo AppState.
#[derive(Debug, Clone)]
pub struct I18nStore {
    // chave -> (en, pt)
    messages: Arc<HashMap<&'static str, (&'static str, &'static str)>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let messages = MESSAGES
            .iter()
            .map(|(key, en, pt)| (*key, (*en, *pt)))
            .collect();
        Self { messages: Arc::new(messages) }
    }

    /// Traduz a chave; cai para o inglês e, por último, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        match self.messages.get(key) {
            Some((_, pt)) if lang == "pt" => pt.to_string(),
            Some((en, _)) => en.to_string(),
            None => key.to_string(),
        }
    }

    pub fn format(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_for_unknown_languages() {
        let store = I18nStore::new();
        assert_eq!(store.translate("th", "error.user_not_found"), "User not found.");
        assert_eq!(store.translate("pt", "error.user_not_found"), "Usuário não encontrado.");
    }

    #[test]
    fn unknown_keys_are_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "custom message"), "custom message");
    }

    #[test]
    fn replaces_placeholders() {
        let store = I18nStore::new();
        let msg = store.format("en", "error.not_found", &[("resource", "Team".to_string())]);
        assert_eq!(msg, "Team not found.");
    }
}
