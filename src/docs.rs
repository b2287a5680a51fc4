// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Tenancy ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_my_tenants,

        // --- CADASTROS ---
        handlers::master_data::colors::list,
        handlers::master_data::colors::get_one,
        handlers::master_data::colors::create,
        handlers::master_data::colors::update,
        handlers::master_data::colors::delete,
        handlers::master_data::sizes::list,
        handlers::master_data::sizes::get_one,
        handlers::master_data::sizes::create,
        handlers::master_data::sizes::update,
        handlers::master_data::sizes::delete,
        handlers::master_data::work_types::list,
        handlers::master_data::work_types::get_one,
        handlers::master_data::work_types::create,
        handlers::master_data::work_types::update,
        handlers::master_data::work_types::delete,

        // --- ORGANIZAÇÃO ---
        handlers::organization::list_departments,
        handlers::organization::get_department,
        handlers::organization::create_department,
        handlers::organization::update_department,
        handlers::organization::delete_department,
        handlers::organization::list_teams,
        handlers::organization::get_team,
        handlers::organization::create_team,
        handlers::organization::update_team,
        handlers::organization::delete_team,
        handlers::organization::get_team_daily_cost,
        handlers::organization::list_employees,
        handlers::organization::get_employee,
        handlers::organization::create_employee,
        handlers::organization::update_employee,
        handlers::organization::delete_employee,
        handlers::organization::list_work_steps,
        handlers::organization::get_work_step,
        handlers::organization::create_work_step,
        handlers::organization::update_work_step,
        handlers::organization::delete_work_step,

        // --- ORDENS DE PRODUÇÃO ---
        handlers::work_orders::list_work_orders,
        handlers::work_orders::create_work_order,
        handlers::work_orders::get_work_order,
        handlers::work_orders::update_work_order,
        handlers::work_orders::delete_work_order,
        handlers::work_orders::reorder_sub_jobs,
        handlers::work_orders::generate_sub_jobs,
        handlers::work_orders::count_work_orders,
        handlers::work_orders::price_check,

        // --- FILAS ---
        handlers::work_queues::get_team_queue,
        handlers::work_queues::add_job_to_queue,
        handlers::work_queues::reorder_queue,
        handlers::work_queues::remove_from_queue,
        handlers::work_queues::clear_team_queue,
        handlers::work_queues::update_queue_status,
        handlers::work_queues::available_sub_jobs,

        // --- APONTAMENTOS ---
        handlers::work_logs::list_work_logs,
        handlers::work_logs::create_work_log,
        handlers::work_logs::delete_work_log,
        handlers::work_logs::daily_report,

        // --- ACESSO POR PÁGINA ---
        handlers::page_access::list_roles,
        handlers::page_access::create_role,
        handlers::page_access::get_page_access,
        handlers::page_access::upsert_page_access,
        handlers::page_access::get_my_page_access,
        handlers::page_access::get_config,
        handlers::page_access::bulk_update,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- TENANCY ---
            models::tenancy::Tenant,
            models::tenancy::TenantMember,
            models::tenancy::CreateTenantPayload,

            // --- Cadastros ---
            models::master_data::LookupItem,
            models::master_data::CreateLookupPayload,
            models::master_data::UpdateLookupPayload,

            // --- Organização ---
            models::organization::EntityStatus,
            models::organization::Department,
            models::organization::CreateDepartmentPayload,
            models::organization::UpdateDepartmentPayload,
            models::organization::Team,
            models::organization::CreateTeamPayload,
            models::organization::UpdateTeamPayload,
            models::organization::TeamDailyCost,
            models::organization::Employee,
            models::organization::EmployeeWithCost,
            models::organization::CreateEmployeePayload,
            models::organization::UpdateEmployeePayload,
            models::organization::WorkStep,
            models::organization::CreateWorkStepPayload,
            models::organization::UpdateWorkStepPayload,

            // --- Ordens ---
            models::work_orders::WorkOrderStatus,
            models::work_orders::JobStatus,
            models::work_orders::WorkOrder,
            models::work_orders::SubJob,
            models::work_orders::SubJobInput,
            models::work_orders::CreateWorkOrderPayload,
            models::work_orders::UpdateWorkOrderPayload,
            models::work_orders::WorkOrderDetail,
            models::work_orders::ReconciliationSummary,
            models::work_orders::WorkOrderUpdateResponse,
            models::work_orders::ReorderSubJobsPayload,
            models::work_orders::OrderCountPayload,
            models::work_orders::OrderCountResponse,
            models::work_orders::EditedSubJob,
            models::work_orders::PriceCheckPayload,
            models::work_orders::PriceCheckResult,
            models::work_orders::QuantityCell,
            models::work_orders::GenerateSubJobsPayload,
            models::work_orders::SubJobDraft,

            // --- Filas ---
            models::work_queue::WorkQueueEntry,
            models::work_queue::QueueItemView,
            models::work_queue::AvailableSubJob,
            models::work_queue::AddJobToQueuePayload,
            models::work_queue::ReorderQueuePayload,
            models::work_queue::UpdateQueueStatusPayload,
            models::work_queue::ClearQueueResponse,

            // --- Apontamentos ---
            models::work_logs::WorkLog,
            models::work_logs::CreateWorkLogPayload,
            models::work_logs::TeamDailyReport,
            models::work_logs::DailyReport,

            // --- Acesso ---
            models::page_access::AccessLevel,
            models::page_access::Role,
            models::page_access::CreateRolePayload,
            models::page_access::PageAccess,
            models::page_access::UpsertPageAccessPayload,
            models::page_access::BulkUpdatePageAccessPayload,
            models::page_access::BulkUpdateResult,
            models::page_access::PageDefinition,
            models::page_access::PageAccessConfig,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Tenancy", description = "Gestão de Lojas e Acesso"),
        (name = "Colors", description = "Cadastro de Cores"),
        (name = "Sizes", description = "Cadastro de Tamanhos"),
        (name = "Work Types", description = "Cadastro de Tipos de Trabalho"),
        (name = "Departments", description = "Departamentos da Fábrica"),
        (name = "Teams", description = "Equipes e Custo Diário"),
        (name = "Employees", description = "Pessoal e Custo por Pessoa"),
        (name = "Work Steps", description = "Etapas de Produção por Departamento"),
        (name = "Work Orders", description = "Ordens de Produção e Sub-jobs"),
        (name = "Work Queues", description = "Filas de Trabalho por Equipe"),
        (name = "Work Logs", description = "Apontamentos e Relatório Diário"),
        (name = "Page Access", description = "Cargos e Acesso por Página")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/auth/login",
            "/api/colors/{id}",
            "/api/work-types",
            "/api/teams/{id}/daily-cost",
            "/api/work-orders/{id}/sub-jobs/reorder",
            "/api/work-queues/team/{teamId}/clear",
            "/api/work-logs/daily-report",
            "/api/page-access-management/bulk-update",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "faltando {expected}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
