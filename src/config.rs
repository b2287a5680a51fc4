// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        MasterDataRepository, OrganizationRepository, PageAccessRepository, TenantRepository,
        UserRepository, WorkLogRepository, WorkOrderRepository, WorkQueueRepository,
    },
    services::{
        auth::AuthService, master_data_service::MasterDataService,
        organization_service::OrganizationService, page_access_service::PageAccessService,
        tenancy_service::TenantService, work_log_service::WorkLogService,
        work_order_service::WorkOrderService, work_queue_service::WorkQueueService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_TTL_DAYS: i64 = 7;

/// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub jwt_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

        let max_connections = parse_or_default("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let jwt_ttl_days = parse_or_default("JWT_TTL_DAYS", DEFAULT_JWT_TTL_DAYS)?;

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            max_connections,
            jwt_ttl_days,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválido: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub i18n_store: I18nStore,

    pub tenant_repo: TenantRepository,
    pub page_access_repo: PageAccessRepository,

    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub page_access_service: PageAccessService,
    pub master_data_service: MasterDataService,
    pub organization_service: OrganizationService,
    pub work_order_service: WorkOrderService,
    pub work_queue_service: WorkQueueService,
    pub work_log_service: WorkLogService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências em cima de uma pool já aberta.
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let page_access_repo = PageAccessRepository::new(db_pool.clone());
        let org_repo = OrganizationRepository::new();

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            config.jwt_ttl_days,
            db_pool.clone(),
        );
        let page_access_service = PageAccessService::new(page_access_repo.clone());
        let tenant_service = TenantService::new(tenant_repo.clone(), page_access_service.clone(), db_pool.clone());
        let master_data_service = MasterDataService::new(MasterDataRepository::new());
        let organization_service = OrganizationService::new(org_repo.clone());
        let work_order_service = WorkOrderService::new(WorkOrderRepository::new(), org_repo.clone());
        let work_queue_service = WorkQueueService::new(WorkQueueRepository::new(), org_repo.clone());
        let work_log_service = WorkLogService::new(WorkLogRepository::new(), org_repo);

        Self {
            db_pool,
            config,
            i18n_store: I18nStore::new(),
            tenant_repo,
            page_access_repo,
            auth_service,
            tenant_service,
            page_access_service,
            master_data_service,
            organization_service,
            work_order_service,
            work_queue_service,
            work_log_service,
        }
    }
}
