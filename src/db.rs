pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod page_access_repo;
pub use page_access_repo::PageAccessRepository;
pub mod master_data_repo;
pub use master_data_repo::MasterDataRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod work_order_repo;
pub use work_order_repo::WorkOrderRepository;
pub mod work_queue_repo;
pub use work_queue_repo::WorkQueueRepository;
pub mod work_log_repo;
pub use work_log_repo::WorkLogRepository;
