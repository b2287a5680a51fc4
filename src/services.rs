pub mod auth;
pub mod bulk_generator;
pub mod cost_calculator;
pub mod master_data_service;
pub mod order_number;
pub mod organization_service;
pub mod page_access_service;
pub mod price_change;
pub mod sub_job_sync;
pub mod tenancy_service;
pub mod work_log_service;
pub mod work_order_service;
pub mod work_queue_service;
