// src/handlers.rs

pub mod auth;
pub mod master_data;
pub mod organization;
pub mod page_access;
pub mod tenancy;
pub mod work_logs;
pub mod work_orders;
pub mod work_queues;
