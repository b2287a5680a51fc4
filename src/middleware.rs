pub mod auth;
pub mod i18n;
pub mod page_access;
pub mod tenancy;
