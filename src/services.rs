pub mod analytics_service;
pub mod auth_service;
pub mod document_service;
pub mod inventory_service;
pub mod master_service;
pub mod operations_service;
