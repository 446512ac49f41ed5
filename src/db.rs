pub mod analytics_repo;
pub mod inventory_repo;
pub mod master_repo;
pub mod operations_repo;
pub mod scope;
pub mod sequence_repo;
pub mod stock_repo;
pub mod user_repo;
