pub mod analytics;
pub mod auth;
pub mod inventory;
pub mod master;
pub mod operations;
pub mod workflow;
