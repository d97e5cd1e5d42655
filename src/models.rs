pub mod catalog;
pub mod inventory;
pub mod metrics;
pub mod sales;
pub mod tenancy;
