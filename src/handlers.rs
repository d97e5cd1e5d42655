pub mod catalog;
pub mod health;
pub mod metrics;
pub mod sales;
pub mod sync;
pub mod tenancy;
