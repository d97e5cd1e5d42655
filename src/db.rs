pub mod catalog_repo;
pub use catalog_repo::ProductRepository;
pub mod sales_repo;
pub use sales_repo::SaleRepository;
pub mod inventory_repo;
pub use inventory_repo::StockMovementRepository;
pub mod metrics_repo;
pub use metrics_repo::MetricRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
