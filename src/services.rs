pub mod sales_service;
pub mod sync_service;

pub use sales_service::SalesService;
pub use sync_service::{PgSyncGateway, SyncService};
