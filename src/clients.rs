pub mod source;
pub use source::{CatalogSource, Paginated, VisitSource};
pub mod yampi;
pub use yampi::YampiClient;
pub mod umami;
pub use umami::UmamiClient;
pub mod clarity;
pub use clarity::ClarityClient;
