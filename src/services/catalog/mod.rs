pub mod memory;
pub mod postgrest;
pub mod store;

pub use memory::InMemoryCatalog;
pub use postgrest::PostgrestCatalog;
pub use store::{CatalogError, CatalogResult, CatalogStore, Product};
