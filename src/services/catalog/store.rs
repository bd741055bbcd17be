//! Catalog store interface (read-only from this service's point of view).
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    NotFound(i64),
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),
    #[error("catalog response could not be decoded: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    /// All products, ordered by id ascending.
    async fn list_products(&self) -> CatalogResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> CatalogResult<Product>;
}
