use std::sync::Arc;

use async_trait::async_trait;

use super::store::{CatalogError, CatalogResult, CatalogStore, Product};

/// Fixed in-process catalog.
///
/// Serves the (empty) catalog in skip-auth mode, when no backend is provisioned,
/// and doubles as a test fixture.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    products: Arc<Vec<Product>>,
}

impl InMemoryCatalog {
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by_key(|p| p.id);
        Self {
            products: Arc::new(products),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.products.as_ref().clone())
    }

    async fn get_product(&self, id: i64) -> CatalogResult<Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}
