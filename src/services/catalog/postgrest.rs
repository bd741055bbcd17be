use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde_json::Value;
use url::Url;

use super::store::{CatalogError, CatalogResult, CatalogStore, Product};
use crate::services::backend::{self, BackendEndpoint};

const PRODUCTS_PATH: &str = "rest/v1/products";

/// Catalog backed by the hosted data API (PostgREST, `products` table).
#[derive(Clone)]
pub struct PostgrestCatalog {
    endpoint: BackendEndpoint,
}

impl PostgrestCatalog {
    pub fn new(base_url: &Url, anon_key: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let endpoint = BackendEndpoint::new(base_url, anon_key, timeout)?;
        Ok(Self { endpoint })
    }

    fn products_url(&self, filters: &[(&str, &str)]) -> CatalogResult<Url> {
        let mut url = self
            .endpoint
            .url(PRODUCTS_PATH)
            .map_err(|e| CatalogError::Unavailable(format!("invalid catalog url: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> CatalogResult<Vec<Product>> {
        // Anonymous reads: the anon key doubles as the bearer token (row level security applies).
        let response = self
            .endpoint
            .get(url)
            .bearer_auth(self.endpoint.anon_key())
            .send()
            .await?;

        read_products(response).await
    }
}

async fn read_products(response: Response) -> CatalogResult<Vec<Product>> {
    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        return Err(CatalogError::Unavailable(format!(
            "{status}: {}",
            backend::error_message(&body)
        )));
    }

    response
        .json::<Vec<Product>>()
        .await
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl CatalogStore for PostgrestCatalog {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        let url = self.products_url(&[("order", "id.asc")])?;
        self.fetch(url).await
    }

    async fn get_product(&self, id: i64) -> CatalogResult<Product> {
        let filter = format!("eq.{id}");
        let url = self.products_url(&[("id", filter.as_str()), ("limit", "1")])?;
        self.fetch(url)
            .await?
            .into_iter()
            .next()
            .ok_or(CatalogError::NotFound(id))
    }
}
