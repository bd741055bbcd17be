/*
 * Responsibility
 * - /products/{id}: parse the path segment into a catalog id
 * - a malformed id is indistinguishable from an unknown one (404)
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub i64);

fn parse(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found("product"))?;

        parse(&raw)
            .map(ProductId)
            .ok_or_else(|| AppError::not_found("product"))
    }
}
