/*
 * Responsibility
 * - GET handlers for the site's pages (JSON view models)
 * - catalog reads go through state.catalog; identity comes from the guard
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::extractors::{CurrentUser, MaybeUser, ProductId},
    error::AppError,
    pages::views::{AuthFormView, DashboardView, HomeView, ProductDetailView, ProductListView},
    state::AppState,
};

/// The landing page still renders when the catalog is down.
pub async fn home(State(state): State<AppState>, MaybeUser(session): MaybeUser) -> Json<HomeView> {
    let catalog = match state.catalog.list_products().await {
        Ok(products) => ProductListView::new(products),
        Err(e) => {
            tracing::warn!(
                error = %e,
                backend = state.catalog.backend_name(),
                "catalog unavailable; rendering home without products"
            );
            ProductListView::unavailable()
        }
    };

    Json(HomeView::new(session.as_ref(), catalog))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListView>, AppError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(ProductListView::new(products)))
}

pub async fn product_detail(
    State(state): State<AppState>,
    ProductId(id): ProductId,
) -> Result<Json<ProductDetailView>, AppError> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(ProductDetailView::new(product)))
}

pub async fn dashboard(CurrentUser(session): CurrentUser) -> Json<DashboardView> {
    Json(DashboardView::new(&session))
}

pub async fn login_form() -> Json<AuthFormView> {
    Json(AuthFormView::login())
}

pub async fn signup_form() -> Json<AuthFormView> {
    Json(AuthFormView::signup())
}

pub async fn forgot_password_form() -> Json<AuthFormView> {
    Json(AuthFormView::forgot_password())
}

pub async fn not_found() -> AppError {
    AppError::not_found("page")
}
