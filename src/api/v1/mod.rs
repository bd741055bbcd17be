/*
 * Responsibility
 * - the JSON API mounted under /api/v1 (health + credential flows)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
