/*
 * Responsibility
 * - module layout of the crate
 * - expose app::router() so both the binary and tests/ can build the service
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod services;
pub mod state;
