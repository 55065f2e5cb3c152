//! HTTP surface: axum router and handlers.

pub mod handlers;
pub mod routes;

pub use routes::{create_router, AppState};
