//! # PDV API
//!
//! REST server for the product catalog and the sales ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  Browser ───► HTTP (3001) ───► CORS / Trace ───► routes ───► pdv-db     │
//! │                                                         (SQLite, WAL)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` only wires configuration, logging and shutdown
//! around [`create_router`]; the integration tests serve the same router.

pub mod config;
pub mod error;
pub mod routes;

use std::any::Any;

use axum::response::{IntoResponse, Response};
use axum::Router;
use pdv_db::Database;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ErrorCode};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full router with its middleware stack.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::products::router())
        .merge(routes::sales::router())
        .merge(routes::health::router())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "Handler panicked");

    ApiError::new(ErrorCode::Internal, "Internal server error").into_response()
}
