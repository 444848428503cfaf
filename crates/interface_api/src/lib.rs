//! HTTP API Layer
//!
//! This crate provides the REST API for the debt recovery system using
//! Axum. It is thin glue: handlers resolve the caller's identity, load
//! records through the repositories, and invoke the reconciliation engine
//! through them; no balance logic lives here.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for bills, payments, and routes
//! - **Middleware**: Authentication, request audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{Clock, SystemClock};

use crate::config::ApiConfig;
use crate::handlers::{bills, health, payments, routes};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
}

impl AppState {
    /// Resolves the current instant and the local calendar "today"
    ///
    /// Every reconciliation call receives time explicitly from here; the
    /// engine itself never reads the clock.
    pub fn today_and_now(&self) -> (NaiveDate, DateTime<Utc>) {
        let clock = SystemClock;
        let now = clock.now();
        let today = self.config.reporting_timezone().local_date(now);
        (today, now)
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState { pool, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Bill routes
    let bill_routes = Router::new()
        .route("/", post(bills::create_bill))
        .route("/", get(bills::list_bills))
        .route("/assign", post(bills::assign_bills))
        .route("/import", post(bills::import_bills))
        .route("/refresh-overdue", post(bills::refresh_overdue))
        .route("/my-assignments", get(bills::my_assignments))
        .route("/:id", get(bills::get_bill))
        .route("/:id/payments", get(payments::list_bill_payments))
        .route("/:id/payments", post(payments::record_payment));

    // Payment routes
    let payment_routes = Router::new()
        .route("/", get(payments::list_payments))
        .route("/import", post(payments::import_payments))
        .route("/instruments", get(payments::instrument_history))
        .route("/totals/today", get(payments::today_totals))
        .route("/:id", get(payments::get_payment))
        .route("/:id", axum::routing::delete(payments::delete_payment))
        .route("/:id/clearance", put(payments::update_clearance));

    // Route/outlet routes
    let route_routes = Router::new()
        .route("/", get(routes::list_routes))
        .route("/:id", get(routes::get_route))
        .route("/:id/outlets", get(routes::route_outlets));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/bills", bill_routes)
        .nest("/payments", payment_routes)
        .nest("/routes", route_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
