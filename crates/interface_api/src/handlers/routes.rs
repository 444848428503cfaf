//! Route and outlet handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use infra_db::RouteRepository;

use crate::auth::Claims;
use crate::dto::routes::{OutletResponse, RouteResponse};
use crate::error::ApiError;
use crate::handlers::authenticated;
use crate::AppState;

/// Lists all routes
pub async fn list_routes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RouteResponse>>, ApiError> {
    authenticated(&claims)?;

    let routes = RouteRepository::new(state.pool.clone()).list_routes().await?;
    Ok(Json(routes.iter().map(RouteResponse::from).collect()))
}

/// Gets a route by ID
pub async fn get_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteResponse>, ApiError> {
    authenticated(&claims)?;

    let route = RouteRepository::new(state.pool.clone())
        .find_route(id.into())
        .await?;
    Ok(Json(RouteResponse::from(&route)))
}

/// Lists the outlets on a route
pub async fn route_outlets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OutletResponse>>, ApiError> {
    authenticated(&claims)?;

    let outlets = RouteRepository::new(state.pool.clone())
        .outlets_for_route(id.into())
        .await?;
    Ok(Json(outlets.iter().map(OutletResponse::from).collect()))
}
