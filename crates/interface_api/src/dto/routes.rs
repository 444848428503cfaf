//! Route and outlet DTOs

use serde::Serialize;
use uuid::Uuid;

use domain_recovery::{Outlet, Route};

/// Route representation
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<&Route> for RouteResponse {
    fn from(route: &Route) -> Self {
        Self {
            id: *route.id.as_uuid(),
            name: route.name.clone(),
        }
    }
}

/// Outlet representation
#[derive(Debug, Serialize)]
pub struct OutletResponse {
    pub id: Uuid,
    pub route_id: Uuid,
    pub name: String,
}

impl From<&Outlet> for OutletResponse {
    fn from(outlet: &Outlet) -> Self {
        Self {
            id: *outlet.id.as_uuid(),
            route_id: *outlet.route_id.as_uuid(),
            name: outlet.name.clone(),
        }
    }
}
