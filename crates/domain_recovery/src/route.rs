//! Sales territories
//!
//! A route is a named sales territory; an outlet is a point of sale on
//! exactly one route. Outlet names are unique within their route (the
//! storage layer enforces the pair constraint).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{OutletId, RouteId};

/// A named sales territory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Route {
    /// Creates a new route
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RouteId::new_v7(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A point of sale on a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlet {
    pub id: OutletId,
    pub route_id: RouteId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Outlet {
    /// Creates a new outlet on the given route
    pub fn new(route_id: RouteId, name: impl Into<String>) -> Self {
        Self {
            id: OutletId::new_v7(),
            route_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
