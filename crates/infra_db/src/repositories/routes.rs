//! Route and outlet repository implementation
//!
//! Routes and outlets are get-or-create by name: bulk import references
//! territories by name and creates them on first sight.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{OutletId, RouteId};
use domain_recovery::{Outlet, Route};

use crate::error::DatabaseError;

/// Database row for a route
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RouteRow {
    pub route_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl RouteRow {
    fn into_domain(self) -> Route {
        Route {
            id: self.route_id.into(),
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// Database row for an outlet
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutletRow {
    pub outlet_id: Uuid,
    pub route_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl OutletRow {
    fn into_domain(self) -> Outlet {
        Outlet {
            id: self.outlet_id.into(),
            route_id: self.route_id.into(),
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// Repository for routes and their outlets
#[derive(Debug, Clone)]
pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    /// Creates a new RouteRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a route by name, creating it if absent
    pub async fn get_or_create_route(&self, name: &str) -> Result<Route, DatabaseError> {
        let candidate = Route::new(name);

        let row = sqlx::query_as::<_, RouteRow>(
            r#"
            INSERT INTO routes (route_id, name, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING route_id, name, created_at
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(&candidate.name)
        .bind(candidate.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }

    /// Finds an outlet by name within a route, creating it if absent
    pub async fn get_or_create_outlet(
        &self,
        route_id: RouteId,
        name: &str,
    ) -> Result<Outlet, DatabaseError> {
        let candidate = Outlet::new(route_id, name);

        let row = sqlx::query_as::<_, OutletRow>(
            r#"
            INSERT INTO outlets (outlet_id, route_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (route_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING outlet_id, route_id, name, created_at
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(candidate.route_id.as_uuid())
        .bind(&candidate.name)
        .bind(candidate.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }

    /// Lists all routes, ordered by name
    pub async fn list_routes(&self) -> Result<Vec<Route>, DatabaseError> {
        let rows = sqlx::query_as::<_, RouteRow>(
            "SELECT route_id, name, created_at FROM routes ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RouteRow::into_domain).collect())
    }

    /// Retrieves a route by id
    pub async fn find_route(&self, id: RouteId) -> Result<Route, DatabaseError> {
        let row = sqlx::query_as::<_, RouteRow>(
            "SELECT route_id, name, created_at FROM routes WHERE route_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Route", id))?;

        Ok(row.into_domain())
    }

    /// Retrieves an outlet by id
    pub async fn find_outlet(&self, id: OutletId) -> Result<Outlet, DatabaseError> {
        let row = sqlx::query_as::<_, OutletRow>(
            "SELECT outlet_id, route_id, name, created_at FROM outlets WHERE outlet_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Outlet", id))?;

        Ok(row.into_domain())
    }

    /// Lists the outlets on a route, ordered by name
    pub async fn outlets_for_route(&self, route_id: RouteId) -> Result<Vec<Outlet>, DatabaseError> {
        let rows = sqlx::query_as::<_, OutletRow>(
            r#"
            SELECT outlet_id, route_id, name, created_at
            FROM outlets
            WHERE route_id = $1
            ORDER BY name
            "#,
        )
        .bind(route_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OutletRow::into_domain).collect())
    }
}
