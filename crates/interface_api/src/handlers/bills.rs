//! Bill handlers

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money};
use domain_recovery::{overdue_days, Bill};
use infra_db::{BillRepository, RouteRepository};

use crate::auth::Claims;
use crate::dto::bills::*;
use crate::dto::routes::{OutletResponse, RouteResponse};
use crate::error::ApiError;
use crate::handlers::{authenticated, require_admin, require_dra};
use crate::AppState;

/// Creates a new bill
pub async fn create_bill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<BillResponse>), ApiError> {
    require_admin(&claims)?;
    request.validate()?;

    let currency = match request.currency.as_deref() {
        Some(code) => Currency::from_code(code)
            .ok_or_else(|| ApiError::Validation(format!("unknown currency '{}'", code)))?,
        None => Currency::default(),
    };

    let outlet = RouteRepository::new(state.pool.clone())
        .find_outlet(request.outlet_id.into())
        .await?;

    let (today, now) = state.today_and_now();
    let bill = Bill::new(
        outlet.id,
        request.invoice_number,
        request.invoice_date,
        Money::new(request.amount, currency),
        request.brand,
        today,
        now,
    )?;

    BillRepository::new(state.pool.clone()).create(&bill).await?;

    Ok((StatusCode::CREATED, Json(BillResponse::from(&bill))))
}

/// Lists bills, optionally filtered by invoice-number fragment
pub async fn list_bills(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListBillsQuery>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    require_admin(&claims)?;

    let bills = BillRepository::new(state.pool.clone())
        .list(query.invoice_number.as_deref())
        .await?;

    Ok(Json(bills.iter().map(BillResponse::from).collect()))
}

/// Gets a bill by ID
pub async fn get_bill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, ApiError> {
    authenticated(&claims)?;

    let bill = BillRepository::new(state.pool.clone())
        .find_by_id(id.into())
        .await?;

    Ok(Json(BillResponse::from(&bill)))
}

/// Bulk-assigns bills to a collection agent
pub async fn assign_bills(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<AssignBillsRequest>,
) -> Result<Json<AssignSummary>, ApiError> {
    authenticated(&claims)?;

    let repo = BillRepository::new(state.pool.clone());
    let bill_ids: Vec<core_kernel::BillId> = request.bill_ids.iter().map(|id| (*id).into()).collect();
    let (_, now) = state.today_and_now();

    let assigned = repo
        .assign_bills(&bill_ids, request.agent_id.into(), now)
        .await?;

    let mut bills = Vec::with_capacity(bill_ids.len());
    for id in &bill_ids {
        bills.push(repo.find_by_id(*id).await?);
    }

    Ok(Json(AssignSummary {
        assigned,
        bills: bills.iter().map(BillResponse::from).collect(),
    }))
}

/// Imports already-parsed bill rows, one result per row
///
/// Rows are processed independently: failures land in `errors` with their
/// 1-based row number while the rest import. Routes and outlets are
/// created on first sight by name.
pub async fn import_bills(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ImportBillsRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    require_admin(&claims)?;

    let routes = RouteRepository::new(state.pool.clone());
    let bills = BillRepository::new(state.pool.clone());
    let (today, now) = state.today_and_now();

    let mut summary = ImportSummary {
        imported: 0,
        errors: Vec::new(),
    };

    for (index, row) in request.rows.iter().enumerate() {
        let row_number = index + 1;

        if let Err(e) = row.validate() {
            summary.errors.push(ImportRowError {
                row: row_number,
                error: e.to_string(),
            });
            continue;
        }

        let result = import_bill_row(&routes, &bills, row, today, now).await;
        match result {
            Ok(()) => summary.imported += 1,
            Err(e) => summary.errors.push(ImportRowError {
                row: row_number,
                error: e.to_string(),
            }),
        }
    }

    Ok(Json(summary))
}

async fn import_bill_row(
    routes: &RouteRepository,
    bills: &BillRepository,
    row: &BillImportRow,
    today: chrono::NaiveDate,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), ApiError> {
    let route = routes.get_or_create_route(&row.route_name).await?;
    let outlet = routes.get_or_create_outlet(route.id, &row.outlet_name).await?;

    let currency = Currency::default();
    let actual = Money::new(row.actual_amount, currency);
    // the sheet's derived values are taken as supplied; absent columns
    // fall back to a fresh derivation
    let remaining = row
        .remaining_amount
        .map(|amount| Money::new(amount, currency))
        .unwrap_or(actual);
    let overdue = row
        .overdue_days
        .unwrap_or_else(|| overdue_days(row.invoice_date, today));

    let bill = Bill::from_import(
        outlet.id,
        row.invoice_number.clone(),
        row.invoice_date,
        actual,
        remaining,
        overdue,
        row.brand.clone().unwrap_or_default(),
        now,
    );

    bills.create(&bill).await?;
    Ok(())
}

/// Returns the calling agent's working set: open bills with their
/// outlets and routes
pub async fn my_assignments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    let agent_id = require_dra(&claims)?;

    let bills = BillRepository::new(state.pool.clone())
        .open_bills_for_agent(agent_id)
        .await?;

    let routes_repo = RouteRepository::new(state.pool.clone());

    let outlet_ids: HashSet<_> = bills.iter().map(|b| b.outlet_id).collect();
    let mut outlets = Vec::with_capacity(outlet_ids.len());
    for outlet_id in outlet_ids {
        outlets.push(routes_repo.find_outlet(outlet_id).await?);
    }

    let route_ids: HashSet<_> = outlets.iter().map(|o| o.route_id).collect();
    let mut routes = Vec::with_capacity(route_ids.len());
    for route_id in route_ids {
        routes.push(routes_repo.find_route(route_id).await?);
    }

    Ok(Json(AssignmentsResponse {
        routes: routes.iter().map(RouteResponse::from).collect(),
        outlets: outlets.iter().map(OutletResponse::from).collect(),
        bills: bills.iter().map(BillResponse::from).collect(),
    }))
}

/// Re-derives overdue_days for all open bills
///
/// The scheduled-sweep entry point; cleared bills keep their frozen
/// counts.
pub async fn refresh_overdue(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SweepResponse>, ApiError> {
    require_admin(&claims)?;

    let (today, now) = state.today_and_now();
    let updated = BillRepository::new(state.pool.clone())
        .refresh_overdue_days(today, now)
        .await?;

    Ok(Json(SweepResponse { updated }))
}
