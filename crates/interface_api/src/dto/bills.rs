//! Bill DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_recovery::Bill;

use crate::dto::routes::{OutletResponse, RouteResponse};

/// Request to create a bill
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    pub outlet_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub amount: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub brand: String,
    /// ISO 4217 code; defaults to the system currency
    pub currency: Option<String>,
}

/// Bill representation
#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: Uuid,
    pub outlet_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub brand: String,
    pub currency: String,
    pub actual_amount: Decimal,
    pub remaining_amount: Decimal,
    pub overdue_days: u32,
    pub status: String,
    pub cleared_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Bill> for BillResponse {
    fn from(bill: &Bill) -> Self {
        Self {
            id: *bill.id.as_uuid(),
            outlet_id: *bill.outlet_id.as_uuid(),
            invoice_number: bill.invoice_number.clone(),
            invoice_date: bill.invoice_date,
            brand: bill.brand.clone(),
            currency: bill.actual_amount.currency().code().to_string(),
            actual_amount: bill.actual_amount.amount(),
            remaining_amount: bill.remaining_amount.amount(),
            overdue_days: bill.overdue_days,
            status: bill.status.code().to_string(),
            cleared_at: bill.cleared_at,
            assigned_to: bill.assigned_to.map(|id| *id.as_uuid()),
            created_at: bill.created_at,
        }
    }
}

/// Query parameters for bill listings
#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    /// Invoice-number fragment to filter by
    pub invoice_number: Option<String>,
}

/// Request to bulk-assign bills to an agent
#[derive(Debug, Deserialize)]
pub struct AssignBillsRequest {
    pub bill_ids: Vec<Uuid>,
    pub agent_id: Uuid,
}

/// One already-parsed import row for a bill
///
/// Rows may seed the derived balance and overdue count; absent values
/// fall back to a fresh computation.
#[derive(Debug, Deserialize, Validate)]
pub struct BillImportRow {
    #[validate(length(min = 1, max = 255))]
    pub route_name: String,
    #[validate(length(min = 1, max = 255))]
    pub outlet_name: String,
    #[validate(length(min = 1, max = 255))]
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub actual_amount: Decimal,
    pub remaining_amount: Option<Decimal>,
    pub overdue_days: Option<u32>,
    pub brand: Option<String>,
}

/// Request body for bulk bill import
#[derive(Debug, Deserialize)]
pub struct ImportBillsRequest {
    pub rows: Vec<BillImportRow>,
}

/// A failed import row
#[derive(Debug, Serialize)]
pub struct ImportRowError {
    /// 1-based row number in the submitted batch
    pub row: usize,
    pub error: String,
}

/// Outcome of a bulk import; rows are processed independently
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<ImportRowError>,
}

/// An agent's working set: open bills plus their outlets and routes
#[derive(Debug, Serialize)]
pub struct AssignmentsResponse {
    pub routes: Vec<RouteResponse>,
    pub outlets: Vec<OutletResponse>,
    pub bills: Vec<BillResponse>,
}

/// Outcome of the bulk overdue sweep
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub updated: u64,
}

/// Outcome of a bulk assignment
#[derive(Debug, Serialize)]
pub struct AssignSummary {
    pub assigned: u64,
    pub bills: Vec<BillResponse>,
}
