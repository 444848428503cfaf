//! Payment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_recovery::{ClearanceStatus, Payment, PaymentMethod};
use infra_db::DailyTotals;

/// Request to record a payment against a bill
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub method: PaymentMethod,
    pub amount: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub cheque_number: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub cheque_kind: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub transaction_number: Option<i64>,
}

/// Payment representation
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub agent_id: Uuid,
    pub method: PaymentMethod,
    pub currency: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearance: Option<ClearanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_number: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            bill_id: *payment.bill_id.as_uuid(),
            agent_id: *payment.agent_id.as_uuid(),
            method: payment.method,
            currency: payment.amount.currency().code().to_string(),
            amount: payment.amount.amount(),
            clearance: payment.clearance,
            cheque_number: payment.cheque_number.clone(),
            cheque_kind: payment.cheque_kind.clone(),
            cheque_date: payment.cheque_date,
            transaction_number: payment.transaction_number,
            created_at: payment.created_at,
        }
    }
}

/// Request to update an instrument's clearance sub-state
#[derive(Debug, Deserialize)]
pub struct ClearanceUpdateRequest {
    pub status: ClearanceStatus,
}

/// Query parameters for settled-payment listings
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub invoice_number: Option<String>,
    pub username: Option<String>,
    /// Inclusive start of the payment-date window (local calendar date)
    pub start_date: Option<NaiveDate>,
    /// Inclusive end of the payment-date window (local calendar date)
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for instrument history
#[derive(Debug, Deserialize)]
pub struct InstrumentsQuery {
    pub invoice_number: Option<String>,
    /// Narrow to instruments still pending past their instrument date
    #[serde(default)]
    pub expired: bool,
}

/// The day's collection totals
#[derive(Debug, Serialize)]
pub struct DailyTotalsResponse {
    pub date: NaiveDate,
    pub currency: String,
    pub cash_total: Decimal,
    pub upi_total: Decimal,
    pub instrument_total: Decimal,
}

impl From<&DailyTotals> for DailyTotalsResponse {
    fn from(totals: &DailyTotals) -> Self {
        Self {
            date: totals.date,
            currency: totals.cash_total.currency().code().to_string(),
            cash_total: totals.cash_total.amount(),
            upi_total: totals.upi_total.amount(),
            instrument_total: totals.instrument_total.amount(),
        }
    }
}

/// One already-parsed import row for a payment
///
/// The collecting agent is identified by username or email; the bill by
/// its invoice number.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentImportRow {
    #[validate(length(min = 1, max = 255))]
    pub invoice_number: String,
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    pub amount: Decimal,
    /// Defaults to cash when the sheet carries no method column
    pub method: Option<PaymentMethod>,
    pub payment_date: NaiveDate,
    pub cheque_number: Option<String>,
    pub cheque_kind: Option<String>,
    pub cheque_date: Option<NaiveDate>,
}

/// Request body for bulk payment import
#[derive(Debug, Deserialize)]
pub struct ImportPaymentsRequest {
    pub rows: Vec<PaymentImportRow>,
}
