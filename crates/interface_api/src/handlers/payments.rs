//! Payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Money;
use domain_recovery::{PaymentMethod, PaymentRequest};
use infra_db::{AgentRepository, BillRepository, PaymentFilter, PaymentRepository};

use crate::auth::Claims;
use crate::dto::bills::{ImportRowError, ImportSummary};
use crate::dto::payments::*;
use crate::error::ApiError;
use crate::handlers::{authenticated, require_admin, require_dra};
use crate::AppState;

/// Records a payment collected against a bill
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let agent_id = require_dra(&claims)?;
    request.validate()?;

    // the payment follows the bill's currency
    let bill = BillRepository::new(state.pool.clone())
        .find_by_id(bill_id.into())
        .await?;
    let amount = Money::new(request.amount, bill.actual_amount.currency());

    let mut payment_request = PaymentRequest::new(agent_id, request.method, amount);
    payment_request.cheque_number = request.cheque_number;
    payment_request.cheque_kind = request.cheque_kind;
    payment_request.cheque_date = request.cheque_date;
    payment_request.transaction_number = request.transaction_number;

    let (today, now) = state.today_and_now();
    let (payment, _event) = PaymentRepository::new(state.pool.clone())
        .record_payment(bill.id, payment_request, today, now)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(&payment))))
}

/// Lists payments for a bill
///
/// An agent sees only their own collections; admins see all.
pub async fn list_bill_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let (agent_id, role) = authenticated(&claims)?;
    let scope = if role.is_admin() { None } else { Some(agent_id) };

    let payments = PaymentRepository::new(state.pool.clone())
        .list_for_bill(bill_id.into(), scope)
        .await?;

    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

/// Lists settled payments across all bills
///
/// Pending and bounced instruments are excluded.
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    require_admin(&claims)?;

    let tz = state.config.reporting_timezone();
    let filter = PaymentFilter {
        invoice_number: query.invoice_number,
        username: query.username,
        from: query.start_date.and_then(|d| tz.start_of_day(d)),
        to: query.end_date.and_then(|d| tz.start_of_next_day(d)),
    };

    let payments = PaymentRepository::new(state.pool.clone())
        .list_settled(&filter)
        .await?;

    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

/// Lists cheque and electronic payments
///
/// `?expired=true` narrows to instruments still pending past their
/// instrument date. Admins see every instrument, agents their own.
pub async fn instrument_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<InstrumentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let (agent_id, role) = authenticated(&claims)?;
    let scope = if role.is_admin() { None } else { Some(agent_id) };

    let (today, _) = state.today_and_now();
    let payments = PaymentRepository::new(state.pool.clone())
        .instrument_history(scope, query.invoice_number.as_deref(), query.expired, today)
        .await?;

    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

/// Gets a payment by ID
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let (agent_id, role) = authenticated(&claims)?;

    let payment = PaymentRepository::new(state.pool.clone())
        .find_by_id(id.into())
        .await?;

    if !role.is_admin() && payment.agent_id != agent_id {
        return Err(ApiError::Forbidden(
            "payment belongs to another agent".to_string(),
        ));
    }

    Ok(Json(PaymentResponse::from(&payment)))
}

/// Updates the clearance sub-state of a cheque or electronic payment
///
/// The engine enforces the admin capability and the transition table;
/// the recomputed bill commits atomically with the payment update.
pub async fn update_clearance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClearanceUpdateRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let (_, role) = authenticated(&claims)?;

    let (today, now) = state.today_and_now();
    let (payment, _event) = PaymentRepository::new(state.pool.clone())
        .update_clearance(role, id.into(), request.status, today, now)
        .await?;

    Ok(Json(PaymentResponse::from(&payment)))
}

/// Hard-deletes a payment, recomputing the bill's balance
pub async fn delete_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (_, role) = authenticated(&claims)?;

    let (today, now) = state.today_and_now();
    PaymentRepository::new(state.pool.clone())
        .delete_payment(role, id.into(), today, now)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns today's collection totals by method
pub async fn today_totals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DailyTotalsResponse>, ApiError> {
    require_admin(&claims)?;

    let tz = state.config.reporting_timezone();
    let (today, _) = state.today_and_now();
    let totals = PaymentRepository::new(state.pool.clone())
        .daily_totals(today, &tz)
        .await?;

    Ok(Json(DailyTotalsResponse::from(&totals)))
}

/// Imports already-parsed payment rows, one result per row
///
/// Bills are looked up by invoice number and agents by username or
/// email; each row runs through the same reconciliation as a live
/// payment, stamped with the sheet's payment date.
pub async fn import_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ImportPaymentsRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    require_admin(&claims)?;

    let bills = BillRepository::new(state.pool.clone());
    let agents = AgentRepository::new(state.pool.clone());
    let payments = PaymentRepository::new(state.pool.clone());
    let tz = state.config.reporting_timezone();

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

        let result = import_payment_row(&bills, &agents, &payments, &tz, row).await;
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

async fn import_payment_row(
    bills: &BillRepository,
    agents: &AgentRepository,
    payments: &PaymentRepository,
    tz: &core_kernel::Timezone,
    row: &PaymentImportRow,
) -> Result<(), ApiError> {
    let bill = bills.find_by_invoice_number(&row.invoice_number).await?;
    let agent = agents.find_by_identifier(&row.username).await?;

    let amount = Money::new(row.amount, bill.actual_amount.currency());
    let method = row.method.unwrap_or(PaymentMethod::Cash);

    let mut payment_request = PaymentRequest::new(agent.id, method, amount);
    payment_request.cheque_number = row.cheque_number.clone();
    payment_request.cheque_kind = row.cheque_kind.clone();
    payment_request.cheque_date = row.cheque_date;

    // stamp the payment with the sheet's payment date, not the import time
    let recorded_at = tz.start_of_day(row.payment_date).ok_or_else(|| {
        ApiError::Validation(format!("unresolvable payment date {}", row.payment_date))
    })?;

    payments
        .record_payment(bill.id, payment_request, row.payment_date, recorded_at)
        .await?;

    Ok(())
}
