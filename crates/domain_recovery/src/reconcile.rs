//! Balance reconciliation engine
//!
//! The single source of truth for a bill's remaining balance and
//! lifecycle status. Every operation here is explicit and synchronous:
//! nothing recomputes as a side effect of merely constructing or mutating
//! a record. Callers load a bill together with its payments, invoke one
//! operation, and persist the result atomically.
//!
//! Recomputation is always a full aggregation of the currently-settled
//! payment set, never incremental arithmetic, so a missed intermediate
//! update cannot leave drift behind.

use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{AgentId, Money, PaymentId};
use domain_agents::AgentRole;

use crate::bill::{Bill, BillStatus};
use crate::error::RecoveryError;
use crate::events::BillEvent;
use crate::payment::{ClearanceStatus, Payment, PaymentMethod};

/// Input for recording a payment against a bill
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Agent recording the collection
    pub agent_id: AgentId,
    /// Payment method
    pub method: PaymentMethod,
    /// Amount collected
    pub amount: Money,
    /// Cheque number, for cheque payments
    pub cheque_number: Option<String>,
    /// Cheque kind (bearer, crossed, ...)
    pub cheque_kind: Option<String>,
    /// Instrument date
    pub cheque_date: Option<NaiveDate>,
    /// Bank transaction reference, for electronic payments
    pub transaction_number: Option<i64>,
}

impl PaymentRequest {
    /// Creates a request with no instrument metadata
    pub fn new(agent_id: AgentId, method: PaymentMethod, amount: Money) -> Self {
        Self {
            agent_id,
            method,
            amount,
            cheque_number: None,
            cheque_kind: None,
            cheque_date: None,
            transaction_number: None,
        }
    }

    /// Attaches cheque details
    pub fn with_cheque(
        mut self,
        number: impl Into<String>,
        kind: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        self.cheque_number = Some(number.into());
        self.cheque_kind = Some(kind.into());
        self.cheque_date = Some(date);
        self
    }

    /// Attaches an electronic transaction reference
    pub fn with_transaction_number(mut self, number: i64) -> Self {
        self.transaction_number = Some(number);
        self
    }
}

/// The balance reconciliation engine
///
/// Stateless; operations act on a bill and its payment set supplied by
/// the caller. The storage layer wraps each call in a transaction that
/// re-reads the payment set under a row lock, so two settlements against
/// the same bill can never both compute from a stale read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Records a payment against a bill
    ///
    /// Cash and UPI settle immediately and reduce the balance in the same
    /// call. Cheque and electronic payments are recorded Pending and do
    /// not touch the balance until cleared.
    ///
    /// `payments` is the bill's existing payment set; the returned
    /// `Payment` is the new record to persist alongside the updated bill.
    ///
    /// # Errors
    ///
    /// Rejects payments against a fully-settled bill, non-positive
    /// amounts, and amounts exceeding the remaining balance. A rejected
    /// request changes nothing.
    pub fn record_payment(
        &self,
        bill: &mut Bill,
        payments: &[Payment],
        request: PaymentRequest,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(Payment, Option<BillEvent>), RecoveryError> {
        if !bill.remaining_amount.is_positive() {
            return Err(RecoveryError::validation("bill already fully paid"));
        }
        if !request.amount.is_positive() {
            return Err(RecoveryError::validation(format!(
                "payment amount must be positive, got {}",
                request.amount.amount()
            )));
        }
        let headroom = bill.remaining_amount.checked_sub(&request.amount)?;
        if headroom.is_negative() {
            return Err(RecoveryError::validation(format!(
                "overpayment: {} exceeds remaining balance {}",
                request.amount.amount(),
                bill.remaining_amount.amount()
            )));
        }

        let mut payment = Payment::new(bill.id, request.agent_id, request.method, request.amount, now);
        payment.cheque_number = request.cheque_number;
        payment.cheque_kind = request.cheque_kind;
        payment.cheque_date = request.cheque_date;
        payment.transaction_number = request.transaction_number;

        if !payment.is_settled() {
            // Pending instrument: recorded, but the balance is untouched
            // until clearance.
            tracing::debug!(
                bill_id = %bill.id,
                payment_id = %payment.id,
                method = payment.method.code(),
                "instrument recorded pending clearance"
            );
            return Ok((payment, None));
        }

        let mut all = payments.to_vec();
        all.push(payment.clone());
        let event = self.reconcile(bill, &all, today, now)?;

        // The precondition bounded the amount by the remaining balance, so
        // a negative result here means a recomputation was missed elsewhere.
        if bill.remaining_amount.is_negative() {
            tracing::error!(
                bill_id = %bill.id,
                remaining = %bill.remaining_amount,
                "remaining balance went negative after a bounded payment"
            );
            return Err(RecoveryError::consistency(format!(
                "remaining balance {} is negative after payment of {}",
                bill.remaining_amount.amount(),
                payment.amount.amount()
            )));
        }

        Ok((payment, event))
    }

    /// Updates the clearance sub-state of a cheque or electronic payment
    ///
    /// Restricted to administrators. Allowed transitions are
    /// Pending -> Cleared, Pending -> Bounced, and Cleared -> Bounced (the
    /// correction path); anything else is rejected without touching state.
    /// Clearing stamps the instrument date to `today` and reruns the full
    /// recomputation, which may clear the bill; bouncing a
    /// previously-cleared instrument restores its amount and reopens a
    /// cleared bill.
    pub fn update_clearance(
        &self,
        role: AgentRole,
        bill: &mut Bill,
        payments: &mut [Payment],
        payment_id: PaymentId,
        target: ClearanceStatus,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<BillEvent>, RecoveryError> {
        if !role.is_admin() {
            return Err(RecoveryError::forbidden(
                "only administrators may update clearance status",
            ));
        }

        let index = payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| RecoveryError::not_found(format!("Payment {}", payment_id)))?;

        let current = match payments[index].clearance {
            Some(current) => current,
            None => {
                return Err(RecoveryError::validation(format!(
                    "{} payments do not carry a clearance status",
                    payments[index].method.code()
                )))
            }
        };

        if !current.can_transition_to(target) {
            return Err(RecoveryError::InvalidClearanceTransition {
                from: current.code().to_string(),
                to: target.code().to_string(),
            });
        }

        payments[index].clearance = Some(target);
        if target == ClearanceStatus::Cleared {
            payments[index].cheque_date = Some(today);
        }

        tracing::info!(
            bill_id = %bill.id,
            payment_id = %payment_id,
            from = current.code(),
            to = target.code(),
            "clearance status updated"
        );

        self.reconcile(bill, payments, today, now)
    }

    /// Hard-deletes a payment and reruns recomputation
    ///
    /// Restricted to administrators. A deleted settled payment must stop
    /// counting toward the balance immediately, so deletion runs the same
    /// full recomputation as a clearance change and may reopen the bill.
    pub fn delete_payment(
        &self,
        role: AgentRole,
        bill: &mut Bill,
        payments: &mut Vec<Payment>,
        payment_id: PaymentId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<BillEvent>, RecoveryError> {
        if !role.is_admin() {
            return Err(RecoveryError::forbidden(
                "only administrators may delete payments",
            ));
        }

        let index = payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| RecoveryError::not_found(format!("Payment {}", payment_id)))?;

        let removed = payments.remove(index);
        tracing::info!(
            bill_id = %bill.id,
            payment_id = %removed.id,
            amount = %removed.amount,
            "payment deleted"
        );

        self.reconcile(bill, payments, today, now)
    }

    /// Bulk-assigns bills to a collection agent
    ///
    /// Unconditional and independent of payment state; reassigning to the
    /// same agent is a no-op in effect.
    pub fn assign_bills(&self, bills: &mut [Bill], agent_id: AgentId, now: DateTime<Utc>) {
        for bill in bills.iter_mut() {
            bill.assign_to(agent_id, now);
        }
    }

    /// Recomputes a bill's balance and status from its payment set
    ///
    /// `remaining_amount` becomes the invoice amount minus the sum of all
    /// currently-settled payments. The post-effect check then runs: a
    /// non-positive balance clears an open bill (freezing its aging); a
    /// positive balance reopens a cleared one. The status transition, if
    /// any, is returned for the caller to react to.
    pub fn reconcile(
        &self,
        bill: &mut Bill,
        payments: &[Payment],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<BillEvent>, RecoveryError> {
        let settled = self.settled_total(bill, payments)?;
        let remaining = bill.actual_amount.checked_sub(&settled)?;
        bill.remaining_amount = remaining;
        bill.updated_at = now;

        match bill.status {
            BillStatus::Open => {
                if !remaining.is_positive() {
                    bill.mark_cleared(today, now);
                    tracing::info!(
                        bill_id = %bill.id,
                        overdue_days = bill.overdue_days,
                        "bill cleared"
                    );
                    return Ok(Some(BillEvent::BillCleared {
                        bill_id: bill.id,
                        cleared_at: bill.cleared_at.unwrap_or(now),
                        overdue_days: bill.overdue_days,
                        timestamp: now,
                    }));
                }
                bill.refresh_overdue(today);
                Ok(None)
            }
            BillStatus::Cleared => {
                if remaining.is_positive() {
                    bill.reopen(now);
                    tracing::info!(
                        bill_id = %bill.id,
                        outstanding = %remaining,
                        "bill reopened"
                    );
                    return Ok(Some(BillEvent::BillReopened {
                        bill_id: bill.id,
                        outstanding: remaining,
                        timestamp: now,
                    }));
                }
                Ok(None)
            }
        }
    }

    /// Sums the currently-settled payments in the bill's currency
    fn settled_total(&self, bill: &Bill, payments: &[Payment]) -> Result<Money, RecoveryError> {
        let mut total = Money::zero(bill.actual_amount.currency());
        for payment in payments.iter().filter(|p| p.is_settled()) {
            total = total.checked_add(&payment.amount)?;
        }
        Ok(total)
    }
}
