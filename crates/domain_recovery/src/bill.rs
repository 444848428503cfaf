//! Bill aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, BillId, Money, OutletId};

use crate::error::RecoveryError;
use crate::overdue::overdue_days;

/// Bill lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Balance outstanding
    Open,
    /// Fully settled
    Cleared,
}

impl BillStatus {
    pub fn code(&self) -> &'static str {
        match self {
            BillStatus::Open => "open",
            BillStatus::Cleared => "cleared",
        }
    }

    /// Parses a stored status string
    ///
    /// One historical code path wrote "closed" for settled bills; it is
    /// the same terminal state and parses as Cleared. Only "cleared" is
    /// ever written back.
    pub fn from_code(code: &str) -> Option<BillStatus> {
        match code {
            "open" => Some(BillStatus::Open),
            "cleared" | "closed" => Some(BillStatus::Cleared),
            _ => None,
        }
    }
}

/// An invoice owed by an outlet, tracked for collection
///
/// `remaining_amount`, `overdue_days`, `status`, and `cleared_at` are
/// derived state owned by the reconciliation engine; nothing else should
/// write them once the bill exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Outlet that owes the invoice
    pub outlet_id: OutletId,
    /// Globally unique invoice number, used as the external lookup key
    pub invoice_number: String,
    /// Date the obligation originated; the basis for aging
    pub invoice_date: NaiveDate,
    /// Descriptive brand tag
    pub brand: String,
    /// Original invoice amount, fixed at creation
    pub actual_amount: Money,
    /// Outstanding balance: actual_amount minus all settled payments
    pub remaining_amount: Money,
    /// Whole days elapsed since invoice_date; frozen once cleared
    pub overdue_days: u32,
    /// Lifecycle status
    pub status: BillStatus,
    /// Set once, the first time the bill clears
    pub cleared_at: Option<DateTime<Utc>>,
    /// Agent currently responsible for collection
    pub assigned_to: Option<AgentId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a new open bill
    ///
    /// The remaining balance starts at the invoice amount and the overdue
    /// count is derived from `today`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the invoice amount is not positive.
    pub fn new(
        outlet_id: OutletId,
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        actual_amount: Money,
        brand: impl Into<String>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, RecoveryError> {
        if !actual_amount.is_positive() {
            return Err(RecoveryError::validation(format!(
                "invoice amount must be positive, got {}",
                actual_amount.amount()
            )));
        }

        Ok(Self {
            id: BillId::new_v7(),
            outlet_id,
            invoice_number: invoice_number.into(),
            invoice_date,
            brand: brand.into(),
            actual_amount,
            remaining_amount: actual_amount,
            overdue_days: overdue_days(invoice_date, today),
            status: BillStatus::Open,
            cleared_at: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates a bill from bulk-import data with externally-computed
    /// derived values
    ///
    /// Import sheets carry their own remaining balance and overdue count;
    /// they are taken as supplied and not recomputed at creation time.
    #[allow(clippy::too_many_arguments)]
    pub fn from_import(
        outlet_id: OutletId,
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        actual_amount: Money,
        remaining_amount: Money,
        overdue_days: u32,
        brand: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let status = if remaining_amount.is_positive() {
            BillStatus::Open
        } else {
            BillStatus::Cleared
        };

        Self {
            id: BillId::new_v7(),
            outlet_id,
            invoice_number: invoice_number.into(),
            invoice_date,
            brand: brand.into(),
            actual_amount,
            remaining_amount,
            overdue_days,
            status,
            cleared_at: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == BillStatus::Open
    }

    pub fn is_cleared(&self) -> bool {
        self.status == BillStatus::Cleared
    }

    /// Re-derives the overdue count from the invoice date
    ///
    /// Only open bills age; once cleared, the count stays at the value it
    /// held at the moment of clearance.
    pub fn refresh_overdue(&mut self, today: NaiveDate) {
        if self.is_open() {
            self.overdue_days = overdue_days(self.invoice_date, today);
        }
    }

    /// Transitions the bill to Cleared, freezing its aging
    ///
    /// Invoked by the reconciliation engine when the remaining balance
    /// reaches zero. `cleared_at` is stamped only on the first clearance.
    pub fn mark_cleared(&mut self, today: NaiveDate, now: DateTime<Utc>) {
        self.overdue_days = overdue_days(self.invoice_date, today);
        self.status = BillStatus::Cleared;
        if self.cleared_at.is_none() {
            self.cleared_at = Some(now);
        }
        self.updated_at = now;
    }

    /// Reopens a cleared bill after a settled instrument bounced
    ///
    /// The frozen overdue count and cleared_at stamp are left as they
    /// were; only the status changes here, the balance having been
    /// restored by recomputation.
    pub fn reopen(&mut self, now: DateTime<Utc>) {
        self.status = BillStatus::Open;
        self.updated_at = now;
    }

    /// Assigns the bill to a collection agent
    ///
    /// Unconditional; assignment is independent of payment state and may
    /// be repeated.
    pub fn assign_to(&mut self, agent_id: AgentId, now: DateTime<Utc>) {
        self.assigned_to = Some(agent_id);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_parses_legacy_closed_alias() {
        assert_eq!(BillStatus::from_code("closed"), Some(BillStatus::Cleared));
        assert_eq!(BillStatus::from_code("cleared"), Some(BillStatus::Cleared));
        assert_eq!(BillStatus::from_code("open"), Some(BillStatus::Open));
        assert_eq!(BillStatus::from_code("void"), None);
        // the alias is never written back
        assert_eq!(BillStatus::Cleared.code(), "cleared");
    }

    #[test]
    fn test_new_bill_rejects_non_positive_amount() {
        let result = Bill::new(
            core_kernel::OutletId::new(),
            "INV-001",
            date(2024, 3, 1),
            Money::zero(Currency::INR),
            "Acme",
            date(2024, 3, 11),
            Utc::now(),
        );
        assert!(matches!(result, Err(RecoveryError::Validation(_))));
    }

    #[test]
    fn test_import_seeded_values_are_kept() {
        let bill = Bill::from_import(
            core_kernel::OutletId::new(),
            "INV-002",
            date(2024, 1, 1),
            Money::new(dec!(1000.00), Currency::INR),
            Money::new(dec!(250.00), Currency::INR),
            99,
            "Acme",
            Utc::now(),
        );

        // seeded values stand as supplied, even though a fresh computation
        // would disagree
        assert_eq!(bill.remaining_amount.amount(), dec!(250.00));
        assert_eq!(bill.overdue_days, 99);
        assert!(bill.is_open());
    }

    #[test]
    fn test_cleared_at_is_stamped_once() {
        let mut bill = Bill::new(
            core_kernel::OutletId::new(),
            "INV-003",
            date(2024, 3, 1),
            Money::new(dec!(100.00), Currency::INR),
            "Acme",
            date(2024, 3, 5),
            Utc::now(),
        )
        .unwrap();

        let first = Utc::now();
        bill.mark_cleared(date(2024, 3, 5), first);
        let stamped = bill.cleared_at;

        bill.reopen(Utc::now());
        bill.mark_cleared(date(2024, 3, 20), Utc::now());
        assert_eq!(bill.cleared_at, stamped);
    }
}
