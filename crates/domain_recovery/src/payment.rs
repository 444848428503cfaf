//! Payment records and clearance sub-states

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, BillId, Money, PaymentId};

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash handed to the agent; settles immediately
    Cash,
    /// UPI transfer; settles immediately
    Upi,
    /// Cheque; settles only once the instrument clears
    Cheque,
    /// Electronic transfer (NEFT/RTGS); settles only once confirmed
    Electronic,
}

impl PaymentMethod {
    /// Whether settlement is deferred behind a clearance sub-state
    pub fn requires_clearance(&self) -> bool {
        matches!(self, PaymentMethod::Cheque | PaymentMethod::Electronic)
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Electronic => "electronic",
        }
    }

    /// Parses a stored method string
    pub fn from_code(code: &str) -> Option<PaymentMethod> {
        match code {
            "cash" => Some(PaymentMethod::Cash),
            "upi" => Some(PaymentMethod::Upi),
            "cheque" => Some(PaymentMethod::Cheque),
            "electronic" => Some(PaymentMethod::Electronic),
            _ => None,
        }
    }
}

/// Clearance sub-state for cheque and electronic payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearanceStatus {
    /// Instrument recorded but not yet resolved
    Pending,
    /// Instrument honored; the payment counts as settled
    Cleared,
    /// Instrument rejected; the payment contributes nothing
    Bounced,
}

impl ClearanceStatus {
    /// Checks whether a clearance transition is allowed
    ///
    /// Cleared -> Bounced is the correction path for an instrument that
    /// was honored in error. A bounced instrument is final.
    pub fn can_transition_to(&self, target: ClearanceStatus) -> bool {
        use ClearanceStatus::*;
        matches!(
            (self, target),
            (Pending, Cleared) | (Pending, Bounced) | (Cleared, Bounced)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClearanceStatus::Pending => "pending",
            ClearanceStatus::Cleared => "cleared",
            ClearanceStatus::Bounced => "bounced",
        }
    }

    /// Parses a stored clearance string
    pub fn from_code(code: &str) -> Option<ClearanceStatus> {
        match code {
            "pending" => Some(ClearanceStatus::Pending),
            "cleared" => Some(ClearanceStatus::Cleared),
            "bounced" => Some(ClearanceStatus::Bounced),
            _ => None,
        }
    }
}

/// A single settlement attempt against a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Bill being paid
    pub bill_id: BillId,
    /// Agent who recorded the collection
    pub agent_id: AgentId,
    /// Payment method
    pub method: PaymentMethod,
    /// Amount collected
    pub amount: Money,
    /// Clearance sub-state; None for methods that settle immediately
    pub clearance: Option<ClearanceStatus>,
    /// Cheque number, if paid by cheque
    pub cheque_number: Option<String>,
    /// Cheque kind (bearer, crossed, ...); inert bookkeeping
    pub cheque_kind: Option<String>,
    /// Instrument date; overwritten with the clearance date when cleared
    pub cheque_date: Option<NaiveDate>,
    /// Bank transaction reference for electronic payments
    pub transaction_number: Option<i64>,
    /// Record-creation time; the settlement time for cash and UPI
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment record
    ///
    /// Cheque and electronic payments start Pending; cash and UPI carry
    /// no clearance sub-state at all.
    pub fn new(
        bill_id: BillId,
        agent_id: AgentId,
        method: PaymentMethod,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Self {
        let clearance = method.requires_clearance().then_some(ClearanceStatus::Pending);

        Self {
            id: PaymentId::new_v7(),
            bill_id,
            agent_id,
            method,
            amount,
            clearance,
            cheque_number: None,
            cheque_kind: None,
            cheque_date: None,
            transaction_number: None,
            created_at: now,
        }
    }

    /// Whether this payment currently counts toward the bill's balance
    ///
    /// Cash and UPI count unconditionally; deferred instruments count
    /// only while cleared. A bounced instrument contributes zero.
    pub fn is_settled(&self) -> bool {
        match self.clearance {
            None => true,
            Some(ClearanceStatus::Cleared) => true,
            Some(ClearanceStatus::Pending) | Some(ClearanceStatus::Bounced) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn payment(method: PaymentMethod) -> Payment {
        Payment::new(
            BillId::new(),
            AgentId::new(),
            method,
            Money::new(dec!(100.00), Currency::INR),
            Utc::now(),
        )
    }

    #[test]
    fn test_cash_and_upi_settle_immediately() {
        assert!(payment(PaymentMethod::Cash).is_settled());
        assert!(payment(PaymentMethod::Upi).is_settled());
        assert!(payment(PaymentMethod::Cash).clearance.is_none());
    }

    #[test]
    fn test_instruments_start_pending() {
        let cheque = payment(PaymentMethod::Cheque);
        assert_eq!(cheque.clearance, Some(ClearanceStatus::Pending));
        assert!(!cheque.is_settled());

        let electronic = payment(PaymentMethod::Electronic);
        assert_eq!(electronic.clearance, Some(ClearanceStatus::Pending));
        assert!(!electronic.is_settled());
    }

    #[test]
    fn test_clearance_transition_table() {
        use ClearanceStatus::*;

        assert!(Pending.can_transition_to(Cleared));
        assert!(Pending.can_transition_to(Bounced));
        assert!(Cleared.can_transition_to(Bounced));

        assert!(!Bounced.can_transition_to(Pending));
        assert!(!Bounced.can_transition_to(Cleared));
        assert!(!Cleared.can_transition_to(Pending));
        assert!(!Cleared.can_transition_to(Cleared));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_only_cleared_instruments_settle() {
        let mut cheque = payment(PaymentMethod::Cheque);

        cheque.clearance = Some(ClearanceStatus::Cleared);
        assert!(cheque.is_settled());

        cheque.clearance = Some(ClearanceStatus::Bounced);
        assert!(!cheque.is_settled());
    }
}
