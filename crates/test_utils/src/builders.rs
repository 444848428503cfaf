//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant
//! fields while using defaults for everything else.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AgentId, BillId, Money, OutletId};
use domain_recovery::{Bill, ClearanceStatus, Payment, PaymentMethod};

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing test bills
pub struct TestBillBuilder {
    outlet_id: OutletId,
    invoice_number: String,
    invoice_date: NaiveDate,
    amount: Money,
    brand: String,
    today: NaiveDate,
    now: DateTime<Utc>,
}

impl Default for TestBillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBillBuilder {
    /// Creates a new builder with default values
    ///
    /// The default bill is for 1000.00 INR, invoiced ten days before the
    /// standard collection day.
    pub fn new() -> Self {
        Self {
            outlet_id: IdFixtures::outlet_id(),
            invoice_number: StringFixtures::invoice_number().to_string(),
            invoice_date: TemporalFixtures::invoice_date(),
            amount: MoneyFixtures::inr_1000(),
            brand: StringFixtures::brand().to_string(),
            today: TemporalFixtures::collection_day(),
            now: TemporalFixtures::collection_instant(),
        }
    }

    /// Sets the invoice number
    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    /// Sets the invoice date
    pub fn with_invoice_date(mut self, date: NaiveDate) -> Self {
        self.invoice_date = date;
        self
    }

    /// Sets the invoice amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the brand tag
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Sets the reference "today" used for the initial overdue count
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Builds the test bill
    pub fn build(self) -> Bill {
        Bill::new(
            self.outlet_id,
            self.invoice_number,
            self.invoice_date,
            self.amount,
            self.brand,
            self.today,
            self.now,
        )
        .expect("test bill must be valid")
    }
}

/// Builder for constructing test payments
pub struct TestPaymentBuilder {
    bill_id: BillId,
    agent_id: AgentId,
    method: PaymentMethod,
    amount: Money,
    clearance: Option<ClearanceStatus>,
    now: DateTime<Utc>,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    /// Creates a new builder defaulting to a 500.00 INR cash payment
    pub fn new() -> Self {
        Self {
            bill_id: IdFixtures::bill_id(),
            agent_id: IdFixtures::agent_id(),
            method: PaymentMethod::Cash,
            amount: MoneyFixtures::inr_500(),
            clearance: None,
            now: TemporalFixtures::collection_instant(),
        }
    }

    /// Targets a specific bill
    pub fn for_bill(mut self, bill: &Bill) -> Self {
        self.bill_id = bill.id;
        self
    }

    /// Sets the payment method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Overrides the clearance sub-state (e.g. an already-cleared cheque)
    pub fn with_clearance(mut self, clearance: ClearanceStatus) -> Self {
        self.clearance = Some(clearance);
        self
    }

    /// Builds the test payment
    pub fn build(self) -> Payment {
        let mut payment = Payment::new(self.bill_id, self.agent_id, self.method, self.amount, self.now);
        if let Some(clearance) = self.clearance {
            payment.clearance = Some(clearance);
        }
        payment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bill_is_ten_days_overdue() {
        let bill = TestBillBuilder::new().build();
        assert_eq!(bill.overdue_days, 10);
        assert_eq!(bill.remaining_amount, bill.actual_amount);
    }

    #[test]
    fn test_payment_builder_clearance_override() {
        let payment = TestPaymentBuilder::new()
            .with_method(PaymentMethod::Cheque)
            .with_clearance(ClearanceStatus::Cleared)
            .build();
        assert!(payment.is_settled());
    }
}
