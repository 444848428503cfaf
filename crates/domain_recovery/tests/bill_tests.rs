//! Tests for the Bill aggregate lifecycle

use core_kernel::{Currency, Money};
use domain_recovery::{Bill, BillStatus, RecoveryError};
use rust_decimal_macros::dec;
use test_utils::{
    assert_amount_eq, IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures, TestBillBuilder,
};

mod creation {
    use super::*;

    #[test]
    fn test_new_bill_starts_open_with_full_balance() {
        let bill = TestBillBuilder::new().build();

        assert_eq!(bill.status, BillStatus::Open);
        assert_eq!(bill.remaining_amount, bill.actual_amount);
        assert!(bill.assigned_to.is_none());
        assert!(bill.cleared_at.is_none());
        assert_eq!(bill.invoice_number, StringFixtures::invoice_number());
    }

    #[test]
    fn test_negative_invoice_amount_is_rejected() {
        let result = Bill::new(
            IdFixtures::outlet_id(),
            "INV-NEG",
            TemporalFixtures::invoice_date(),
            Money::new(dec!(-10.00), Currency::INR),
            StringFixtures::brand(),
            TemporalFixtures::collection_day(),
            TemporalFixtures::collection_instant(),
        );

        assert!(matches!(result, Err(RecoveryError::Validation(_))));
    }
}

mod import {
    use super::*;

    #[test]
    fn test_import_keeps_externally_seeded_values() {
        let bill = Bill::from_import(
            IdFixtures::outlet_id(),
            "INV-IMP-1",
            TemporalFixtures::invoice_date(),
            MoneyFixtures::inr_1000(),
            Money::new(dec!(350.00), Currency::INR),
            45,
            StringFixtures::brand(),
            TemporalFixtures::collection_instant(),
        );

        // the sheet's figures stand; no recomputation at creation time
        assert_amount_eq(&bill.remaining_amount, dec!(350.00));
        assert_eq!(bill.overdue_days, 45);
        assert_eq!(bill.status, BillStatus::Open);
    }

    #[test]
    fn test_import_with_zero_balance_is_cleared() {
        let bill = Bill::from_import(
            IdFixtures::outlet_id(),
            "INV-IMP-2",
            TemporalFixtures::invoice_date(),
            MoneyFixtures::inr_1000(),
            MoneyFixtures::inr_zero(),
            45,
            StringFixtures::brand(),
            TemporalFixtures::collection_instant(),
        );

        assert_eq!(bill.status, BillStatus::Cleared);
        assert_eq!(bill.overdue_days, 45);
    }
}

mod assignment {
    use super::*;

    #[test]
    fn test_assignment_is_independent_of_status() {
        let mut bill = TestBillBuilder::new().build();
        bill.mark_cleared(
            TemporalFixtures::collection_day(),
            TemporalFixtures::collection_instant(),
        );

        bill.assign_to(IdFixtures::agent_id(), TemporalFixtures::collection_instant());

        assert_eq!(bill.assigned_to, Some(IdFixtures::agent_id()));
        assert_eq!(bill.status, BillStatus::Cleared);
    }
}
