//! Unit tests for the balance reconciliation engine
//!
//! Covers payment recording across methods, clearance transitions,
//! reopening on bounce, deletion recomputation, and the balance
//! invariant under randomized operation scripts.

use chrono::Duration;
use domain_agents::AgentRole;
use domain_recovery::{
    BillEvent, ClearanceStatus, Payment, PaymentMethod, PaymentRequest, ReconciliationEngine,
    RecoveryError,
};
use rust_decimal_macros::dec;
use test_utils::{
    assert_amount_eq, assert_bill_balanced, IdFixtures, MoneyFixtures, TemporalFixtures,
    TestBillBuilder,
};

fn engine() -> ReconciliationEngine {
    ReconciliationEngine::new()
}

fn cash_request(amount: core_kernel::Money) -> PaymentRequest {
    PaymentRequest::new(IdFixtures::agent_id(), PaymentMethod::Cash, amount)
}

fn cheque_request(amount: core_kernel::Money) -> PaymentRequest {
    PaymentRequest::new(IdFixtures::agent_id(), PaymentMethod::Cheque, amount).with_cheque(
        "881273",
        "crossed",
        TemporalFixtures::collection_day(),
    )
}

mod recording {
    use super::*;

    #[test]
    fn test_fresh_bill_state() {
        // Scenario: 1000.00 bill invoiced ten days ago
        let bill = TestBillBuilder::new().build();

        assert_amount_eq(&bill.remaining_amount, dec!(1000.00));
        assert_eq!(bill.overdue_days, 10);
        assert!(bill.is_open());
        assert!(bill.cleared_at.is_none());
    }

    #[test]
    fn test_full_cash_payment_clears_bill() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, event) = engine()
            .record_payment(&mut bill, &[], cash_request(MoneyFixtures::inr_1000()), today, now)
            .unwrap();

        assert_amount_eq(&bill.remaining_amount, dec!(0.00));
        assert!(bill.is_cleared());
        assert_eq!(bill.cleared_at, Some(now));
        assert_eq!(bill.overdue_days, 10);
        assert!(payment.is_settled());
        assert!(matches!(event, Some(BillEvent::BillCleared { overdue_days: 10, .. })));
    }

    #[test]
    fn test_partial_payments_accumulate() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (first, event) = engine()
            .record_payment(&mut bill, &[], cash_request(MoneyFixtures::inr_500()), today, now)
            .unwrap();
        assert_amount_eq(&bill.remaining_amount, dec!(500.00));
        assert!(event.is_none());
        assert!(bill.is_open());

        let (_, event) = engine()
            .record_payment(
                &mut bill,
                &[first],
                cash_request(MoneyFixtures::inr_500()),
                today,
                now,
            )
            .unwrap();
        assert_amount_eq(&bill.remaining_amount, dec!(0.00));
        assert!(matches!(event, Some(BillEvent::BillCleared { .. })));
    }

    #[test]
    fn test_pending_cheque_leaves_balance_untouched() {
        // Scenario: cheque for the full amount, not yet cleared
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, event) = engine()
            .record_payment(&mut bill, &[], cheque_request(MoneyFixtures::inr_1000()), today, now)
            .unwrap();

        assert_amount_eq(&bill.remaining_amount, dec!(1000.00));
        assert!(bill.is_open());
        assert!(event.is_none());
        assert_eq!(payment.clearance, Some(ClearanceStatus::Pending));
        assert_eq!(payment.cheque_number.as_deref(), Some("881273"));
    }

    #[test]
    fn test_upi_settles_immediately() {
        let mut bill = TestBillBuilder::new().build();
        let request = PaymentRequest::new(
            IdFixtures::agent_id(),
            PaymentMethod::Upi,
            MoneyFixtures::inr_1000(),
        )
        .with_transaction_number(987654321);

        let (payment, event) = engine()
            .record_payment(
                &mut bill,
                &[],
                request,
                TemporalFixtures::collection_day(),
                TemporalFixtures::collection_instant(),
            )
            .unwrap();

        assert!(payment.is_settled());
        assert_eq!(payment.transaction_number, Some(987654321));
        assert!(matches!(event, Some(BillEvent::BillCleared { .. })));
    }
}

mod preconditions {
    use super::*;

    #[test]
    fn test_overpayment_is_rejected_without_side_effects() {
        // Scenario: 1000.00 bill already reduced to 400.00 remaining
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (first, _) = engine()
            .record_payment(
                &mut bill,
                &[],
                cash_request(core_kernel::Money::from_minor(60_000, core_kernel::Currency::INR)),
                today,
                now,
            )
            .unwrap();
        assert_amount_eq(&bill.remaining_amount, dec!(400.00));

        let result = engine().record_payment(
            &mut bill,
            &[first.clone()],
            cash_request(MoneyFixtures::inr_500()),
            today,
            now,
        );

        assert!(
            matches!(result, Err(RecoveryError::Validation(ref msg)) if msg.contains("overpayment"))
        );
        // bill state unchanged by the rejected request
        assert_amount_eq(&bill.remaining_amount, dec!(400.00));
        assert!(bill.is_open());
        assert_bill_balanced(&bill, &[first]);
    }

    #[test]
    fn test_payment_against_settled_bill_is_rejected() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, _) = engine()
            .record_payment(&mut bill, &[], cash_request(MoneyFixtures::inr_1000()), today, now)
            .unwrap();

        let result = engine().record_payment(
            &mut bill,
            &[payment],
            cash_request(MoneyFixtures::inr_100()),
            today,
            now,
        );

        assert!(
            matches!(result, Err(RecoveryError::Validation(ref msg)) if msg.contains("already fully paid"))
        );
    }

    #[test]
    fn test_non_positive_amount_is_rejected() {
        let mut bill = TestBillBuilder::new().build();
        let result = engine().record_payment(
            &mut bill,
            &[],
            cash_request(MoneyFixtures::inr_zero()),
            TemporalFixtures::collection_day(),
            TemporalFixtures::collection_instant(),
        );

        assert!(
            matches!(result, Err(RecoveryError::Validation(ref msg)) if msg.contains("positive"))
        );
    }

    #[test]
    fn test_currency_mismatch_is_rejected() {
        let mut bill = TestBillBuilder::new().build();
        let result = engine().record_payment(
            &mut bill,
            &[],
            cash_request(MoneyFixtures::usd_100()),
            TemporalFixtures::collection_day(),
            TemporalFixtures::collection_instant(),
        );

        assert!(matches!(result, Err(RecoveryError::Money(_))));
    }
}

mod clearance {
    use super::*;

    /// Records a pending full-amount cheque against a fresh bill
    fn bill_with_pending_cheque() -> (domain_recovery::Bill, Vec<Payment>) {
        let mut bill = TestBillBuilder::new().build();
        let (payment, _) = engine()
            .record_payment(
                &mut bill,
                &[],
                cheque_request(MoneyFixtures::inr_1000()),
                TemporalFixtures::collection_day(),
                TemporalFixtures::collection_instant(),
            )
            .unwrap();
        (bill, vec![payment])
    }

    #[test]
    fn test_clearing_cheque_settles_bill() {
        let (mut bill, mut payments) = bill_with_pending_cheque();
        let clearance_day = TemporalFixtures::later_day();
        let now = TemporalFixtures::collection_instant();
        let payment_id = payments[0].id;

        let event = engine()
            .update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                payment_id,
                ClearanceStatus::Cleared,
                clearance_day,
                now,
            )
            .unwrap();

        assert_amount_eq(&bill.remaining_amount, dec!(0.00));
        assert!(bill.is_cleared());
        assert!(matches!(event, Some(BillEvent::BillCleared { .. })));
        // the instrument date is restamped to the clearance day
        assert_eq!(payments[0].cheque_date, Some(clearance_day));
        assert_bill_balanced(&bill, &payments);
    }

    #[test]
    fn test_bounce_after_clearance_reopens_bill() {
        let (mut bill, mut payments) = bill_with_pending_cheque();
        let today = TemporalFixtures::later_day();
        let now = TemporalFixtures::collection_instant();
        let payment_id = payments[0].id;

        engine()
            .update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                payment_id,
                ClearanceStatus::Cleared,
                today,
                now,
            )
            .unwrap();
        let frozen_overdue = bill.overdue_days;
        let cleared_at = bill.cleared_at;

        let event = engine()
            .update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                payment_id,
                ClearanceStatus::Bounced,
                today,
                now,
            )
            .unwrap();

        // the bounced amount is restored in full and the bill reopens
        assert_amount_eq(&bill.remaining_amount, dec!(1000.00));
        assert!(bill.is_open());
        assert!(matches!(event, Some(BillEvent::BillReopened { .. })));
        // reopening does not rewind the frozen aging values
        assert_eq!(bill.overdue_days, frozen_overdue);
        assert_eq!(bill.cleared_at, cleared_at);
        assert_bill_balanced(&bill, &payments);
    }

    #[test]
    fn test_bounce_of_pending_cheque_changes_nothing_financially() {
        let (mut bill, mut payments) = bill_with_pending_cheque();
        let payment_id = payments[0].id;

        let event = engine()
            .update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                payment_id,
                ClearanceStatus::Bounced,
                TemporalFixtures::collection_day(),
                TemporalFixtures::collection_instant(),
            )
            .unwrap();

        assert_amount_eq(&bill.remaining_amount, dec!(1000.00));
        assert!(bill.is_open());
        assert!(event.is_none());
    }

    #[test]
    fn test_disallowed_transitions_are_rejected() {
        let (mut bill, mut payments) = bill_with_pending_cheque();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();
        let payment_id = payments[0].id;

        engine()
            .update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                payment_id,
                ClearanceStatus::Bounced,
                today,
                now,
            )
            .unwrap();

        // a bounced instrument is final
        for target in [ClearanceStatus::Pending, ClearanceStatus::Cleared] {
            let result = engine().update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                payment_id,
                target,
                today,
                now,
            );
            assert!(matches!(
                result,
                Err(RecoveryError::InvalidClearanceTransition { .. })
            ));
        }
        assert_eq!(payments[0].clearance, Some(ClearanceStatus::Bounced));
    }

    #[test]
    fn test_cash_payment_has_no_clearance_to_update() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, _) = engine()
            .record_payment(&mut bill, &[], cash_request(MoneyFixtures::inr_500()), today, now)
            .unwrap();
        let mut payments = vec![payment];
        let payment_id = payments[0].id;

        let result = engine().update_clearance(
            AgentRole::Admin,
            &mut bill,
            &mut payments,
            payment_id,
            ClearanceStatus::Cleared,
            today,
            now,
        );

        assert!(matches!(result, Err(RecoveryError::Validation(_))));
    }

    #[test]
    fn test_clearance_requires_admin() {
        let (mut bill, mut payments) = bill_with_pending_cheque();
        let payment_id = payments[0].id;

        let result = engine().update_clearance(
            AgentRole::Dra,
            &mut bill,
            &mut payments,
            payment_id,
            ClearanceStatus::Cleared,
            TemporalFixtures::collection_day(),
            TemporalFixtures::collection_instant(),
        );

        assert!(matches!(result, Err(RecoveryError::Forbidden(_))));
        assert_eq!(payments[0].clearance, Some(ClearanceStatus::Pending));
    }

    #[test]
    fn test_unknown_payment_is_not_found() {
        let (mut bill, mut payments) = bill_with_pending_cheque();

        let result = engine().update_clearance(
            AgentRole::Admin,
            &mut bill,
            &mut payments,
            IdFixtures::payment_id(),
            ClearanceStatus::Cleared,
            TemporalFixtures::collection_day(),
            TemporalFixtures::collection_instant(),
        );

        assert!(matches!(result, Err(RecoveryError::NotFound(_))));
    }

    #[test]
    fn test_instrument_clearing_after_cash_can_drive_balance_negative() {
        // A cheque accepted against the full balance, then cash collected
        // while it is pending: once the cheque clears, the settled total
        // exceeds the invoice. The post-effect check still treats a
        // non-positive balance as cleared.
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (cheque, _) = engine()
            .record_payment(&mut bill, &[], cheque_request(MoneyFixtures::inr_1000()), today, now)
            .unwrap();
        let (cash, _) = engine()
            .record_payment(
                &mut bill,
                &[cheque.clone()],
                cash_request(MoneyFixtures::inr_500()),
                today,
                now,
            )
            .unwrap();

        let mut payments = vec![cheque, cash];
        let cheque_id = payments[0].id;
        engine()
            .update_clearance(
                AgentRole::Admin,
                &mut bill,
                &mut payments,
                cheque_id,
                ClearanceStatus::Cleared,
                today,
                now,
            )
            .unwrap();

        assert_amount_eq(&bill.remaining_amount, dec!(-500.00));
        assert!(bill.is_cleared());
        assert_bill_balanced(&bill, &payments);
    }
}

mod deletion {
    use super::*;

    #[test]
    fn test_deleting_settled_payment_restores_balance() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, _) = engine()
            .record_payment(&mut bill, &[], cash_request(MoneyFixtures::inr_1000()), today, now)
            .unwrap();
        assert!(bill.is_cleared());

        let mut payments = vec![payment];
        let payment_id = payments[0].id;
        let event = engine()
            .delete_payment(AgentRole::Admin, &mut bill, &mut payments, payment_id, today, now)
            .unwrap();

        // a deleted settled payment stops counting and the bill reopens
        assert_amount_eq(&bill.remaining_amount, dec!(1000.00));
        assert!(bill.is_open());
        assert!(matches!(event, Some(BillEvent::BillReopened { .. })));
        assert!(payments.is_empty());
    }

    #[test]
    fn test_deleting_pending_instrument_changes_no_balance() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, _) = engine()
            .record_payment(&mut bill, &[], cheque_request(MoneyFixtures::inr_500()), today, now)
            .unwrap();
        let mut payments = vec![payment];
        let payment_id = payments[0].id;

        let event = engine()
            .delete_payment(AgentRole::Admin, &mut bill, &mut payments, payment_id, today, now)
            .unwrap();

        assert_amount_eq(&bill.remaining_amount, dec!(1000.00));
        assert!(event.is_none());
    }

    #[test]
    fn test_deletion_requires_admin() {
        let mut bill = TestBillBuilder::new().build();
        let today = TemporalFixtures::collection_day();
        let now = TemporalFixtures::collection_instant();

        let (payment, _) = engine()
            .record_payment(&mut bill, &[], cash_request(MoneyFixtures::inr_500()), today, now)
            .unwrap();
        let mut payments = vec![payment];
        let payment_id = payments[0].id;

        let result =
            engine().delete_payment(AgentRole::Dra, &mut bill, &mut payments, payment_id, today, now);

        assert!(matches!(result, Err(RecoveryError::Forbidden(_))));
        assert_eq!(payments.len(), 1);
    }
}

mod assignment {
    use super::*;

    #[test]
    fn test_bulk_assignment_sets_all_bills() {
        let mut bills = vec![
            TestBillBuilder::new().with_invoice_number("INV-A").build(),
            TestBillBuilder::new().with_invoice_number("INV-B").build(),
        ];
        let agent = IdFixtures::agent_id();

        engine().assign_bills(&mut bills, agent, TemporalFixtures::collection_instant());

        assert!(bills.iter().all(|b| b.assigned_to == Some(agent)));
    }

    #[test]
    fn test_assignment_does_not_touch_balance_or_status() {
        let mut bill = TestBillBuilder::new().build();
        let before_remaining = bill.remaining_amount;
        let before_status = bill.status;

        engine().assign_bills(
            std::slice::from_mut(&mut bill),
            IdFixtures::agent_id(),
            TemporalFixtures::collection_instant(),
        );

        assert_eq!(bill.remaining_amount, before_remaining);
        assert_eq!(bill.status, before_status);
    }

    #[test]
    fn test_reassignment_to_same_agent_is_a_no_op_in_effect() {
        let mut bill = TestBillBuilder::new().build();
        let agent = IdFixtures::agent_id();
        let now = TemporalFixtures::collection_instant();

        engine().assign_bills(std::slice::from_mut(&mut bill), agent, now);
        let snapshot = bill.assigned_to;
        engine().assign_bills(std::slice::from_mut(&mut bill), agent, now);

        assert_eq!(bill.assigned_to, snapshot);
    }
}

mod invariant {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::prelude::ToPrimitive;
    use test_utils::generators::{reconcile_ops_strategy, ReconcileOp};

    proptest! {
        /// The balance invariant holds after every step of a random
        /// record/clear/bounce/delete script, and status always agrees
        /// with the sign of the balance.
        #[test]
        fn balance_invariant_holds_through_random_scripts(
            ops in reconcile_ops_strategy(14)
        ) {
            let engine = ReconciliationEngine::new();
            let mut bill = TestBillBuilder::new().build();
            let mut payments: Vec<Payment> = Vec::new();
            let mut today = TemporalFixtures::collection_day();
            let now = TemporalFixtures::collection_instant();

            for op in ops {
                // each step happens a day later, so aging advances too
                today = today + Duration::days(1);

                match op {
                    ReconcileOp::Record { method, amount_minor } => {
                        if !bill.remaining_amount.is_positive() {
                            continue;
                        }
                        let remaining_minor = (bill.remaining_amount.amount()
                            * rust_decimal::Decimal::ONE_HUNDRED)
                            .to_i64()
                            .unwrap();
                        let amount = core_kernel::Money::from_minor(
                            amount_minor.clamp(1, remaining_minor),
                            core_kernel::Currency::INR,
                        );
                        let request =
                            PaymentRequest::new(IdFixtures::agent_id(), method, amount);
                        let (payment, _) = engine
                            .record_payment(&mut bill, &payments, request, today, now)
                            .unwrap();
                        payments.push(payment);
                    }
                    ReconcileOp::Clear { target } => {
                        let candidates: Vec<_> = payments
                            .iter()
                            .filter(|p| p.clearance == Some(ClearanceStatus::Pending))
                            .map(|p| p.id)
                            .collect();
                        if candidates.is_empty() {
                            continue;
                        }
                        let id = candidates[target % candidates.len()];
                        engine
                            .update_clearance(
                                AgentRole::Admin,
                                &mut bill,
                                &mut payments,
                                id,
                                ClearanceStatus::Cleared,
                                today,
                                now,
                            )
                            .unwrap();
                    }
                    ReconcileOp::Bounce { target } => {
                        let candidates: Vec<_> = payments
                            .iter()
                            .filter(|p| {
                                matches!(
                                    p.clearance,
                                    Some(ClearanceStatus::Pending) | Some(ClearanceStatus::Cleared)
                                )
                            })
                            .map(|p| p.id)
                            .collect();
                        if candidates.is_empty() {
                            continue;
                        }
                        let id = candidates[target % candidates.len()];
                        engine
                            .update_clearance(
                                AgentRole::Admin,
                                &mut bill,
                                &mut payments,
                                id,
                                ClearanceStatus::Bounced,
                                today,
                                now,
                            )
                            .unwrap();
                    }
                    ReconcileOp::Delete { target } => {
                        if payments.is_empty() {
                            continue;
                        }
                        let id = payments[target % payments.len()].id;
                        engine
                            .delete_payment(
                                AgentRole::Admin,
                                &mut bill,
                                &mut payments,
                                id,
                                today,
                                now,
                            )
                            .unwrap();
                    }
                }

                assert_bill_balanced(&bill, &payments);
                if bill.is_open() {
                    prop_assert!(bill.remaining_amount.is_positive());
                } else {
                    prop_assert!(!bill.remaining_amount.is_positive());
                }
            }
        }
    }
}
