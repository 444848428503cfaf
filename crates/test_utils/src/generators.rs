//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data and
//! operation scripts that exercise the reconciliation engine.

use core_kernel::{Currency, Money};
use domain_recovery::PaymentMethod;
use proptest::prelude::*;

/// Strategy for generating any payment method
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Upi),
        Just(PaymentMethod::Cheque),
        Just(PaymentMethod::Electronic),
    ]
}

/// Strategy for methods that settle immediately
pub fn immediate_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![Just(PaymentMethod::Cash), Just(PaymentMethod::Upi)]
}

/// Strategy for methods that settle behind a clearance sub-state
pub fn deferred_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![Just(PaymentMethod::Cheque), Just(PaymentMethod::Electronic)]
}

/// Strategy for positive amounts in minor units (paise)
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for positive INR Money values
pub fn inr_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::INR))
}

/// One step of a randomized reconciliation script
///
/// Target indexes are taken modulo the relevant collection size by the
/// interpreting test, so any usize is meaningful once payments exist.
#[derive(Debug, Clone)]
pub enum ReconcileOp {
    /// Record a payment of the given method and amount (minor units);
    /// the interpreter clamps the amount to the remaining balance
    Record { method: PaymentMethod, amount_minor: i64 },
    /// Clear a pending instrument
    Clear { target: usize },
    /// Bounce a pending or cleared instrument
    Bounce { target: usize },
    /// Delete a payment
    Delete { target: usize },
}

fn reconcile_op_strategy() -> impl Strategy<Value = ReconcileOp> {
    prop_oneof![
        3 => (payment_method_strategy(), 1i64..60_000i64)
            .prop_map(|(method, amount_minor)| ReconcileOp::Record { method, amount_minor }),
        2 => any::<usize>().prop_map(|target| ReconcileOp::Clear { target }),
        1 => any::<usize>().prop_map(|target| ReconcileOp::Bounce { target }),
        1 => any::<usize>().prop_map(|target| ReconcileOp::Delete { target }),
    ]
}

/// Strategy for a script of reconciliation operations
pub fn reconcile_ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<ReconcileOp>> {
    prop::collection::vec(reconcile_op_strategy(), 1..=max_ops)
}
