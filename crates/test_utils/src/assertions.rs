//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_recovery::{Bill, Payment};
use rust_decimal::Decimal;

/// Asserts that a Money value equals an expected decimal amount
pub fn assert_amount_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected amount {}, got {} {}",
        expected,
        actual.currency().symbol(),
        actual.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is strictly positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the reconciliation invariant for a bill and its payment set
///
/// `remaining_amount == actual_amount - Σ(amount of settled payments)`
///
/// # Panics
///
/// Panics with the full balance breakdown if the invariant does not hold.
pub fn assert_bill_balanced(bill: &Bill, payments: &[Payment]) {
    let settled: Decimal = payments
        .iter()
        .filter(|p| p.is_settled())
        .map(|p| p.amount.amount())
        .sum();

    let expected = bill.actual_amount.amount() - settled;

    assert_eq!(
        bill.remaining_amount.amount(),
        expected,
        "Balance invariant violated for bill {}: actual={}, settled={}, remaining={} (expected {})",
        bill.id,
        bill.actual_amount.amount(),
        settled,
        bill.remaining_amount.amount(),
        expected
    );
}
