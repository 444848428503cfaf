//! Overdue day calculation
//!
//! A bill's age is measured in whole calendar days from its invoice date,
//! never from its record-creation timestamp. The count is clamped at zero
//! for future-dated invoices and frozen once the bill clears.

use chrono::NaiveDate;

/// Computes the overdue day count for an invoice date as of `today`
///
/// Returns `max(today - invoice_date, 0)` in whole days.
pub fn overdue_days(invoice_date: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - invoice_date).num_days();
    if days < 0 {
        0
    } else {
        days as u32
    }
}
