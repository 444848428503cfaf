//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the debt
//! recovery system. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{AgentId, BillId, Currency, Money, OutletId, PaymentId, RouteId};
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The standard test invoice amount
    pub fn inr_1000() -> Money {
        Money::from_minor(100_000, Currency::INR)
    }

    /// A typical partial collection
    pub fn inr_500() -> Money {
        Money::from_minor(50_000, Currency::INR)
    }

    /// A small collection
    pub fn inr_100() -> Money {
        Money::from_minor(10_000, Currency::INR)
    }

    /// Creates a zero amount
    pub fn inr_zero() -> Money {
        Money::zero(Currency::INR)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::from_minor(10_000, Currency::USD)
    }
}

/// Fixture for calendar test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard invoice date (Mar 1, 2024)
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// Standard collection day, ten days after the invoice date
    pub fn collection_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    /// A later day for aging tests (Mar 21, 2024)
    pub fn later_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 21).unwrap()
    }

    /// An invoice date in the future relative to the collection day
    pub fn future_invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    /// The instant corresponding to the collection day
    pub fn collection_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 0).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic route ID for testing
    pub fn route_id() -> RouteId {
        RouteId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic outlet ID for testing
    pub fn outlet_id() -> OutletId {
        OutletId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic bill ID for testing
    pub fn bill_id() -> BillId {
        BillId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic payment ID for testing
    pub fn payment_id() -> PaymentId {
        PaymentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic agent ID for testing
    pub fn agent_id() -> AgentId {
        AgentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap())
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard invoice number
    pub fn invoice_number() -> &'static str {
        "INV-2024-000001"
    }

    /// Standard brand tag
    pub fn brand() -> &'static str {
        "Sunrise Beverages"
    }

    /// Standard route name
    pub fn route_name() -> &'static str {
        "North Market Road"
    }

    /// Standard outlet name
    pub fn outlet_name() -> &'static str {
        "Krishna General Store"
    }

    /// Test agent username
    pub fn username() -> &'static str {
        "ravi.kumar"
    }

    /// Test agent email
    pub fn email() -> &'static str {
        "ravi.kumar@example.com"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_day_is_ten_days_after_invoice() {
        let gap = TemporalFixtures::collection_day() - TemporalFixtures::invoice_date();
        assert_eq!(gap.num_days(), 10);
    }

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::bill_id(), IdFixtures::bill_id());
        assert_eq!(IdFixtures::agent_id(), IdFixtures::agent_id());
    }

    #[test]
    fn test_collection_instant_falls_on_collection_day() {
        assert_eq!(
            TemporalFixtures::collection_instant().date_naive(),
            TemporalFixtures::collection_day()
        );
    }
}
