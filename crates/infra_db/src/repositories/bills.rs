//! Bill repository implementation
//!
//! Provides database access for bills: creation (including seeded bulk
//! import rows), lookup by id and invoice number, assignment as a single
//! batched update, and the bulk overdue sweep for open bills.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BillId, Currency, Money};
use domain_recovery::{Bill, BillStatus};

use crate::error::DatabaseError;

/// Database row for a bill
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRow {
    pub bill_id: Uuid,
    pub outlet_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub brand: String,
    pub currency: String,
    pub actual_amount: Decimal,
    pub remaining_amount: Decimal,
    pub overdue_days: i32,
    pub status: String,
    pub cleared_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillRow {
    /// Maps the row into the domain aggregate
    pub fn into_domain(self) -> Result<Bill, DatabaseError> {
        let currency = Currency::from_code(&self.currency)
            .ok_or_else(|| DatabaseError::bad_column("currency", &self.currency))?;
        let status = BillStatus::from_code(&self.status)
            .ok_or_else(|| DatabaseError::bad_column("status", &self.status))?;

        Ok(Bill {
            id: self.bill_id.into(),
            outlet_id: self.outlet_id.into(),
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            brand: self.brand,
            actual_amount: Money::new(self.actual_amount, currency),
            remaining_amount: Money::new(self.remaining_amount, currency),
            overdue_days: self.overdue_days.max(0) as u32,
            status,
            cleared_at: self.cleared_at,
            assigned_to: self.assigned_to.map(Into::into),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub(crate) const SELECT_BILL: &str = r#"
    SELECT bill_id, outlet_id, invoice_number, invoice_date, brand, currency,
           actual_amount, remaining_amount, overdue_days, status, cleared_at,
           assigned_to, created_at, updated_at
    FROM bills
"#;

/// Repository for bill records
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: PgPool,
}

impl BillRepository {
    /// Creates a new BillRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a bill
    ///
    /// Used both for freshly-created bills and for bulk-import rows whose
    /// remaining balance and overdue count were seeded externally; the
    /// supplied derived values are written as-is.
    pub async fn create(&self, bill: &Bill) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bills (
                bill_id, outlet_id, invoice_number, invoice_date, brand, currency,
                actual_amount, remaining_amount, overdue_days, status, cleared_at,
                assigned_to, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(bill.id.as_uuid())
        .bind(bill.outlet_id.as_uuid())
        .bind(&bill.invoice_number)
        .bind(bill.invoice_date)
        .bind(&bill.brand)
        .bind(bill.actual_amount.currency().code())
        .bind(bill.actual_amount.amount())
        .bind(bill.remaining_amount.amount())
        .bind(bill.overdue_days as i32)
        .bind(bill.status.code())
        .bind(bill.cleared_at)
        .bind(bill.assigned_to.map(|id| *id.as_uuid()))
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieves a bill by id
    pub async fn find_by_id(&self, id: BillId) -> Result<Bill, DatabaseError> {
        let row = sqlx::query_as::<_, BillRow>(&format!("{} WHERE bill_id = $1", SELECT_BILL))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Bill", id))?;

        row.into_domain()
    }

    /// Retrieves a bill by its invoice number (exact match)
    pub async fn find_by_invoice_number(&self, invoice_number: &str) -> Result<Bill, DatabaseError> {
        let row = sqlx::query_as::<_, BillRow>(&format!(
            "{} WHERE invoice_number = $1",
            SELECT_BILL
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", invoice_number))?;

        row.into_domain()
    }

    /// Lists bills, newest first, optionally filtered by an
    /// invoice-number fragment
    pub async fn list(&self, invoice_number: Option<&str>) -> Result<Vec<Bill>, DatabaseError> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR invoice_number ILIKE '%' || $1 || '%')
            ORDER BY created_at DESC
            "#,
            SELECT_BILL
        ))
        .bind(invoice_number)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BillRow::into_domain).collect()
    }

    /// Lists the open bills assigned to an agent, newest first
    pub async fn open_bills_for_agent(
        &self,
        agent_id: core_kernel::AgentId,
    ) -> Result<Vec<Bill>, DatabaseError> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            r#"{}
            WHERE assigned_to = $1 AND status = 'open'
            ORDER BY created_at DESC
            "#,
            SELECT_BILL
        ))
        .bind(agent_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BillRow::into_domain).collect()
    }

    /// Bulk-assigns bills to an agent as a single batched update
    ///
    /// Unconditional: no validation against bill status, and no ordering
    /// requirement across the affected rows. Returns the number of bills
    /// updated.
    pub async fn assign_bills(
        &self,
        bill_ids: &[BillId],
        agent_id: core_kernel::AgentId,
        now: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let ids: Vec<Uuid> = bill_ids.iter().map(|id| *id.as_uuid()).collect();

        let result = sqlx::query(
            r#"
            UPDATE bills
            SET assigned_to = $1, updated_at = $2
            WHERE bill_id = ANY($3)
            "#,
        )
        .bind(agent_id.as_uuid())
        .bind(now)
        .bind(&ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Re-derives overdue_days for every open bill in one statement
    ///
    /// The scheduled sweep. Cleared bills are untouched, keeping their
    /// frozen counts. Returns the number of bills updated.
    pub async fn refresh_overdue_days(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE bills
            SET overdue_days = GREATEST(($1::date - invoice_date), 0),
                updated_at = $2
            WHERE status = 'open'
            "#,
        )
        .bind(today)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
