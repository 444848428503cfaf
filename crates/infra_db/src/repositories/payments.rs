//! Payment repository implementation
//!
//! This is the transactional driver for the reconciliation engine. Every
//! operation that can change a bill's settled total runs inside a single
//! database transaction that locks the bill row and re-reads the current
//! payment set immediately before writing the new balance, so two
//! settlements against the same bill can never both compute from a stale
//! read.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{AgentId, BillId, Currency, Money, PaymentId, Timezone};
use domain_agents::AgentRole;
use domain_recovery::{
    Bill, BillEvent, ClearanceStatus, Payment, PaymentMethod, PaymentRequest,
    ReconciliationEngine,
};

use crate::error::{DatabaseError, RepositoryError};
use crate::repositories::bills::{BillRow, SELECT_BILL};

/// Database row for a payment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub bill_id: Uuid,
    pub agent_id: Uuid,
    pub method: String,
    pub currency: String,
    pub amount: Decimal,
    pub clearance: Option<String>,
    pub cheque_number: Option<String>,
    pub cheque_kind: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub transaction_number: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRow {
    /// Maps the row into the domain record
    pub fn into_domain(self) -> Result<Payment, DatabaseError> {
        let method = PaymentMethod::from_code(&self.method)
            .ok_or_else(|| DatabaseError::bad_column("method", &self.method))?;
        let currency = Currency::from_code(&self.currency)
            .ok_or_else(|| DatabaseError::bad_column("currency", &self.currency))?;
        let clearance = match &self.clearance {
            Some(code) => Some(
                ClearanceStatus::from_code(code)
                    .ok_or_else(|| DatabaseError::bad_column("clearance", code))?,
            ),
            None => None,
        };

        Ok(Payment {
            id: self.payment_id.into(),
            bill_id: self.bill_id.into(),
            agent_id: self.agent_id.into(),
            method,
            amount: Money::new(self.amount, currency),
            clearance,
            cheque_number: self.cheque_number,
            cheque_kind: self.cheque_kind,
            cheque_date: self.cheque_date,
            transaction_number: self.transaction_number,
            created_at: self.created_at,
        })
    }
}

const SELECT_PAYMENT: &str = r#"
    SELECT p.payment_id, p.bill_id, p.agent_id, p.method, p.currency, p.amount,
           p.clearance, p.cheque_number, p.cheque_kind, p.cheque_date,
           p.transaction_number, p.created_at
    FROM payments p
"#;

/// Filters for payment listings
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Invoice-number fragment (matched against the bill)
    pub invoice_number: Option<String>,
    /// Agent username fragment
    pub username: Option<String>,
    /// Inclusive lower bound on the payment instant
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the payment instant
    pub to: Option<DateTime<Utc>>,
}

/// Collection totals for one local calendar day
#[derive(Debug, Clone)]
pub struct DailyTotals {
    pub date: NaiveDate,
    /// Cash collected on the day
    pub cash_total: Money,
    /// UPI collected on the day
    pub upi_total: Money,
    /// Cheque/electronic amounts whose clearance was stamped on the day
    pub instrument_total: Money,
}

/// Repository for payments and the reconciliation operations over them
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
    engine: ReconciliationEngine,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            engine: ReconciliationEngine::new(),
        }
    }

    /// Records a payment against a bill
    ///
    /// Runs the engine inside a transaction holding the bill row lock;
    /// the payment and the recomputed bill are written together or not at
    /// all. Returns the stored payment and the status transition, if any.
    pub async fn record_payment(
        &self,
        bill_id: BillId,
        request: PaymentRequest,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(Payment, Option<BillEvent>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut bill = self.lock_bill(&mut tx, bill_id).await?;
        let payments = self.bill_payments(&mut tx, bill_id).await?;

        let (payment, event) =
            self.engine
                .record_payment(&mut bill, &payments, request, today, now)?;

        self.insert_payment(&mut tx, &payment).await?;
        self.write_bill(&mut tx, &bill).await?;
        tx.commit().await?;

        Ok((payment, event))
    }

    /// Updates the clearance sub-state of a cheque or electronic payment
    ///
    /// Admin-only. The full recomputation runs on the payment set re-read
    /// under the bill lock. Returns the updated payment and the status
    /// transition, if any.
    pub async fn update_clearance(
        &self,
        role: AgentRole,
        payment_id: PaymentId,
        target: ClearanceStatus,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(Payment, Option<BillEvent>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let bill_id = self.bill_of_payment(&mut tx, payment_id).await?;
        let mut bill = self.lock_bill(&mut tx, bill_id).await?;
        let mut payments = self.bill_payments(&mut tx, bill_id).await?;

        let event = self.engine.update_clearance(
            role,
            &mut bill,
            &mut payments,
            payment_id,
            target,
            today,
            now,
        )?;

        let updated = payments
            .iter()
            .find(|p| p.id == payment_id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))?;

        sqlx::query(
            r#"
            UPDATE payments
            SET clearance = $2, cheque_date = $3
            WHERE payment_id = $1
            "#,
        )
        .bind(updated.id.as_uuid())
        .bind(updated.clearance.map(|c| c.code()))
        .bind(updated.cheque_date)
        .execute(&mut *tx)
        .await?;

        self.write_bill(&mut tx, &bill).await?;
        tx.commit().await?;

        Ok((updated, event))
    }

    /// Hard-deletes a payment, recomputing the bill's balance
    ///
    /// Admin-only. A deleted settled payment stops counting immediately;
    /// the deletion and the recomputed bill commit atomically.
    pub async fn delete_payment(
        &self,
        role: AgentRole,
        payment_id: PaymentId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<BillEvent>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let bill_id = self.bill_of_payment(&mut tx, payment_id).await?;
        let mut bill = self.lock_bill(&mut tx, bill_id).await?;
        let mut payments = self.bill_payments(&mut tx, bill_id).await?;

        let event =
            self.engine
                .delete_payment(role, &mut bill, &mut payments, payment_id, today, now)?;

        sqlx::query("DELETE FROM payments WHERE payment_id = $1")
            .bind(payment_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        self.write_bill(&mut tx, &bill).await?;
        tx.commit().await?;

        Ok(event)
    }

    /// Retrieves a payment by id
    pub async fn find_by_id(&self, payment_id: PaymentId) -> Result<Payment, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "{} WHERE p.payment_id = $1",
            SELECT_PAYMENT
        ))
        .bind(payment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))?;

        row.into_domain()
    }

    /// Lists payments for a bill, newest first, optionally restricted to
    /// one agent's collections
    pub async fn list_for_bill(
        &self,
        bill_id: BillId,
        agent_id: Option<AgentId>,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"{}
            WHERE p.bill_id = $1
              AND ($2::uuid IS NULL OR p.agent_id = $2)
            ORDER BY p.created_at DESC
            "#,
            SELECT_PAYMENT
        ))
        .bind(bill_id.as_uuid())
        .bind(agent_id.map(|id| *id.as_uuid()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }

    /// Lists settled payments, newest first
    ///
    /// Pending and bounced instruments are excluded: only collections that
    /// currently count toward a balance appear here.
    pub async fn list_settled(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"{}
            JOIN bills b ON b.bill_id = p.bill_id
            JOIN agents a ON a.agent_id = p.agent_id
            WHERE (p.clearance IS NULL OR p.clearance = 'cleared')
              AND ($1::text IS NULL OR b.invoice_number ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR a.username ILIKE '%' || $2 || '%')
              AND ($3::timestamptz IS NULL OR p.created_at >= $3)
              AND ($4::timestamptz IS NULL OR p.created_at < $4)
            ORDER BY p.created_at DESC
            "#,
            SELECT_PAYMENT
        ))
        .bind(filter.invoice_number.as_deref())
        .bind(filter.username.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }

    /// Lists cheque and electronic payments, most recent instrument first
    ///
    /// With `expired_only`, narrows to instruments still pending past
    /// their instrument date. Admin callers pass no agent to see all.
    pub async fn instrument_history(
        &self,
        agent_id: Option<AgentId>,
        invoice_number: Option<&str>,
        expired_only: bool,
        today: NaiveDate,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"{}
            JOIN bills b ON b.bill_id = p.bill_id
            WHERE p.method IN ('cheque', 'electronic')
              AND ($1::uuid IS NULL OR p.agent_id = $1)
              AND ($2::text IS NULL OR b.invoice_number ILIKE '%' || $2 || '%')
              AND (NOT $3 OR (p.clearance = 'pending' AND p.cheque_date < $4))
            ORDER BY p.cheque_date DESC NULLS LAST, p.created_at DESC
            "#,
            SELECT_PAYMENT
        ))
        .bind(agent_id.map(|id| *id.as_uuid()))
        .bind(invoice_number)
        .bind(expired_only)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }

    /// Sums the day's collections in the default currency
    ///
    /// Cash and UPI are keyed on the payment instant falling inside the
    /// local calendar day; instruments are keyed on the clearance date
    /// stamped when they cleared.
    pub async fn daily_totals(
        &self,
        day: NaiveDate,
        tz: &Timezone,
    ) -> Result<DailyTotals, DatabaseError> {
        let start = tz
            .start_of_day(day)
            .ok_or_else(|| DatabaseError::QueryFailed(format!("no local midnight for {}", day)))?;
        let end = tz.start_of_next_day(day).ok_or_else(|| {
            DatabaseError::QueryFailed(format!("no local midnight after {}", day))
        })?;

        let cash: Decimal = self.method_total_in_window("cash", start, end).await?;
        let upi: Decimal = self.method_total_in_window("upi", start, end).await?;

        let instruments: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE method IN ('cheque', 'electronic')
              AND clearance = 'cleared'
              AND cheque_date = $1
            "#,
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        let currency = Currency::default();
        Ok(DailyTotals {
            date: day,
            cash_total: Money::new(cash, currency),
            upi_total: Money::new(upi, currency),
            instrument_total: Money::new(instruments, currency),
        })
    }

    async fn method_total_in_window(
        &self,
        method: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, DatabaseError> {
        let total = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE method = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(method)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Resolves the bill a payment belongs to
    async fn bill_of_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment_id: PaymentId,
    ) -> Result<BillId, RepositoryError> {
        let bill_id: Uuid = sqlx::query_scalar("SELECT bill_id FROM payments WHERE payment_id = $1")
            .bind(payment_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))?;

        Ok(bill_id.into())
    }

    /// Loads a bill under a row lock held until the transaction ends
    async fn lock_bill(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bill_id: BillId,
    ) -> Result<Bill, RepositoryError> {
        let row = sqlx::query_as::<_, BillRow>(&format!(
            "{} WHERE bill_id = $1 FOR UPDATE",
            SELECT_BILL
        ))
        .bind(bill_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;

        Ok(row.into_domain()?)
    }

    /// Re-reads the bill's full payment set inside the transaction
    async fn bill_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bill_id: BillId,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "{} WHERE p.bill_id = $1 ORDER BY p.created_at",
            SELECT_PAYMENT
        ))
        .bind(bill_id.as_uuid())
        .fetch_all(&mut **tx)
        .await?;

        let payments = rows
            .into_iter()
            .map(PaymentRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(payments)
    }

    async fn insert_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &Payment,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, bill_id, agent_id, method, currency, amount,
                clearance, cheque_number, cheque_kind, cheque_date,
                transaction_number, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.bill_id.as_uuid())
        .bind(payment.agent_id.as_uuid())
        .bind(payment.method.code())
        .bind(payment.amount.currency().code())
        .bind(payment.amount.amount())
        .bind(payment.clearance.map(|c| c.code()))
        .bind(payment.cheque_number.as_deref())
        .bind(payment.cheque_kind.as_deref())
        .bind(payment.cheque_date)
        .bind(payment.transaction_number)
        .bind(payment.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Writes the bill's derived state back inside the transaction
    async fn write_bill(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bill: &Bill,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE bills
            SET remaining_amount = $2, overdue_days = $3, status = $4,
                cleared_at = $5, updated_at = $6
            WHERE bill_id = $1
            "#,
        )
        .bind(bill.id.as_uuid())
        .bind(bill.remaining_amount.amount())
        .bind(bill.overdue_days as i32)
        .bind(bill.status.code())
        .bind(bill.cleared_at)
        .bind(bill.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
