//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the debt recovery
//! system on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the
//! domain layer. The payment repository is the transactional driver for
//! the reconciliation engine: every settlement-state-changing operation
//! locks the bill row, re-reads the current payment set, runs the domain
//! engine, and writes the bill and payment together.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PaymentRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/recovery")).await?;
//! let payments = PaymentRepository::new(pool);
//! let (payment, event) = payments.record_payment(bill_id, request, today, now).await?;
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::{DatabaseError, RepositoryError};
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{
    AgentRepository, BillRepository, DailyTotals, PaymentFilter, PaymentRepository,
    RouteRepository,
};
