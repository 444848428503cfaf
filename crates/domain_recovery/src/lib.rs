//! Recovery Domain - outstanding bills, payments, and balance reconciliation
//!
//! This crate tracks invoices ("bills") issued against outlets on sales
//! routes and reconciles their outstanding balances as payments are
//! recorded, cleared, bounced, or deleted.
//!
//! # Settlement model
//!
//! A payment reduces a bill's balance only while it is *settled*:
//!
//! - cash and UPI settle the moment they are recorded
//! - cheque and electronic payments carry a clearance sub-state and count
//!   only while cleared; a bounced instrument contributes nothing
//!
//! The invariant maintained by the [`ReconciliationEngine`]:
//!
//! ```text
//! remaining_amount == actual_amount - Σ(amount of settled payments)
//! ```
//!
//! recomputed in full after every settlement-state-changing operation. A
//! bill whose balance reaches zero clears, freezing its overdue count; a
//! cleared bill whose settling instrument later bounces reopens.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_recovery::{ReconciliationEngine, PaymentRequest, PaymentMethod};
//!
//! let engine = ReconciliationEngine::new();
//! let request = PaymentRequest::new(agent_id, PaymentMethod::Cash, amount);
//! let (payment, event) = engine.record_payment(&mut bill, &payments, request, today, now)?;
//! ```

pub mod bill;
pub mod error;
pub mod events;
pub mod overdue;
pub mod payment;
pub mod reconcile;
pub mod route;

pub use bill::{Bill, BillStatus};
pub use error::RecoveryError;
pub use events::BillEvent;
pub use overdue::overdue_days;
pub use payment::{ClearanceStatus, Payment, PaymentMethod};
pub use reconcile::{PaymentRequest, ReconciliationEngine};
pub use route::{Outlet, Route};
