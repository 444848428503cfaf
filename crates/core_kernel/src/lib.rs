//! Core Kernel - Foundational types and utilities for the debt recovery system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Calendar/clock types for local-date aging
//! - Common identifiers and value objects

pub mod error;
pub mod identifiers;
pub mod money;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{AgentId, BillId, OutletId, PaymentId, RouteId};
pub use money::{Currency, Money, MoneyError};
pub use temporal::{Clock, FixedClock, SystemClock, Timezone};
