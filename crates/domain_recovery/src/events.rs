//! Domain events for bill status transitions
//!
//! Reconciliation returns the transition it caused, if any, so callers
//! can react (audit, notification). This is a direct return value, not an
//! event bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, Money};

/// A status transition produced by reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BillEvent {
    /// The bill's balance reached zero and it transitioned to Cleared
    BillCleared {
        bill_id: BillId,
        /// The (first) clearance stamp on the bill
        cleared_at: DateTime<Utc>,
        /// Overdue count frozen at the moment of clearance
        overdue_days: u32,
        timestamp: DateTime<Utc>,
    },

    /// A settled instrument stopped counting and the bill reopened
    BillReopened {
        bill_id: BillId,
        /// Outstanding balance after the reversal
        outstanding: Money,
        timestamp: DateTime<Utc>,
    },
}

impl BillEvent {
    /// The bill this event concerns
    pub fn bill_id(&self) -> BillId {
        match self {
            BillEvent::BillCleared { bill_id, .. } => *bill_id,
            BillEvent::BillReopened { bill_id, .. } => *bill_id,
        }
    }
}
