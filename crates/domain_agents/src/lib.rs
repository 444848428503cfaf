//! Agents Domain - collection-agent identity and capabilities
//!
//! Bills are assigned to debt recovery agents (DRAs) who record payments
//! collected on their routes. Administrators additionally settle cheque
//! and electronic instruments. The role carried by an [`Agent`] is the
//! capability value that restricted reconciliation operations check.

pub mod agent;

pub use agent::{Agent, AgentRole};
