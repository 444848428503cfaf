//! Repository implementations

pub mod agents;
pub mod bills;
pub mod payments;
pub mod routes;

pub use agents::AgentRepository;
pub use bills::BillRepository;
pub use payments::{DailyTotals, PaymentFilter, PaymentRepository};
pub use routes::RouteRepository;
