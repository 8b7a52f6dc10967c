//! Domain services.
//!
//! Pure business logic: the eligibility evaluator, the booking decision
//! state machine, and the notification dispatcher interface. Nothing in
//! here touches the database; the API layer feeds these services snapshots
//! and executes the outcomes transactionally.

pub mod booking;
pub mod eligibility;
pub mod notification;
