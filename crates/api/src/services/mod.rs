//! Application services: booking orchestration and outbound notifications.

pub mod booking;
pub mod notifier;

pub use booking::BookingService;
pub use notifier::build_notifier;
