//! Repository implementations.

pub mod activity;
pub mod delist_request;
pub mod event;
pub mod member;
pub mod report;

pub use activity::ActivityRepository;
pub use delist_request::DelistRequestRepository;
pub use event::EventRepository;
pub use member::MemberRepository;
pub use report::{ReadinessFilter, ReportRepository};
