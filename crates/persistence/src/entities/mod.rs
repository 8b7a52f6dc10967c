//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod activity;
pub mod delist_request;
pub mod event;
pub mod member;
pub mod report;

pub use activity::{ActivityEntity, ActivityForBookingEntity, ActivityWithDetailsEntity};
pub use delist_request::{DelistRequestEntity, DelistRequestWithDetailsEntity};
pub use event::{EventEntity, EventTypeEntity, EventWithCountsEntity};
pub use member::{AssignmentRowEntity, MemberBriefEntity, MemberEntity};
pub use report::{CompletionRowEntity, DoubleBookingRowEntity, MemberReadinessRowEntity, ReminderRowEntity};
