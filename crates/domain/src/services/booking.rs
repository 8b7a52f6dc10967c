//! Booking decision state machine.
//!
//! States of an (activity, member) pair: OPEN -> ASSIGNED ->
//! DELIST_PENDING -> back to OPEN (approved), back to ASSIGNED (rejected),
//! or ASSIGNED to a different member (transfer while a request is pending).
//!
//! The planners here are pure: they take snapshots and return an explicit
//! plan the API layer executes inside a storage transaction. Side effects
//! (slot writes, notifications) never happen in this module.

use uuid::Uuid;

use crate::error::DomainError;
use crate::services::eligibility::{
    can_enlist, can_file_delist, ActivitySnapshot, AssignmentSnapshot, EligibilityConfig,
    MemberStanding,
};
use chrono::NaiveDate;

/// Outcome of planning an enlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnlistPlan {
    /// The caller already holds the slot; succeed without writing.
    AlreadyAssigned,
    /// Claim the open slot.
    Assign,
    /// Take over a slot whose holder has a pending delist request. The
    /// listed stale requests must be deleted in the same transaction.
    Transfer { stale_request_ids: Vec<Uuid> },
}

/// Plans an enlist attempt.
///
/// The executor must re-validate the slot with a conditional write
/// (`assigned_member_id IS NULL`, or equal to the outgoing holder for a
/// transfer) so that concurrent winners serialize.
pub fn plan_enlist(
    config: &EligibilityConfig,
    member: &MemberStanding,
    assignments: &[AssignmentSnapshot],
    activity: &ActivitySnapshot,
    current_holder: Option<&str>,
    pending_request_ids: &[Uuid],
    today: NaiveDate,
) -> Result<EnlistPlan, DomainError> {
    can_enlist(config, member, assignments, activity, current_holder, today)?;

    if activity.assigned_member_id == Some(member.member_id) {
        return Ok(EnlistPlan::AlreadyAssigned);
    }

    if activity.assigned_member_id.is_some() {
        return Ok(EnlistPlan::Transfer {
            stale_request_ids: pending_request_ids.to_vec(),
        });
    }

    // An open slot can still carry stale pending requests from a previous
    // holder; claiming it clears them too.
    if !pending_request_ids.is_empty() {
        return Ok(EnlistPlan::Transfer {
            stale_request_ids: pending_request_ids.to_vec(),
        });
    }

    Ok(EnlistPlan::Assign)
}

/// Outcome of planning a delist request creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDelistPlan {
    /// Create a fresh pending request.
    Create,
    /// A pending request by this member already exists; replace its reason.
    Replace { existing_request_id: Uuid },
}

/// Snapshot of an existing delist request for the (member, activity) pair.
#[derive(Debug, Clone)]
pub struct ExistingRequest {
    pub request_id: Uuid,
    pub approved: Option<bool>,
}

/// Plans filing a delist request.
pub fn plan_file_delist(
    config: &EligibilityConfig,
    member: &MemberStanding,
    assignments: &[AssignmentSnapshot],
    activity_id: Uuid,
    existing: Option<&ExistingRequest>,
    year: i32,
) -> Result<FileDelistPlan, DomainError> {
    if let Some(existing) = existing {
        match existing.approved {
            // Re-filing replaces the pending request, never duplicates it.
            None => {
                return Ok(FileDelistPlan::Replace {
                    existing_request_id: existing.request_id,
                })
            }
            Some(_) => {
                return Err(DomainError::rule(
                    "A resolved delist request already exists for this activity",
                ))
            }
        }
    }

    can_file_delist(config, member, assignments, activity_id, year)?;

    Ok(FileDelistPlan::Create)
}

/// Outcome of planning a staff resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    /// Mark approved; release the slot only if the requester still holds it.
    Approve { release_assignment: bool },
    /// Mark rejected; the assignment is untouched.
    Reject,
}

/// Plans resolving a delist request. Resolution is one-shot.
pub fn plan_resolution(
    request_approved: Option<bool>,
    request_member_id: Uuid,
    activity_assigned_to: Option<Uuid>,
    decision: bool,
) -> Result<ResolutionPlan, DomainError> {
    if request_approved.is_some() {
        return Err(DomainError::AlreadyResolved);
    }

    if decision {
        Ok(ResolutionPlan::Approve {
            release_assignment: activity_assigned_to == Some(request_member_id),
        })
    } else {
        Ok(ResolutionPlan::Reject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> EligibilityConfig {
        EligibilityConfig {
            min_signup_weight: 5.0,
            require_verified_contact: false,
            latest_bookable_date: None,
        }
    }

    fn member() -> MemberStanding {
        MemberStanding {
            member_id: Uuid::new_v4(),
            phone_verified: true,
            email_verified: true,
            signup_bias: 0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_activity() -> ActivitySnapshot {
        ActivitySnapshot {
            activity_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            event_end_date: day(2026, 9, 1),
            earliest_bookable_date: None,
            cancelled: false,
            assigned_member_id: None,
            has_pending_delist: false,
            weight: 1.0,
        }
    }

    #[test]
    fn test_plan_enlist_open_slot() {
        let plan = plan_enlist(
            &config(),
            &member(),
            &[],
            &open_activity(),
            None,
            &[],
            day(2026, 8, 25),
        )
        .unwrap();
        assert_eq!(plan, EnlistPlan::Assign);
    }

    #[test]
    fn test_plan_enlist_idempotent() {
        let m = member();
        let mut activity = open_activity();
        activity.assigned_member_id = Some(m.member_id);
        let plan =
            plan_enlist(&config(), &m, &[], &activity, None, &[], day(2026, 8, 25)).unwrap();
        assert_eq!(plan, EnlistPlan::AlreadyAssigned);
    }

    #[test]
    fn test_plan_enlist_slot_taken() {
        let mut activity = open_activity();
        activity.assigned_member_id = Some(Uuid::new_v4());
        let err = plan_enlist(
            &config(),
            &member(),
            &[],
            &activity,
            Some("Bo Berg"),
            &[],
            day(2026, 8, 25),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Bo Berg"));
    }

    #[test]
    fn test_plan_enlist_transfer_deletes_stale_requests() {
        let mut activity = open_activity();
        activity.assigned_member_id = Some(Uuid::new_v4());
        activity.has_pending_delist = true;
        let stale = vec![Uuid::new_v4(), Uuid::new_v4()];
        let plan = plan_enlist(
            &config(),
            &member(),
            &[],
            &activity,
            None,
            &stale,
            day(2026, 8, 25),
        )
        .unwrap();
        assert_eq!(
            plan,
            EnlistPlan::Transfer {
                stale_request_ids: stale
            }
        );
    }

    #[test]
    fn test_plan_enlist_not_bookable_stays_open() {
        let mut activity = open_activity();
        activity.event_end_date = day(2026, 8, 1);
        let err = plan_enlist(
            &config(),
            &member(),
            &[],
            &activity,
            None,
            &[],
            day(2026, 8, 25),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::RuleViolation(_)));
    }

    #[test]
    fn test_plan_file_delist_replaces_pending() {
        let m = member();
        let target = AssignmentSnapshot {
            activity_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            event_year: 2026,
            weight: 1.0,
            completed: None,
            pending_delist: true,
        };
        let existing = ExistingRequest {
            request_id: Uuid::new_v4(),
            approved: None,
        };
        let plan = plan_file_delist(
            &config(),
            &m,
            std::slice::from_ref(&target),
            target.activity_id,
            Some(&existing),
            2026,
        )
        .unwrap();
        assert_eq!(
            plan,
            FileDelistPlan::Replace {
                existing_request_id: existing.request_id
            }
        );
    }

    #[test]
    fn test_plan_file_delist_refuses_resolved_duplicate() {
        let m = member();
        let existing = ExistingRequest {
            request_id: Uuid::new_v4(),
            approved: Some(false),
        };
        let err = plan_file_delist(&config(), &m, &[], Uuid::new_v4(), Some(&existing), 2026)
            .unwrap_err();
        assert!(matches!(err, DomainError::RuleViolation(_)));
    }

    #[test]
    fn test_plan_file_delist_quota() {
        // Holding 7 weight across two tasks; dropping 2 leaves 5 >= 5.
        let m = member();
        let target = AssignmentSnapshot {
            activity_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            event_year: 2026,
            weight: 2.0,
            completed: None,
            pending_delist: false,
        };
        let rest = AssignmentSnapshot {
            activity_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            event_year: 2026,
            weight: 5.0,
            completed: None,
            pending_delist: false,
        };
        let plan = plan_file_delist(
            &config(),
            &m,
            &[target.clone(), rest],
            target.activity_id,
            None,
            2026,
        )
        .unwrap();
        assert_eq!(plan, FileDelistPlan::Create);
    }

    #[test]
    fn test_plan_file_delist_not_assigned() {
        let err =
            plan_file_delist(&config(), &member(), &[], Uuid::new_v4(), None, 2026).unwrap_err();
        assert!(err.to_string().contains("Not assigned"));
    }

    #[test]
    fn test_plan_resolution_one_shot() {
        let member_id = Uuid::new_v4();
        assert!(matches!(
            plan_resolution(Some(true), member_id, None, true),
            Err(DomainError::AlreadyResolved)
        ));
        assert!(matches!(
            plan_resolution(Some(false), member_id, None, false),
            Err(DomainError::AlreadyResolved)
        ));
    }

    #[test]
    fn test_plan_resolution_approve_releases_current_holder() {
        let member_id = Uuid::new_v4();
        let plan = plan_resolution(None, member_id, Some(member_id), true).unwrap();
        assert_eq!(
            plan,
            ResolutionPlan::Approve {
                release_assignment: true
            }
        );
    }

    #[test]
    fn test_plan_resolution_approve_after_reassignment_is_noop_on_slot() {
        // The activity moved to someone else while the request was pending:
        // the request still becomes approved but the slot is untouched.
        let member_id = Uuid::new_v4();
        let plan = plan_resolution(None, member_id, Some(Uuid::new_v4()), true).unwrap();
        assert_eq!(
            plan,
            ResolutionPlan::Approve {
                release_assignment: false
            }
        );
    }

    #[test]
    fn test_plan_resolution_reject_keeps_assignment() {
        let member_id = Uuid::new_v4();
        let plan = plan_resolution(None, member_id, Some(member_id), false).unwrap();
        assert_eq!(plan, ResolutionPlan::Reject);
    }
}
