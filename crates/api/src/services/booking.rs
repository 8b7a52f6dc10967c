//! Booking engine orchestration.
//!
//! Wires the pure domain planners to the repositories and the notifier.
//! Every mutation is executed as a single conditional write (or one
//! transaction) so concurrent callers serialize in the database;
//! notifications are dispatched on a spawned task after the write commits.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::activity::{DelistResponse, EnlistResponse};
use domain::services::booking::{
    plan_enlist, plan_file_delist, plan_resolution, EnlistPlan, ExistingRequest, FileDelistPlan,
    ResolutionPlan,
};
use domain::services::eligibility::{
    ActivitySnapshot, AssignmentSnapshot, EligibilityConfig, MemberStanding,
};
use domain::services::notification::{
    ActivitySummary, NotificationEvent, Notifier, Recipient,
};
use domain::DomainError;
use persistence::entities::{ActivityForBookingEntity, AssignmentRowEntity, MemberEntity};
use persistence::repositories::{ActivityRepository, DelistRequestRepository, MemberRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::middleware::metrics::{record_delist_resolution, record_enlist};

/// Orchestrates enlist/delist mutations over the repositories.
pub struct BookingService {
    pool: PgPool,
    eligibility: EligibilityConfig,
    notifier: Arc<dyn Notifier>,
}

fn standing(member: &MemberEntity) -> MemberStanding {
    MemberStanding {
        member_id: member.id,
        phone_verified: member.phone_verified,
        email_verified: member.email_verified,
        signup_bias: member.signup_bias,
    }
}

fn assignment_snapshots(rows: &[AssignmentRowEntity]) -> Vec<AssignmentSnapshot> {
    rows.iter()
        .map(|r| AssignmentSnapshot {
            activity_id: r.activity_id,
            event_id: r.event_id,
            event_year: r.event_year,
            weight: r.weight,
            completed: r.completed,
            pending_delist: r.pending_delist,
        })
        .collect()
}

// Quota accounting keys on the year of the event's start date, matching
// assignments_for_year and the readiness report. An event spanning New Year
// counts for the year it starts in.
fn quota_year(a: &ActivityForBookingEntity) -> i32 {
    a.event_start_date.year()
}

fn activity_snapshot(a: &ActivityForBookingEntity) -> ActivitySnapshot {
    ActivitySnapshot {
        activity_id: a.id,
        event_id: a.event_id,
        event_end_date: a.event_end_date,
        earliest_bookable_date: a.earliest_bookable_date,
        // A cancelled event makes all of its activities unbookable.
        cancelled: a.cancelled || a.event_cancelled,
        assigned_member_id: a.assigned_member_id,
        has_pending_delist: a.has_pending_delist,
        weight: a.weight,
    }
}

fn recipient(member: &MemberEntity) -> Recipient {
    Recipient {
        member_id: member.id,
        fullname: member.fullname.clone(),
        email: member.email.clone(),
        phone_number: member.phone_number.clone(),
    }
}

fn activity_summary(a: &ActivityForBookingEntity) -> ActivitySummary {
    ActivitySummary {
        activity_id: a.id,
        name: a.name.clone(),
        date: a.date,
        start_time: a.start_time,
        end_time: a.end_time,
    }
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            eligibility: state.config.eligibility(),
            notifier: state.notifier.clone(),
        }
    }

    fn members(&self) -> MemberRepository {
        MemberRepository::new(self.pool.clone())
    }

    fn activities(&self) -> ActivityRepository {
        ActivityRepository::new(self.pool.clone())
    }

    fn delist_requests(&self) -> DelistRequestRepository {
        DelistRequestRepository::new(self.pool.clone())
    }

    /// Enlist the caller (or a proxy-held member via `as_member_id`) on an
    /// activity.
    pub async fn enlist(
        &self,
        caller: Caller,
        activity_id: Uuid,
        as_member_id: Option<Uuid>,
    ) -> Result<EnlistResponse, ApiError> {
        let activity_repo = self.activities();
        let member_repo = self.members();

        let activity = activity_repo
            .snapshot_for_booking(activity_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

        // Proxy booking: the booking counts for the held member, the
        // caller remains the assignee.
        let counted_member_id = match as_member_id {
            Some(target) if target != caller.member_id => {
                if !member_repo.holds_proxy_for(caller.member_id, target).await? {
                    return Err(ApiError::Forbidden(
                        "No proxy for the requested member".to_string(),
                    ));
                }
                target
            }
            _ => caller.member_id,
        };

        let member = member_repo
            .find_by_id(counted_member_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        let today = Utc::now().date_naive();
        let year = quota_year(&activity);
        let assignments = member_repo
            .assignments_for_year(counted_member_id, year)
            .await?;
        let pending_ids = self
            .delist_requests()
            .pending_ids_for_activity(activity_id)
            .await?;

        let snapshot = activity_snapshot(&activity);
        let plan = plan_enlist(
            &self.eligibility,
            &standing(&member),
            &assignment_snapshots(&assignments),
            &snapshot,
            activity.assigned_fullname.as_deref(),
            &pending_ids,
            today,
        )
        .map_err(|e| {
            record_enlist("refused");
            ApiError::from(e)
        })?;

        let for_proxy_id = (counted_member_id != caller.member_id).then_some(counted_member_id);

        let (updated, transferred) = match plan {
            EnlistPlan::AlreadyAssigned => {
                record_enlist("noop");
                return Ok(EnlistResponse {
                    activity_id,
                    message: "Already booked on this activity".to_string(),
                    transferred: false,
                });
            }
            EnlistPlan::Assign => (
                activity_repo
                    .assign_if_open(activity_id, caller.member_id, for_proxy_id)
                    .await?,
                false,
            ),
            EnlistPlan::Transfer { stale_request_ids } => (
                activity_repo
                    .transfer(
                        activity_id,
                        activity.assigned_member_id,
                        caller.member_id,
                        for_proxy_id,
                        &stale_request_ids,
                    )
                    .await?,
                true,
            ),
        };

        let Some(_) = updated else {
            // Lost the race: re-read and name the winner.
            record_enlist("lost_race");
            let winner = activity_repo
                .snapshot_for_booking(activity_id)
                .await?
                .and_then(|a| a.assigned_fullname)
                .unwrap_or_else(|| "another member".to_string());
            return Err(DomainError::rule(format!("Task is already booked by {winner}")).into());
        };

        record_enlist(if transferred { "transferred" } else { "assigned" });
        tracing::info!(
            activity_id = %activity_id,
            member_id = %caller.member_id,
            counted_member_id = %counted_member_id,
            transferred = transferred,
            "Enlisted on activity"
        );

        Ok(EnlistResponse {
            activity_id,
            message: if transferred {
                "Booked (took over a slot pending delist)".to_string()
            } else {
                "Booked".to_string()
            },
            transferred,
        })
    }

    /// Staff hard delist: release the slot regardless of requests.
    pub async fn hard_delist(
        &self,
        caller: Caller,
        activity_id: Uuid,
    ) -> Result<DelistResponse, ApiError> {
        caller.require_staff()?;

        let released = self
            .activities()
            .release(activity_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

        tracing::info!(
            activity_id = %released.id,
            staff_id = %caller.member_id,
            "Activity released by staff"
        );

        Ok(DelistResponse {
            activity_id,
            message: "Activity released".to_string(),
        })
    }

    /// File (or re-file) a delist request for an activity the caller holds.
    pub async fn file_delist_request(
        &self,
        caller: Caller,
        activity_id: Uuid,
        reason: &str,
    ) -> Result<Uuid, ApiError> {
        let member_repo = self.members();
        let request_repo = self.delist_requests();

        let activity = self
            .activities()
            .snapshot_for_booking(activity_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

        let member = member_repo
            .find_by_id(caller.member_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        let year = quota_year(&activity);
        let assignments = member_repo
            .assignments_for_year(caller.member_id, year)
            .await?;
        let existing = request_repo
            .find_for_member_activity(caller.member_id, activity_id)
            .await?
            .map(|e| ExistingRequest {
                request_id: e.id,
                approved: e.approved,
            });

        let plan = plan_file_delist(
            &self.eligibility,
            &standing(&member),
            &assignment_snapshots(&assignments),
            activity_id,
            existing.as_ref(),
            year,
        )?;

        let request_id = match plan {
            FileDelistPlan::Create => {
                request_repo
                    .create(caller.member_id, activity_id, reason)
                    .await?
                    .id
            }
            FileDelistPlan::Replace {
                existing_request_id,
            } => request_repo
                .replace_reason(existing_request_id, reason)
                .await?
                .ok_or(DomainError::AlreadyResolved)?
                .id,
        };

        tracing::info!(
            activity_id = %activity_id,
            member_id = %caller.member_id,
            request_id = %request_id,
            "Delist request filed"
        );

        Ok(request_id)
    }

    /// Resolve a pending delist request (staff only, one-shot).
    pub async fn resolve_delist_request(
        &self,
        caller: Caller,
        request_id: Uuid,
        approved: bool,
        reject_reason: Option<&str>,
    ) -> Result<(), ApiError> {
        caller.require_staff()?;

        let request_repo = self.delist_requests();
        let activity_repo = self.activities();

        let request = request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Delist request not found".to_string()))?;

        let activity = activity_repo
            .snapshot_for_booking(request.activity_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

        let plan = plan_resolution(
            request.approved,
            request.member_id,
            activity.assigned_member_id,
            approved,
        )?;

        // The conditional update is the one-shot gate; a concurrent
        // resolver loses here even after the plan said pending.
        let resolved = request_repo
            .resolve(request_id, approved, caller.member_id, reject_reason)
            .await?
            .ok_or(DomainError::AlreadyResolved)?;

        if let ResolutionPlan::Approve {
            release_assignment: true,
        } = plan
        {
            activity_repo
                .release_if_held_by(request.activity_id, request.member_id)
                .await?;
        }

        record_delist_resolution(approved);
        tracing::info!(
            request_id = %request_id,
            activity_id = %request.activity_id,
            staff_id = %caller.member_id,
            approved = approved,
            "Delist request resolved"
        );

        // Notify after commit; delivery failures are the notifier's to log.
        if let Some(member) = self.members().find_by_id(resolved.member_id).await? {
            let event = if approved {
                NotificationEvent::DelistApproved {
                    recipient: recipient(&member),
                    activity: activity_summary(&activity),
                }
            } else {
                NotificationEvent::DelistRejected {
                    recipient: recipient(&member),
                    activity: activity_summary(&activity),
                    reject_reason: reject_reason.unwrap_or_default().to_string(),
                }
            };
            let notifier = self.notifier.clone();
            tokio::spawn(async move {
                notifier.notify(event).await;
            });
        }

        Ok(())
    }
}
