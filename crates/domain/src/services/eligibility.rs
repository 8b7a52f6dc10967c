//! Eligibility evaluator.
//!
//! Pure, side-effect-free predicates over snapshots of current state.
//! All thresholds come from an explicit [`EligibilityConfig`] passed in by
//! the caller; there is no ambient configuration.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DomainError;

/// Booking thresholds and gates, sourced from deployment configuration.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    /// Minimum booked weight a member must keep for the year.
    pub min_signup_weight: f64,
    /// Require verified phone and email before self-service enlistment.
    pub require_verified_contact: bool,
    /// Global booking freeze: nothing is bookable after this date.
    pub latest_bookable_date: Option<NaiveDate>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_signup_weight: 5.0,
            require_verified_contact: true,
            latest_bookable_date: None,
        }
    }
}

/// Snapshot of the member evaluating eligibility.
#[derive(Debug, Clone)]
pub struct MemberStanding {
    pub member_id: Uuid,
    pub phone_verified: bool,
    pub email_verified: bool,
    pub signup_bias: i32,
}

/// Snapshot of one activity held by (or considered for) a member.
#[derive(Debug, Clone)]
pub struct AssignmentSnapshot {
    pub activity_id: Uuid,
    pub event_id: Uuid,
    /// Year of the owning event's start date.
    pub event_year: i32,
    pub weight: f64,
    pub completed: Option<bool>,
    /// A delist request with `approved = null` exists for this activity.
    pub pending_delist: bool,
}

/// Snapshot of the activity being booked.
#[derive(Debug, Clone)]
pub struct ActivitySnapshot {
    pub activity_id: Uuid,
    pub event_id: Uuid,
    pub event_end_date: NaiveDate,
    pub earliest_bookable_date: Option<NaiveDate>,
    pub cancelled: bool,
    pub assigned_member_id: Option<Uuid>,
    pub has_pending_delist: bool,
    pub weight: f64,
}

/// An activity may receive an assignment only while this holds: the owning
/// event has not ended, the activity is not cancelled, any
/// `earliest_bookable_date` has passed, and any global booking freeze has
/// not.
pub fn is_bookable(config: &EligibilityConfig, activity: &ActivitySnapshot, today: NaiveDate) -> bool {
    if activity.cancelled {
        return false;
    }
    if activity.event_end_date < today {
        return false;
    }
    if let Some(earliest) = activity.earliest_bookable_date {
        if today < earliest {
            return false;
        }
    }
    if let Some(latest) = config.latest_bookable_date {
        if today > latest {
            return false;
        }
    }
    true
}

/// Quota-relevant booked weight for a year: weights of the member's (or
/// proxy-held) assignments in events starting that year, excluding any
/// activity with a pending delist request, plus the member's signup bias.
pub fn booked_weight(
    member: &MemberStanding,
    assignments: &[AssignmentSnapshot],
    year: i32,
) -> f64 {
    let sum: f64 = assignments
        .iter()
        .filter(|a| a.event_year == year && !a.pending_delist)
        .map(|a| a.weight)
        .sum();
    sum + f64::from(member.signup_bias)
}

/// Weight of staff-confirmed completed assignments in a year.
pub fn completed_weight(assignments: &[AssignmentSnapshot], year: i32) -> f64 {
    assignments
        .iter()
        .filter(|a| a.event_year == year && a.completed == Some(true))
        .map(|a| a.weight)
        .sum()
}

/// True once the member's booked weight meets the yearly threshold.
pub fn meets_minimum_signups(
    config: &EligibilityConfig,
    member: &MemberStanding,
    assignments: &[AssignmentSnapshot],
    year: i32,
) -> bool {
    booked_weight(member, assignments, year) >= config.min_signup_weight
}

/// Checks whether a member may enlist on an activity right now.
///
/// Refusals are rule violations with a caller-facing reason; the
/// `current_holder` name is included when the slot is taken without a
/// pending delist request.
pub fn can_enlist(
    config: &EligibilityConfig,
    member: &MemberStanding,
    assignments: &[AssignmentSnapshot],
    activity: &ActivitySnapshot,
    current_holder: Option<&str>,
    today: NaiveDate,
) -> Result<(), DomainError> {
    if activity.assigned_member_id == Some(member.member_id) {
        // Idempotent re-enlist; the booking engine turns this into a no-op.
        return Ok(());
    }

    if config.require_verified_contact && !(member.phone_verified && member.email_verified) {
        return Err(DomainError::rule(
            "Phone and email must be verified before booking",
        ));
    }

    if activity.assigned_member_id.is_some() && !activity.has_pending_delist {
        let holder = current_holder.unwrap_or("another member");
        return Err(DomainError::rule(format!(
            "Task is already booked by {holder}"
        )));
    }

    if !is_bookable(config, activity, today) {
        return Err(DomainError::rule("Activity is not bookable"));
    }

    let double_booked = assignments
        .iter()
        .any(|a| a.event_id == activity.event_id && a.activity_id != activity.activity_id);
    if double_booked {
        return Err(DomainError::rule(
            "Already booked on another task in this event",
        ));
    }

    Ok(())
}

/// Checks whether the member may file a delist request for `activity_id`.
///
/// The member must currently hold the assignment, and releasing it on top
/// of every other pending delist request must not drop the year's booked
/// weight below the minimum.
pub fn can_file_delist(
    config: &EligibilityConfig,
    member: &MemberStanding,
    assignments: &[AssignmentSnapshot],
    activity_id: Uuid,
    year: i32,
) -> Result<(), DomainError> {
    let target = assignments
        .iter()
        .find(|a| a.activity_id == activity_id)
        .ok_or_else(|| DomainError::rule("Not assigned to this activity"))?;

    // booked_weight already excludes other pending requests; a re-file of an
    // already-pending request changes nothing.
    let mut remaining = booked_weight(member, assignments, year);
    if !target.pending_delist && target.event_year == year {
        remaining -= target.weight;
    }

    if remaining < config.min_signup_weight {
        return Err(DomainError::rule(format!(
            "Delisting would drop booked weight below the minimum of {}",
            config.min_signup_weight
        )));
    }

    Ok(())
}
