//! Member endpoint handlers: registration, profile, contact verification
//! and the member's own activity list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use domain::models::activity::ActivityItem;
use domain::models::member::{
    ConfirmVerificationRequest, MemberBrief, MemberProfile, RegisterMemberRequest,
    UpdateMemberRequest, VerificationChannel, VerificationStatusResponse,
};
use domain::services::notification::{NotificationEvent, Recipient};
use persistence::entities::MemberEntity;
use persistence::repositories::{ActivityRepository, MemberRepository};
use shared::validation::normalize_phone;
use shared::verification::{check_code, generate_code, CodeCheck};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::routes::activities::activity_item;

fn member_profile(entity: MemberEntity, proxies: Vec<MemberBrief>) -> MemberProfile {
    MemberProfile {
        id: entity.id,
        user_id: entity.user_id,
        fullname: entity.fullname,
        email: entity.email,
        email_verified: entity.email_verified,
        phone_number: entity.phone_number,
        phone_verified: entity.phone_verified,
        membercard_number: entity.membercard_number,
        signup_bias: entity.signup_bias,
        proxies,
        created_at: entity.created_at,
    }
}

fn recipient(entity: &MemberEntity) -> Recipient {
    Recipient {
        member_id: entity.id,
        fullname: entity.fullname.clone(),
        email: entity.email.clone(),
        phone_number: entity.phone_number.clone(),
    }
}

async fn load_profile(
    repo: &MemberRepository,
    entity: MemberEntity,
) -> Result<MemberProfile, ApiError> {
    let proxies = repo
        .list_proxies(entity.id)
        .await?
        .into_iter()
        .map(|p| MemberBrief {
            id: p.id,
            fullname: p.fullname,
        })
        .collect();
    Ok(member_profile(entity, proxies))
}

/// POST /api/v1/members
///
/// Staff registers a member for an existing account; the new member gets a
/// welcome notification.
#[axum::debug_handler]
pub async fn register_member(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<RegisterMemberRequest>,
) -> Result<(StatusCode, Json<MemberProfile>), ApiError> {
    caller.require_staff()?;
    body.validate()?;

    let repo = MemberRepository::new(state.pool.clone());
    let phone = normalize_phone(&body.phone_number);
    let member = repo
        .create(body.user_id, body.fullname.trim(), &body.email, &phone)
        .await?;

    tracing::info!(member_id = %member.id, staff_id = %caller.member_id, "Member registered");

    let event = NotificationEvent::NewMemberRegistered {
        recipient: recipient(&member),
        registered_at: Utc::now(),
    };
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        notifier.notify(event).await;
    });

    let profile = load_profile(&repo, member).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/members/:member_id
#[axum::debug_handler]
pub async fn get_member(
    State(state): State<AppState>,
    caller: Caller,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberProfile>, ApiError> {
    caller.require_self_or_staff(member_id)?;

    let repo = MemberRepository::new(state.pool.clone());
    let member = repo
        .find_by_id(member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    Ok(Json(load_profile(&repo, member).await?))
}

/// PATCH /api/v1/members/:member_id
///
/// Partial profile update. Changing phone or email resets the matching
/// verified flag; `membercard_number` and `signup_bias` are staff-only.
#[axum::debug_handler]
pub async fn update_member(
    State(state): State<AppState>,
    caller: Caller,
    Path(member_id): Path<Uuid>,
    Json(body): Json<UpdateMemberRequest>,
) -> Result<Json<MemberProfile>, ApiError> {
    caller.require_self_or_staff(member_id)?;

    if body.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }
    body.validate()?;

    if (body.membercard_number.is_some() || body.signup_bias.is_some()) && !caller.staff {
        return Err(ApiError::Forbidden(
            "Only staff may change membercard number or signup bias".to_string(),
        ));
    }

    let phone = body.phone_number.as_deref().map(normalize_phone);

    let repo = MemberRepository::new(state.pool.clone());
    let member = repo
        .update_profile(
            member_id,
            body.fullname.as_deref().map(str::trim),
            body.email.as_deref(),
            phone.as_deref(),
            body.membercard_number.as_deref(),
            body.signup_bias,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    tracing::info!(member_id = %member.id, caller_id = %caller.member_id, "Member profile updated");

    Ok(Json(load_profile(&repo, member).await?))
}

/// GET /api/v1/members/:member_id/activities
#[axum::debug_handler]
pub async fn list_member_activities(
    State(state): State<AppState>,
    caller: Caller,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityItem>>, ApiError> {
    caller.require_self_or_staff(member_id)?;

    let activities = ActivityRepository::new(state.pool.clone())
        .list_for_member(member_id)
        .await?
        .into_iter()
        .map(activity_item)
        .collect();

    Ok(Json(activities))
}

/// POST /api/v1/members/:member_id/verify/:channel/request
///
/// Issues a fresh verification code for the channel and sends it out.
#[axum::debug_handler]
pub async fn request_verification(
    State(state): State<AppState>,
    caller: Caller,
    Path((member_id, channel)): Path<(Uuid, VerificationChannel)>,
) -> Result<Json<VerificationStatusResponse>, ApiError> {
    caller.require_self_or_staff(member_id)?;

    let is_phone = channel == VerificationChannel::Phone;
    let code = generate_code();

    let repo = MemberRepository::new(state.pool.clone());
    let member = repo
        .set_verification_code(member_id, is_phone, &code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    tracing::info!(member_id = %member_id, channel = %channel, "Verification code issued");

    let event = if is_phone {
        NotificationEvent::PhoneVerificationRequested {
            recipient: recipient(&member),
            code,
        }
    } else {
        NotificationEvent::EmailVerificationRequested {
            recipient: recipient(&member),
            code,
        }
    };
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        notifier.notify(event).await;
    });

    Ok(Json(VerificationStatusResponse {
        channel,
        verified: false,
        message: format!("Verification code sent to your {channel}"),
    }))
}

/// POST /api/v1/members/:member_id/verify/:channel/confirm
#[axum::debug_handler]
pub async fn confirm_verification(
    State(state): State<AppState>,
    caller: Caller,
    Path((member_id, channel)): Path<(Uuid, VerificationChannel)>,
    Json(body): Json<ConfirmVerificationRequest>,
) -> Result<Json<VerificationStatusResponse>, ApiError> {
    caller.require_self_or_staff(member_id)?;

    let repo = MemberRepository::new(state.pool.clone());
    let member = repo
        .find_by_id(member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    let is_phone = channel == VerificationChannel::Phone;
    let (stored, sent_at) = if is_phone {
        (
            member.phone_verification_code.as_deref(),
            member.phone_verification_sent_at,
        )
    } else {
        (
            member.email_verification_code.as_deref(),
            member.email_verification_sent_at,
        )
    };

    match check_code(stored, sent_at, &body.code, Utc::now()) {
        CodeCheck::Valid => {
            repo.mark_verified(member_id, is_phone)
                .await?
                .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

            tracing::info!(member_id = %member_id, channel = %channel, "Contact verified");

            Ok(Json(VerificationStatusResponse {
                channel,
                verified: true,
                message: format!("Your {channel} is now verified"),
            }))
        }
        CodeCheck::Mismatch => Err(ApiError::Validation(
            "Verification code does not match".to_string(),
        )),
        CodeCheck::Expired => Err(ApiError::Validation(
            "Verification code has expired, request a new one".to_string(),
        )),
        CodeCheck::NotIssued => Err(ApiError::Validation(
            "No verification code has been requested for this channel".to_string(),
        )),
    }
}
