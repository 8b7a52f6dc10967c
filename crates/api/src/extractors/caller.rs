//! Caller identity extractor.
//!
//! Authentication happens at a fronting proxy; this service trusts the
//! identity headers it forwards. `x-member-id` carries the member's UUID
//! and `x-member-role` is `staff` for privileged callers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the authenticated member's ID.
pub const MEMBER_ID_HEADER: &str = "x-member-id";

/// Header carrying the caller's role.
pub const MEMBER_ROLE_HEADER: &str = "x-member-role";

/// The authenticated caller, as asserted by the fronting proxy.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub member_id: Uuid,
    pub staff: bool,
}

impl Caller {
    /// True when the caller is `member_id` themselves or staff.
    pub fn can_act_for(&self, member_id: Uuid) -> bool {
        self.staff || self.member_id == member_id
    }

    /// Errors unless the caller is staff.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.staff {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Staff access required".to_string()))
        }
    }

    /// Errors unless the caller may act for `member_id`.
    pub fn require_self_or_staff(&self, member_id: Uuid) -> Result<(), ApiError> {
        if self.can_act_for(member_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Not allowed to act for this member".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let member_id = parts
            .headers
            .get(MEMBER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing caller identity".to_string()))?;

        let member_id = member_id
            .parse::<Uuid>()
            .map_err(|_| ApiError::Unauthorized("Malformed caller identity".to_string()))?;

        let staff = parts
            .headers
            .get(MEMBER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|role| role.eq_ignore_ascii_case("staff"))
            .unwrap_or(false);

        Ok(Caller { member_id, staff })
    }
}
