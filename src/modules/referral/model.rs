use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::Settings,
    modules::{
        referral::schema::{ReferralCodeEntity, ReferralInviteEntity},
        user::{model::UserProfile, schema::UserEntity},
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateReferralCodeBody {
    #[validate(length(max = 255, message = "Note must be at most 255 characters long"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateReferralCodeBody {
    #[validate(length(max = 255, message = "Note must be at most 255 characters long"))]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RedeemReferralCodeBody {
    #[validate(length(min = 1, max = 8, message = "Code must be 1 to 8 characters long"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralCodeResponse {
    pub id: Uuid,
    pub user: Option<UserProfile>,
    pub code: String,
    pub note: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ReferralCodeResponse {
    pub fn build(code: ReferralCodeEntity, users: &[UserEntity], settings: &Settings) -> Self {
        ReferralCodeResponse {
            id: code.id,
            user: profile(code.user_id, users, settings),
            code: code.code,
            note: code.note,
            created_at: code.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralInviteResponse {
    pub id: Uuid,
    pub referral_user: Option<UserProfile>,
    pub invited_user: Option<UserProfile>,
    pub referral_code: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ReferralInviteResponse {
    pub fn build(
        invite: ReferralInviteEntity,
        users: &[UserEntity],
        codes: &[ReferralCodeEntity],
        settings: &Settings,
    ) -> Self {
        ReferralInviteResponse {
            id: invite.id,
            referral_user: profile(invite.referral_user_id, users, settings),
            invited_user: profile(invite.invited_user_id, users, settings),
            referral_code: codes
                .iter()
                .find(|c| c.id == invite.referral_code_id)
                .map(|c| c.code.clone()),
            created_at: invite.created_at,
        }
    }
}

fn profile(user_id: Uuid, users: &[UserEntity], settings: &Settings) -> Option<UserProfile> {
    users.iter().find(|u| u.id == user_id).map(|u| UserProfile::build(u, settings))
}
