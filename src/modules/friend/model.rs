use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::Settings,
    modules::{
        friend::schema::{FriendRequestEntity, FriendRequestStatus},
        user::{
            model::{Actor, UserProfile},
            schema::UserEntity,
        },
    },
    utils::absolute_url,
};

pub type FriendResponse = UserProfile;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFriendRequestBody {
    #[validate(length(min = 1, max = 100, message = "Contact must be 1 to 100 characters long"))]
    pub contact: String,
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters long"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    Incoming,
    Outgoing,
}

impl RequestMode {
    pub fn of(actor_id: Uuid, request: &FriendRequestEntity) -> Option<Self> {
        if request.sending_user_id == actor_id {
            Some(RequestMode::Outgoing)
        } else if request.receiving_user_id == actor_id {
            Some(RequestMode::Incoming)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendRequestQuery {
    pub status: Option<FriendRequestStatus>,
    pub mode: Option<RequestMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoveFriendBody {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestResponse {
    pub token: Uuid,
    pub status: FriendRequestStatus,
    /// Relative to the caller; `None` when a superuser looks at someone else's request.
    pub request_mode: Option<RequestMode>,
    /// Display name of the other party.
    pub contact_info: Option<String>,
    /// Avatar of the other party.
    pub avatar: Option<String>,
    pub contact: String,
    pub message: String,
    pub sending_user_id: Uuid,
    pub receiving_user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestResponse {
    pub fn build(
        request: FriendRequestEntity,
        actor: &Actor,
        users: &[UserEntity],
        settings: &Settings,
    ) -> Self {
        let request_mode = RequestMode::of(actor.id, &request);

        let other = match request_mode {
            Some(RequestMode::Outgoing) => Some(request.receiving_user_id),
            Some(RequestMode::Incoming) => Some(request.sending_user_id),
            None => None,
        }
        .and_then(|id| users.iter().find(|u| u.id == id));

        FriendRequestResponse {
            token: request.token,
            status: request.status,
            request_mode,
            contact_info: other.map(|u| u.display_name.clone()),
            avatar: other
                .and_then(|u| absolute_url(&settings.domain_name, u.avatar_url.as_deref())),
            contact: request.contact,
            message: request.message,
            sending_user_id: request.sending_user_id,
            receiving_user_id: request.receiving_user_id,
            created_at: request.created_at,
        }
    }
}

/// Returned instead of a request when the caller asks for their invitation link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferralLink {
    pub referral_link: String,
    pub text: String,
}

impl ReferralLink {
    pub fn for_user(domain_name: &str, user_email: &str) -> Self {
        let user_email: String = form_urlencoded::byte_serialize(user_email.as_bytes()).collect();

        ReferralLink {
            referral_link: format!("https://{domain_name}/referral-invite/?user_email={user_email}"),
            text: "Your personal link for inviting people to the service or adding them as \
                   friends. Share it any way you like!"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CreateFriendRequestOutcome {
    Created(FriendRequestResponse),
    ReferralLink(ReferralLink),
}
