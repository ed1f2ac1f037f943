use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::friend::schema::FriendRequestStatus;

/// Events other services react to: mailing invitations to unknown contacts
/// and retiring notifications tied to a request that was just answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FriendEvent {
    /// Someone tried to befriend an e-mail address with no account behind it.
    InviteByEmail { sending_user_id: Uuid, new_user_email: String, locale: String },
    /// Someone tried to befriend a phone number with no account behind it.
    InviteByPhone { sending_user_id: Uuid, new_user_phone: String, locale: String },
    /// A pending request left the pending state.
    FriendRequestResolved {
        friend_request_id: Uuid,
        token: Uuid,
        status: FriendRequestStatus,
        sending_user_id: Uuid,
        receiving_user_id: Uuid,
    },
}

impl FriendEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            FriendEvent::InviteByEmail { .. } => "friends:invite_by_email",
            FriendEvent::InviteByPhone { .. } => "friends:invite_by_phone",
            FriendEvent::FriendRequestResolved { .. } => "friends:friend_request_resolved",
        }
    }
}
