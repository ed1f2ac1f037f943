use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::schema::{FriendEntity, FriendRequestEntity, FriendRequestStatus};
use crate::modules::user::schema::UserEntity;

pub struct NewFriendRequest {
    pub sending_user_id: Uuid,
    pub receiving_user_id: Uuid,
    pub contact: String,
    pub message: String,
}

#[async_trait::async_trait]
pub trait FriendRepository {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendEntity>, error::SystemError>;

    async fn find_friends(&self, user_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Ordered lookup: only requests sent by `sender_id` to `receiver_id`.
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_by_token(
        &self,
        token: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_pending_by_token(
        &self,
        token: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Requests sent or received by `user_id`, or every request when it is `None`.
    async fn find_friend_requests(
        &self,
        user_id: Option<&Uuid>,
        status: Option<FriendRequestStatus>,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: FriendRepository + FriendRequestRepository + Send + Sync {
    /// Moves a pending request to confirmed and records the friendship in one
    /// transaction. `false` when the request is no longer pending.
    async fn confirm_friend_request_atomic(
        &self,
        request_id: &Uuid,
    ) -> Result<bool, error::SystemError>;

    /// Stamps a pending request with a terminal status and removes it.
    /// `false` when the request is no longer pending.
    async fn close_friend_request(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
    ) -> Result<bool, error::SystemError>;

    /// Drops the friendship and the confirmed request(s) behind it.
    /// `false` when the users were not friends.
    async fn remove_friend_atomic(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError>;
}
