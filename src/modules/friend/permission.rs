//! Who may do what with a friend request. Checked after the request is
//! loaded and before anything is written.

use crate::modules::{
    friend::schema::{FriendRequestEntity, FriendRequestStatus},
    user::model::Actor,
};

fn is_sending_user(actor: &Actor, request: &FriendRequestEntity) -> bool {
    actor.id == request.sending_user_id
}

fn is_receiving_user(actor: &Actor, request: &FriendRequestEntity) -> bool {
    actor.id == request.receiving_user_id
}

pub fn can_view(actor: &Actor, request: &FriendRequestEntity) -> bool {
    actor.is_superuser || is_sending_user(actor, request) || is_receiving_user(actor, request)
}

pub fn can_confirm(actor: &Actor, request: &FriendRequestEntity) -> bool {
    request.status == FriendRequestStatus::Pending
        && (actor.is_superuser || is_receiving_user(actor, request))
}

pub fn can_reject(actor: &Actor, request: &FriendRequestEntity) -> bool {
    request.status != FriendRequestStatus::Confirmed
        && (actor.is_superuser || is_receiving_user(actor, request))
}

pub fn can_cancel(actor: &Actor, request: &FriendRequestEntity) -> bool {
    request.status != FriendRequestStatus::Confirmed
        && (actor.is_superuser || is_sending_user(actor, request))
}

pub fn can_delete(actor: &Actor, request: &FriendRequestEntity) -> bool {
    request.status == FriendRequestStatus::Confirmed
        && (actor.is_superuser || is_sending_user(actor, request))
}

/// The rule guarding a transition into `status`.
pub fn can_transition(
    actor: &Actor,
    request: &FriendRequestEntity,
    status: FriendRequestStatus,
) -> bool {
    match status {
        FriendRequestStatus::Confirmed => can_confirm(actor, request),
        FriendRequestStatus::Rejected => can_reject(actor, request),
        FriendRequestStatus::Canceled => can_cancel(actor, request),
        FriendRequestStatus::Pending => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request(status: FriendRequestStatus) -> FriendRequestEntity {
        let now = chrono::Utc::now();
        FriendRequestEntity {
            id: Uuid::new_v4(),
            token: Uuid::new_v4(),
            sending_user_id: Uuid::new_v4(),
            receiving_user_id: Uuid::new_v4(),
            contact: "a@b.com".to_string(),
            message: String::new(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: Uuid) -> Actor {
        Actor { id, is_superuser: false }
    }

    fn admin() -> Actor {
        Actor { id: Uuid::new_v4(), is_superuser: true }
    }

    #[test]
    fn participants_and_admins_can_view() {
        let req = request(FriendRequestStatus::Pending);
        assert!(can_view(&user(req.sending_user_id), &req));
        assert!(can_view(&user(req.receiving_user_id), &req));
        assert!(can_view(&admin(), &req));
        assert!(!can_view(&user(Uuid::new_v4()), &req));
    }

    #[test]
    fn only_receiver_confirms_pending() {
        let req = request(FriendRequestStatus::Pending);
        assert!(can_confirm(&user(req.receiving_user_id), &req));
        assert!(can_confirm(&admin(), &req));
        assert!(!can_confirm(&user(req.sending_user_id), &req));

        let confirmed = request(FriendRequestStatus::Confirmed);
        assert!(!can_confirm(&user(confirmed.receiving_user_id), &confirmed));
        assert!(!can_confirm(&admin(), &confirmed));
    }

    #[test]
    fn receiver_rejects_and_sender_cancels() {
        let req = request(FriendRequestStatus::Pending);
        assert!(can_reject(&user(req.receiving_user_id), &req));
        assert!(!can_reject(&user(req.sending_user_id), &req));
        assert!(can_cancel(&user(req.sending_user_id), &req));
        assert!(!can_cancel(&user(req.receiving_user_id), &req));
        assert!(!can_cancel(&user(Uuid::new_v4()), &req));
    }

    #[test]
    fn confirmed_requests_are_only_deletable() {
        let req = request(FriendRequestStatus::Confirmed);
        assert!(!can_reject(&user(req.receiving_user_id), &req));
        assert!(!can_cancel(&user(req.sending_user_id), &req));
        assert!(can_delete(&user(req.sending_user_id), &req));
        assert!(!can_delete(&user(req.receiving_user_id), &req));
        assert!(!can_delete(&user(req.sending_user_id), &request(FriendRequestStatus::Pending)));
    }

    #[test]
    fn nothing_transitions_back_to_pending() {
        let req = request(FriendRequestStatus::Pending);
        assert!(!can_transition(&admin(), &req, FriendRequestStatus::Pending));
        assert!(can_transition(&admin(), &req, FriendRequestStatus::Canceled));
    }
}
