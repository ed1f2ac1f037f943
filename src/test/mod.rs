//! In-memory stand-ins for the Postgres repositories and the Redis publisher,
//! plus a helper that mounts the API behind a header-based fake login.

use actix_web::{dev::ServiceRequest, HttpMessage};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    api::error::{self, DbErrorMeta},
    constants::Settings,
    modules::{
        friend::{
            repository::{FriendRepo, FriendRepository, FriendRequestRepository, NewFriendRequest},
            schema::{ordered_pair, FriendEntity, FriendRequestEntity, FriendRequestStatus},
            service::FriendService,
        },
        notification::{event::FriendEvent, publisher::EventPublisher},
        referral::{
            repository::{ReferralCodeRepository, ReferralInviteRepository},
            schema::{ReferralCodeEntity, ReferralInviteEntity},
            service::ReferralService,
        },
        user::{
            model::UserProfileMode,
            repository::UserRepository,
            schema::{UserEntity, UserRole},
        },
    },
    utils::Claims,
};


pub fn settings() -> Arc<Settings> {
    Arc::new(Settings {
        domain_name: "friends.example.com".to_string(),
        user_profile_mode: UserProfileMode::Basic,
        default_locale: "en".to_string(),
    })
}

fn unique_violation(constraint: &str) -> error::SystemError {
    error::SystemError::Conflict(Some(DbErrorMeta {
        code: Some("23505".to_string()),
        constraint: Some(constraint.to_string()),
        message: "duplicate key value violates unique constraint".to_string(),
    }))
}

#[derive(Default)]
struct State {
    users: Vec<UserEntity>,
    friends: Vec<FriendEntity>,
    requests: Vec<FriendRequestEntity>,
    codes: Vec<ReferralCodeEntity>,
    invites: Vec<ReferralInviteEntity>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Adds `name` with e-mail `{name}@example.com` and a capitalized display name.
    pub fn add_user(&self, name: &str, phone: Option<&str>) -> UserEntity {
        let mut chars = name.chars();
        let display_name = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
        let now = chrono::Utc::now();

        let user = UserEntity {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            phone: phone.map(str::to_string),
            display_name,
            avatar_url: None,
            role: UserRole::User,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_friendship(&self, a: Uuid, b: Uuid) {
        let (user_a, user_b) = ordered_pair(a, b);
        self.state.lock().unwrap().friends.push(FriendEntity {
            user_a,
            user_b,
            created_at: chrono::Utc::now(),
        });
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.phone.as_deref() == Some(phone)).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl FriendRepository for MemoryStore {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendEntity>, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);
        let state = self.state.lock().unwrap();
        Ok(state.friends.iter().find(|f| f.user_a == user_a && f.user_b == user_b).cloned())
    }

    async fn find_friends(&self, user_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();

        let mut friends: Vec<UserEntity> = state
            .friends
            .iter()
            .filter_map(|f| match (f.user_a == *user_id, f.user_b == *user_id) {
                (true, _) => Some(f.user_b),
                (_, true) => Some(f.user_a),
                _ => None,
            })
            .filter_map(|id| state.users.iter().find(|u| u.id == id).cloned())
            .collect();
        friends.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        Ok(friends)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryStore {
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .rev()
            .find(|r| r.sending_user_id == *sender_id && r.receiving_user_id == *receiver_id)
            .cloned())
    }

    async fn find_by_token(
        &self,
        token: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.requests.iter().find(|r| r.token == *token).cloned())
    }

    async fn find_pending_by_token(
        &self,
        token: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .find(|r| r.token == *token && r.status == FriendRequestStatus::Pending)
            .cloned())
    }

    async fn find_friend_requests(
        &self,
        user_id: Option<&Uuid>,
        status: Option<FriendRequestStatus>,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .rev()
            .filter(|r| {
                user_id.map_or(true, |id| r.sending_user_id == *id || r.receiving_user_id == *id)
            })
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut state = self.state.lock().unwrap();

        let pair = ordered_pair(request.sending_user_id, request.receiving_user_id);
        let open_pair = state.requests.iter().any(|r| {
            ordered_pair(r.sending_user_id, r.receiving_user_id) == pair
                && r.status != FriendRequestStatus::Rejected
                && r.status != FriendRequestStatus::Canceled
        });
        if open_pair {
            return Err(unique_violation("friend_requests_open_pair"));
        }

        let now = chrono::Utc::now();
        let entity = FriendRequestEntity {
            id: Uuid::new_v4(),
            token: Uuid::new_v4(),
            sending_user_id: request.sending_user_id,
            receiving_user_id: request.receiving_user_id,
            contact: request.contact.clone(),
            message: request.message.clone(),
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.requests.push(entity.clone());

        Ok(entity)
    }
}

#[async_trait::async_trait]
impl FriendRepo for MemoryStore {
    async fn confirm_friend_request_atomic(
        &self,
        request_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut state = self.state.lock().unwrap();

        let Some(request) = state
            .requests
            .iter_mut()
            .find(|r| r.id == *request_id && r.status == FriendRequestStatus::Pending)
        else {
            return Ok(false);
        };
        request.status = FriendRequestStatus::Confirmed;
        request.updated_at = chrono::Utc::now();

        let (user_a, user_b) = ordered_pair(request.sending_user_id, request.receiving_user_id);
        if !state.friends.iter().any(|f| f.user_a == user_a && f.user_b == user_b) {
            state.friends.push(FriendEntity { user_a, user_b, created_at: chrono::Utc::now() });
        }

        Ok(true)
    }

    async fn close_friend_request(
        &self,
        request_id: &Uuid,
        _status: FriendRequestStatus,
    ) -> Result<bool, error::SystemError> {
        let mut state = self.state.lock().unwrap();

        let before = state.requests.len();
        state
            .requests
            .retain(|r| !(r.id == *request_id && r.status == FriendRequestStatus::Pending));

        Ok(state.requests.len() < before)
    }

    async fn remove_friend_atomic(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);
        let mut state = self.state.lock().unwrap();

        let before = state.friends.len() + state.requests.len();
        state.friends.retain(|f| !(f.user_a == user_a && f.user_b == user_b));
        state.requests.retain(|r| {
            r.status != FriendRequestStatus::Confirmed
                || ordered_pair(r.sending_user_id, r.receiving_user_id) != (user_a, user_b)
        });

        Ok(state.friends.len() + state.requests.len() < before)
    }
}

#[async_trait::async_trait]
impl ReferralCodeRepository for MemoryStore {
    async fn find_code_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.codes.iter().find(|c| c.id == *id).cloned())
    }

    async fn find_code_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.codes.iter().find(|c| c.code == code).cloned())
    }

    async fn find_codes_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<ReferralCodeEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.codes.iter().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    async fn find_codes(
        &self,
        user_id: Option<&Uuid>,
    ) -> Result<Vec<ReferralCodeEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .codes
            .iter()
            .rev()
            .filter(|c| user_id.map_or(true, |id| c.user_id == *id))
            .cloned()
            .collect())
    }

    async fn insert_code_if_absent(
        &self,
        user_id: &Uuid,
        code: &str,
        note: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let mut state = self.state.lock().unwrap();

        if state.codes.iter().any(|c| c.code == code) {
            return Ok(None);
        }

        let now = chrono::Utc::now();
        let entity = ReferralCodeEntity {
            id: Uuid::new_v4(),
            user_id: *user_id,
            code: code.to_string(),
            note: note.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.codes.push(entity.clone());

        Ok(Some(entity))
    }

    async fn update_note(
        &self,
        id: &Uuid,
        note: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let mut state = self.state.lock().unwrap();

        Ok(state.codes.iter_mut().find(|c| c.id == *id).map(|c| {
            c.note = note.to_string();
            c.updated_at = chrono::Utc::now();
            c.clone()
        }))
    }
}

#[async_trait::async_trait]
impl ReferralInviteRepository for MemoryStore {
    async fn find_invite_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<ReferralInviteEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.invites.iter().find(|i| i.id == *id).cloned())
    }

    async fn find_invites(
        &self,
        referral_user_id: Option<&Uuid>,
    ) -> Result<Vec<ReferralInviteEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .invites
            .iter()
            .rev()
            .filter(|i| referral_user_id.map_or(true, |id| i.referral_user_id == *id))
            .cloned()
            .collect())
    }

    async fn find_invite_by_invited_user(
        &self,
        invited_user_id: &Uuid,
    ) -> Result<Option<ReferralInviteEntity>, error::SystemError> {
        let state = self.state.lock().unwrap();
        Ok(state.invites.iter().find(|i| i.invited_user_id == *invited_user_id).cloned())
    }

    async fn create_invite(
        &self,
        code: &ReferralCodeEntity,
        invited_user_id: &Uuid,
    ) -> Result<ReferralInviteEntity, error::SystemError> {
        let mut state = self.state.lock().unwrap();

        if state.invites.iter().any(|i| i.invited_user_id == *invited_user_id) {
            return Err(unique_violation("referral_invites_invited_user"));
        }

        let now = chrono::Utc::now();
        let entity = ReferralInviteEntity {
            id: Uuid::new_v4(),
            referral_user_id: code.user_id,
            invited_user_id: *invited_user_id,
            referral_code_id: code.id,
            created_at: now,
            updated_at: now,
        };
        state.invites.push(entity.clone());

        Ok(entity)
    }
}

/// Records published events instead of sending them anywhere.
#[derive(Default)]
pub struct MemoryEvents {
    events: Mutex<Vec<FriendEvent>>,
}

impl MemoryEvents {
    pub fn take(&self) -> Vec<FriendEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

#[async_trait::async_trait]
impl EventPublisher for MemoryEvents {
    async fn publish(&self, event: &FriendEvent) -> Result<(), error::SystemError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn services(
    store: &Arc<MemoryStore>,
    events: &Arc<MemoryEvents>,
) -> (FriendService, ReferralService) {
    let friend_service =
        FriendService::with_dependencies(store.clone(), store.clone(), events.clone(), settings());
    let referral_service =
        ReferralService::with_dependencies(store.clone(), store.clone(), settings());

    (friend_service, referral_service)
}

/// Logs the request in as the user named by `x-test-user`; `x-test-admin` makes it an admin.
pub fn impersonate(req: &ServiceRequest) {
    let Some(sub) = req
        .headers()
        .get("x-test-user")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
    else {
        return;
    };

    let role =
        if req.headers().contains_key("x-test-admin") { UserRole::Admin } else { UserRole::User };

    req.extensions_mut().insert(Claims::new(&sub, &role, 3600));
}

/// Builds a test service with the friend and referral routes under `/api/friends`.
macro_rules! test_app {
    ($store:expr, $events:expr) => {{
        use actix_web::dev::Service as _;

        let (friend_service, referral_service) = $crate::test::services($store, $events);

        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(friend_service))
                .app_data(actix_web::web::Data::new(referral_service))
                .service(
                    actix_web::web::scope("/api/friends")
                        .wrap_fn(|req, srv| {
                            $crate::test::impersonate(&req);
                            srv.call(req)
                        })
                        .configure($crate::modules::friend::route::configure)
                        .configure($crate::modules::referral::route::configure),
                ),
        )
        .await
    }};
}

pub(crate) use test_app;
