use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    constants::Settings,
    modules::{
        friend::{
            contact::{parse_contact, Contact},
            model::{
                CreateFriendRequestBody, CreateFriendRequestOutcome, FriendRequestQuery,
                FriendRequestResponse, FriendResponse, ReferralLink, RequestMode,
            },
            permission,
            repository::{FriendRepo, NewFriendRequest},
            schema::{FriendRequestEntity, FriendRequestStatus},
        },
        notification::{event::FriendEvent, publisher::EventPublisher},
        user::{
            model::{Actor, UserProfile},
            repository::UserRepository,
            schema::UserEntity,
        },
    },
};

/// Who a contact string points at.
pub enum ContactTarget {
    User(UserEntity),
    ReferralLink(ReferralLink),
}

#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRepo>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    events: Arc<dyn EventPublisher + Send + Sync>,
    settings: Arc<Settings>,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRepo>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        events: Arc<dyn EventPublisher + Send + Sync>,
        settings: Arc<Settings>,
    ) -> Self {
        log::info!("FriendService initialized with dependencies");
        FriendService { friend_repo, user_repo, events, settings }
    }

    pub fn default_locale(&self) -> &str {
        &self.settings.default_locale
    }

    /// Delivery is best effort; a lost event never fails the request.
    async fn emit(&self, event: FriendEvent) {
        if let Err(e) = self.events.publish(&event).await {
            log::warn!("Failed to publish {} event: {:?}", event.channel(), e);
        }
    }

    async fn current_user(&self, actor: &Actor) -> Result<UserEntity, error::SystemError> {
        self.user_repo
            .find_by_id(&actor.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn resolve_contact(
        &self,
        contact: &str,
        sending_user: &UserEntity,
        locale: &str,
    ) -> Result<ContactTarget, error::SystemError> {
        match parse_contact(contact)? {
            Contact::ReferralLink => Ok(ContactTarget::ReferralLink(ReferralLink::for_user(
                &self.settings.domain_name,
                &sending_user.email,
            ))),
            Contact::Email(email) => match self.user_repo.find_by_email(&email).await? {
                Some(user) => Ok(ContactTarget::User(user)),
                None => {
                    self.emit(FriendEvent::InviteByEmail {
                        sending_user_id: sending_user.id,
                        new_user_email: email,
                        locale: locale.to_string(),
                    })
                    .await;
                    Err(error::SystemError::not_found("User not found"))
                }
            },
            Contact::Phone(phone) => match self.user_repo.find_by_phone(&phone).await? {
                Some(user) => Ok(ContactTarget::User(user)),
                None => {
                    self.emit(FriendEvent::InviteByPhone {
                        sending_user_id: sending_user.id,
                        new_user_phone: phone,
                        locale: locale.to_string(),
                    })
                    .await;
                    Err(error::SystemError::not_found(
                        "User not found. Check the number or use another way to add friends",
                    ))
                }
            },
        }
    }

    fn check_existing_request(
        existing: Option<FriendRequestEntity>,
        pending_message: &'static str,
    ) -> Result<(), error::SystemError> {
        match existing.map(|r| r.status) {
            Some(FriendRequestStatus::Confirmed) => {
                Err(error::SystemError::bad_request("User is already your friend"))
            }
            Some(FriendRequestStatus::Pending) => {
                Err(error::SystemError::bad_request(pending_message))
            }
            _ => Ok(()),
        }
    }

    pub async fn send_friend_request(
        &self,
        actor: &Actor,
        body: CreateFriendRequestBody,
        locale: &str,
    ) -> Result<CreateFriendRequestOutcome, error::SystemError> {
        let sending_user = self.current_user(actor).await?;

        let target = self.resolve_contact(&body.contact, &sending_user, locale).await?;
        let receiving_user = match target {
            ContactTarget::User(user) => user,
            ContactTarget::ReferralLink(link) => {
                return Ok(CreateFriendRequestOutcome::ReferralLink(link));
            }
        };

        if receiving_user.id == sending_user.id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        let (friendship, forward, reverse) = tokio::try_join!(
            self.friend_repo.find_friendship(&sending_user.id, &receiving_user.id),
            self.friend_repo.find_friend_request(&sending_user.id, &receiving_user.id),
            self.friend_repo.find_friend_request(&receiving_user.id, &sending_user.id),
        )?;

        if friendship.is_some() {
            return Err(error::SystemError::bad_request("User is already your friend"));
        }

        Self::check_existing_request(
            forward,
            "You have already sent a request to this user. Wait for a response",
        )?;
        Self::check_existing_request(
            reverse,
            "This user has already sent you a friend request. Make a decision",
        )?;

        let request = self
            .friend_repo
            .create_friend_request(&NewFriendRequest {
                sending_user_id: sending_user.id,
                receiving_user_id: receiving_user.id,
                contact: body.contact,
                message: body.message.unwrap_or_default(),
            })
            .await?;

        log::info!(
            "Friend request {} sent from {} to {}",
            request.token,
            sending_user.id,
            receiving_user.id
        );

        let users = [sending_user, receiving_user];
        Ok(CreateFriendRequestOutcome::Created(FriendRequestResponse::build(
            request,
            actor,
            &users,
            &self.settings,
        )))
    }

    async fn transition(
        &self,
        actor: &Actor,
        token: Uuid,
        status: FriendRequestStatus,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friend_repo
            .find_pending_by_token(&token)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if !permission::can_transition(actor, &request, status) {
            return Err(error::SystemError::forbidden(
                "You are not allowed to perform this action on the friend request",
            ));
        }

        let applied = match status {
            FriendRequestStatus::Confirmed => {
                self.friend_repo.confirm_friend_request_atomic(&request.id).await?
            }
            _ => self.friend_repo.close_friend_request(&request.id, status).await?,
        };

        // Someone else answered it first.
        if !applied {
            return Err(error::SystemError::not_found("Friend request not found"));
        }

        self.emit(FriendEvent::FriendRequestResolved {
            friend_request_id: request.id,
            token: request.token,
            status,
            sending_user_id: request.sending_user_id,
            receiving_user_id: request.receiving_user_id,
        })
        .await;

        log::info!("Friend request {} is now {:?}", request.token, status);

        Ok(())
    }

    pub async fn confirm_friend_request(
        &self,
        actor: &Actor,
        token: Uuid,
    ) -> Result<(), error::SystemError> {
        self.transition(actor, token, FriendRequestStatus::Confirmed).await
    }

    pub async fn reject_friend_request(
        &self,
        actor: &Actor,
        token: Uuid,
    ) -> Result<(), error::SystemError> {
        self.transition(actor, token, FriendRequestStatus::Rejected).await
    }

    pub async fn cancel_friend_request(
        &self,
        actor: &Actor,
        token: Uuid,
    ) -> Result<(), error::SystemError> {
        self.transition(actor, token, FriendRequestStatus::Canceled).await
    }

    /// Removes a confirmed request together with the friendship it created.
    pub async fn delete_friend_request(
        &self,
        actor: &Actor,
        token: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friend_repo
            .find_by_token(&token)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if !permission::can_delete(actor, &request) {
            return Err(error::SystemError::forbidden(
                "You are not allowed to delete this friend request",
            ));
        }

        self.friend_repo
            .remove_friend_atomic(&request.sending_user_id, &request.receiving_user_id)
            .await?;

        log::info!("Friend request {} deleted by {}", request.token, actor.id);
        Ok(())
    }

    pub async fn get_friend_request(
        &self,
        actor: &Actor,
        token: Uuid,
    ) -> Result<FriendRequestResponse, error::SystemError> {
        let request = self
            .friend_repo
            .find_by_token(&token)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if !permission::can_view(actor, &request) {
            return Err(error::SystemError::forbidden(
                "You are not allowed to view this friend request",
            ));
        }

        let users = self
            .user_repo
            .find_by_ids(&[request.sending_user_id, request.receiving_user_id])
            .await?;

        Ok(FriendRequestResponse::build(request, actor, &users, &self.settings))
    }

    pub async fn get_friend_requests(
        &self,
        actor: &Actor,
        query: FriendRequestQuery,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let scope = if actor.is_superuser { None } else { Some(&actor.id) };

        let requests: Vec<FriendRequestEntity> = self
            .friend_repo
            .find_friend_requests(scope, query.status)
            .await?
            .into_iter()
            .filter(|r| query.mode.is_none() || RequestMode::of(actor.id, r) == query.mode)
            .collect();

        let mut ids: Vec<Uuid> =
            requests.iter().flat_map(|r| [r.sending_user_id, r.receiving_user_id]).collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.user_repo.find_by_ids(&ids).await?;

        Ok(requests
            .into_iter()
            .map(|r| FriendRequestResponse::build(r, actor, &users, &self.settings))
            .collect())
    }

    pub async fn get_friends(
        &self,
        actor: &Actor,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = self.friend_repo.find_friends(&actor.id).await?;
        Ok(friends.iter().map(|u| UserProfile::build(u, &self.settings)).collect())
    }

    pub async fn remove_friend(
        &self,
        actor: &Actor,
        friend_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if !self.friend_repo.remove_friend_atomic(&actor.id, &friend_id).await? {
            return Err(error::SystemError::not_found("Friend not found"));
        }

        log::info!("User {} removed friend {}", actor.id, friend_id);
        Ok(())
    }
}
