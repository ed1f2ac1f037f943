use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::{
    api::error,
    constants::Settings,
    modules::{
        referral::{
            model::{
                CreateReferralCodeBody, RedeemReferralCodeBody, ReferralCodeResponse,
                ReferralInviteResponse, UpdateReferralCodeBody,
            },
            repository::ReferralRepo,
            schema::{ReferralCodeEntity, ReferralInviteEntity},
        },
        user::{
            model::{Actor, UserProfile},
            repository::UserRepository,
        },
    },
};

pub const CODE_LENGTH: usize = 8;

pub type CodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

pub fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[derive(Clone)]
pub struct ReferralService {
    referral_repo: Arc<dyn ReferralRepo>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    settings: Arc<Settings>,
    generator: CodeGenerator,
}

impl ReferralService {
    pub fn with_dependencies(
        referral_repo: Arc<dyn ReferralRepo>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        settings: Arc<Settings>,
    ) -> Self {
        log::info!("ReferralService initialized with dependencies");
        ReferralService { referral_repo, user_repo, settings, generator: Arc::new(generate_code) }
    }

    pub fn with_code_generator(mut self, generator: CodeGenerator) -> Self {
        self.generator = generator;
        self
    }

    fn can_access_code(actor: &Actor, code: &ReferralCodeEntity) -> bool {
        actor.is_superuser || code.user_id == actor.id
    }

    fn can_access_invite(actor: &Actor, invite: &ReferralInviteEntity) -> bool {
        actor.is_superuser
            || invite.referral_user_id == actor.id
            || invite.invited_user_id == actor.id
    }

    async fn visible_code(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<ReferralCodeEntity, error::SystemError> {
        self.referral_repo
            .find_code_by_id(&id)
            .await?
            .filter(|code| Self::can_access_code(actor, code))
            .ok_or_else(|| error::SystemError::not_found("Referral code not found"))
    }

    async fn code_response(
        &self,
        code: ReferralCodeEntity,
    ) -> Result<ReferralCodeResponse, error::SystemError> {
        let users = self.user_repo.find_by_ids(&[code.user_id]).await?;
        Ok(ReferralCodeResponse::build(code, &users, &self.settings))
    }

    async fn invite_responses(
        &self,
        invites: Vec<ReferralInviteEntity>,
    ) -> Result<Vec<ReferralInviteResponse>, error::SystemError> {
        let mut user_ids: Vec<Uuid> =
            invites.iter().flat_map(|i| [i.referral_user_id, i.invited_user_id]).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut code_ids: Vec<Uuid> = invites.iter().map(|i| i.referral_code_id).collect();
        code_ids.sort_unstable();
        code_ids.dedup();

        let (users, codes) = tokio::try_join!(
            self.user_repo.find_by_ids(&user_ids),
            self.referral_repo.find_codes_by_ids(&code_ids),
        )?;

        Ok(invites
            .into_iter()
            .map(|i| ReferralInviteResponse::build(i, &users, &codes, &self.settings))
            .collect())
    }

    pub async fn get_referral_codes(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ReferralCodeResponse>, error::SystemError> {
        let scope = if actor.is_superuser { None } else { Some(&actor.id) };
        let codes = self.referral_repo.find_codes(scope).await?;

        let mut ids: Vec<Uuid> = codes.iter().map(|c| c.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let users = self.user_repo.find_by_ids(&ids).await?;

        Ok(codes
            .into_iter()
            .map(|c| ReferralCodeResponse::build(c, &users, &self.settings))
            .collect())
    }

    pub async fn get_referral_code(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<ReferralCodeResponse, error::SystemError> {
        let code = self.visible_code(actor, id).await?;
        self.code_response(code).await
    }

    /// Draws codes until one is stored; a taken code just means another draw.
    pub async fn create_referral_code(
        &self,
        actor: &Actor,
        body: CreateReferralCodeBody,
    ) -> Result<ReferralCodeResponse, error::SystemError> {
        let note = body.note.unwrap_or_default();

        let code = loop {
            let candidate = (self.generator)();
            match self.referral_repo.insert_code_if_absent(&actor.id, &candidate, &note).await? {
                Some(code) => break code,
                None => log::debug!("Referral code {} already taken, retrying", candidate),
            }
        };

        log::info!("Referral code {} created for {}", code.code, actor.id);
        self.code_response(code).await
    }

    pub async fn update_referral_code(
        &self,
        actor: &Actor,
        id: Uuid,
        body: UpdateReferralCodeBody,
    ) -> Result<ReferralCodeResponse, error::SystemError> {
        let code = self.visible_code(actor, id).await?;

        let code = self
            .referral_repo
            .update_note(&code.id, &body.note)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Referral code not found"))?;

        self.code_response(code).await
    }

    pub async fn get_referral_invites(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ReferralInviteResponse>, error::SystemError> {
        let scope = if actor.is_superuser { None } else { Some(&actor.id) };
        let invites = self.referral_repo.find_invites(scope).await?;
        self.invite_responses(invites).await
    }

    pub async fn get_referral_invite(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<ReferralInviteResponse, error::SystemError> {
        let invite = self
            .referral_repo
            .find_invite_by_id(&id)
            .await?
            .filter(|invite| Self::can_access_invite(actor, invite))
            .ok_or_else(|| error::SystemError::not_found("Referral invite not found"))?;

        let mut responses = self.invite_responses(vec![invite]).await?;
        responses.pop().ok_or_else(|| error::SystemError::not_found("Referral invite not found"))
    }

    /// The user who brought the caller in.
    pub async fn get_my_referral_user(
        &self,
        actor: &Actor,
    ) -> Result<UserProfile, error::SystemError> {
        let invite = self
            .referral_repo
            .find_invite_by_invited_user(&actor.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("You were not invited by anyone"))?;

        let referral_user = self
            .user_repo
            .find_by_id(&invite.referral_user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(UserProfile::build(&referral_user, &self.settings))
    }

    pub async fn redeem_referral_code(
        &self,
        actor: &Actor,
        body: RedeemReferralCodeBody,
    ) -> Result<ReferralInviteResponse, error::SystemError> {
        let code = body.code.trim().to_ascii_uppercase();

        let code = self
            .referral_repo
            .find_code_by_code(&code)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Referral code not found"))?;

        if code.user_id == actor.id {
            return Err(error::SystemError::bad_request("You cannot use your own referral code"));
        }

        if self.referral_repo.find_invite_by_invited_user(&actor.id).await?.is_some() {
            return Err(error::SystemError::bad_request("You have already joined by referral"));
        }

        let invite = self.referral_repo.create_invite(&code, &actor.id).await?;

        log::info!("User {} joined by referral code {}", actor.id, code.code);

        let mut responses = self.invite_responses(vec![invite]).await?;
        responses.pop().ok_or(error::SystemError::InternalError("Invite vanished".into()))
    }
}
