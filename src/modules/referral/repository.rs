use uuid::Uuid;

use crate::api::error;
use crate::modules::referral::schema::{ReferralCodeEntity, ReferralInviteEntity};

#[async_trait::async_trait]
pub trait ReferralCodeRepository {
    async fn find_code_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError>;

    async fn find_code_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError>;

    async fn find_codes_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<ReferralCodeEntity>, error::SystemError>;

    /// Codes owned by `user_id`, or every code when it is `None`.
    async fn find_codes(
        &self,
        user_id: Option<&Uuid>,
    ) -> Result<Vec<ReferralCodeEntity>, error::SystemError>;

    /// `None` when `code` is already taken.
    async fn insert_code_if_absent(
        &self,
        user_id: &Uuid,
        code: &str,
        note: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError>;

    async fn update_note(
        &self,
        id: &Uuid,
        note: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait ReferralInviteRepository {
    async fn find_invite_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<ReferralInviteEntity>, error::SystemError>;

    /// Invites credited to `referral_user_id`, or every invite when it is `None`.
    async fn find_invites(
        &self,
        referral_user_id: Option<&Uuid>,
    ) -> Result<Vec<ReferralInviteEntity>, error::SystemError>;

    async fn find_invite_by_invited_user(
        &self,
        invited_user_id: &Uuid,
    ) -> Result<Option<ReferralInviteEntity>, error::SystemError>;

    async fn create_invite(
        &self,
        code: &ReferralCodeEntity,
        invited_user_id: &Uuid,
    ) -> Result<ReferralInviteEntity, error::SystemError>;
}

pub trait ReferralRepo: ReferralCodeRepository + ReferralInviteRepository + Send + Sync {}

impl<T> ReferralRepo for T where T: ReferralCodeRepository + ReferralInviteRepository + Send + Sync {}
