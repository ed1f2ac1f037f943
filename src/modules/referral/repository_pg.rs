use uuid::Uuid;

use crate::{
    api::error,
    modules::referral::{
        repository::{ReferralCodeRepository, ReferralInviteRepository},
        schema::{ReferralCodeEntity, ReferralInviteEntity},
    },
};

#[derive(Clone)]
pub struct ReferralRepositoryPg {
    pool: sqlx::PgPool,
}

impl ReferralRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReferralCodeRepository for ReferralRepositoryPg {
    async fn find_code_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let code =
            sqlx::query_as::<_, ReferralCodeEntity>("SELECT * FROM referral_codes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(code)
    }

    async fn find_code_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let code =
            sqlx::query_as::<_, ReferralCodeEntity>("SELECT * FROM referral_codes WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(code)
    }

    async fn find_codes_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<ReferralCodeEntity>, error::SystemError> {
        let codes = sqlx::query_as::<_, ReferralCodeEntity>(
            "SELECT * FROM referral_codes WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    async fn find_codes(
        &self,
        user_id: Option<&Uuid>,
    ) -> Result<Vec<ReferralCodeEntity>, error::SystemError> {
        let codes = sqlx::query_as::<_, ReferralCodeEntity>(
            r#"
            SELECT *
            FROM referral_codes
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    async fn insert_code_if_absent(
        &self,
        user_id: &Uuid,
        code: &str,
        note: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let code = sqlx::query_as::<_, ReferralCodeEntity>(
            r#"
            INSERT INTO referral_codes (id, user_id, code, note)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(code)
        .bind(note)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    async fn update_note(
        &self,
        id: &Uuid,
        note: &str,
    ) -> Result<Option<ReferralCodeEntity>, error::SystemError> {
        let code = sqlx::query_as::<_, ReferralCodeEntity>(
            r#"
            UPDATE referral_codes
            SET note = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(note)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }
}

#[async_trait::async_trait]
impl ReferralInviteRepository for ReferralRepositoryPg {
    async fn find_invite_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<ReferralInviteEntity>, error::SystemError> {
        let invite = sqlx::query_as::<_, ReferralInviteEntity>(
            "SELECT * FROM referral_invites WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn find_invites(
        &self,
        referral_user_id: Option<&Uuid>,
    ) -> Result<Vec<ReferralInviteEntity>, error::SystemError> {
        let invites = sqlx::query_as::<_, ReferralInviteEntity>(
            r#"
            SELECT *
            FROM referral_invites
            WHERE ($1::uuid IS NULL OR referral_user_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(referral_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invites)
    }

    async fn find_invite_by_invited_user(
        &self,
        invited_user_id: &Uuid,
    ) -> Result<Option<ReferralInviteEntity>, error::SystemError> {
        let invite = sqlx::query_as::<_, ReferralInviteEntity>(
            "SELECT * FROM referral_invites WHERE invited_user_id = $1",
        )
        .bind(invited_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn create_invite(
        &self,
        code: &ReferralCodeEntity,
        invited_user_id: &Uuid,
    ) -> Result<ReferralInviteEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let invite = sqlx::query_as::<_, ReferralInviteEntity>(
            r#"
            INSERT INTO referral_invites (id, referral_user_id, invited_user_id, referral_code_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(code.user_id)
        .bind(invited_user_id)
        .bind(code.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(invite)
    }
}
