use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            repository::{FriendRepo, FriendRepository, FriendRequestRepository, NewFriendRequest},
            schema::{ordered_pair, FriendEntity, FriendRequestEntity, FriendRequestStatus},
        },
        user::schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendEntity>, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);

        let friendship = sqlx::query_as::<_, FriendEntity>(
            "SELECT * FROM friends WHERE user_a = $1 AND user_b = $2",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn find_friends(&self, user_id: &Uuid) -> Result<Vec<UserEntity>, error::SystemError> {
        let friends = sqlx::query_as::<_, UserEntity>(
            r#"
        SELECT u.*
        FROM friends f
        JOIN users u
            ON u.id = CASE
                WHEN f.user_a = $1 THEN f.user_b
                ELSE f.user_a
            END
        WHERE (f.user_a = $1 OR f.user_b = $1)
          AND u.deleted_at IS NULL
        ORDER BY u.display_name
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE sending_user_id = $1 AND receiving_user_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_by_token(
        &self,
        token: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_pending_by_token(
        &self,
        token: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE token = $1 AND status = $2",
        )
        .bind(token)
        .bind(FriendRequestStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_friend_requests(
        &self,
        user_id: Option<&Uuid>,
        status: Option<FriendRequestStatus>,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE ($1::uuid IS NULL OR sending_user_id = $1 OR receiving_user_id = $1)
              AND ($2::friend_request_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, token, sending_user_id, receiving_user_id, contact, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Uuid::new_v4())
        .bind(request.sending_user_id)
        .bind(request.receiving_user_id)
        .bind(&request.contact)
        .bind(&request.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn confirm_friend_request_atomic(
        &self,
        request_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE id = $1 AND status = $2 FOR UPDATE",
        )
        .bind(request_id)
        .bind(FriendRequestStatus::Pending)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE friend_requests SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(request_id)
            .bind(FriendRequestStatus::Confirmed)
            .execute(&mut *tx)
            .await?;

        let (u1, u2) = ordered_pair(request.sending_user_id, request.receiving_user_id);

        sqlx::query(
            "INSERT INTO friends (user_a, user_b) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(u1)
        .bind(u2)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn close_friend_request(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
    ) -> Result<bool, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE friend_requests SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(request_id)
        .bind(status)
        .bind(FriendRequestStatus::Pending)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn remove_friend_atomic(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);

        let mut tx = self.pool.begin().await?;

        let friendships = sqlx::query("DELETE FROM friends WHERE user_a = $1 AND user_b = $2")
            .bind(user_a)
            .bind(user_b)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let requests = sqlx::query(
            r#"
            DELETE FROM friend_requests
            WHERE status = $3
              AND ((sending_user_id = $1 AND receiving_user_id = $2)
                OR (sending_user_id = $2 AND receiving_user_id = $1))
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(FriendRequestStatus::Confirmed)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(friendships + requests > 0)
    }
}
