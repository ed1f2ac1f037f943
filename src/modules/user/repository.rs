use uuid::Uuid;

use crate::{api::error, modules::user::schema::UserEntity};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Case-insensitive match on the e-mail address.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    /// `phone` must already be in E.164 form.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;
}
