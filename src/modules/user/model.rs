use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    constants::Settings,
    modules::user::schema::{UserEntity, UserRole},
    utils::{absolute_url, Claims},
};

/// The authenticated caller, as seen by the authorization rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub is_superuser: bool,
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Actor { id: claims.sub, is_superuser: claims.role == UserRole::Admin }
    }
}

/// How much of a user is exposed when embedded in another resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserProfileMode {
    #[default]
    Basic,
    Full,
}

impl FromStr for UserProfileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(UserProfileMode::Basic),
            "full" => Ok(UserProfileMode::Full),
            other => Err(format!("unknown user profile mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserProfile {
    pub fn build(user: &UserEntity, settings: &Settings) -> Self {
        let avatar = absolute_url(&settings.domain_name, user.avatar_url.as_deref());

        match settings.user_profile_mode {
            UserProfileMode::Basic => UserProfile {
                id: user.id,
                display_name: user.display_name.clone(),
                avatar,
                username: None,
                email: None,
                phone: None,
            },
            UserProfileMode::Full => UserProfile {
                id: user.id,
                display_name: user.display_name.clone(),
                avatar,
                username: Some(user.username.clone()),
                email: Some(user.email.clone()),
                phone: user.phone.clone(),
            },
        }
    }
}
