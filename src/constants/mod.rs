use crate::modules::user::model::UserProfileMode;

pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub domain_name: String,
    pub allowed_hosts: Vec<String>,
    pub debug: bool,
    pub cors_allow_credentials: bool,
    pub user_profile_mode: UserProfileMode,
    pub default_locale: String,
    pub ip: String,
    pub port: u16,
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Splits a comma separated host list, ignoring blanks and spaces.
pub fn parse_host_list(raw: &str) -> Vec<String> {
    raw.replace(' ', "").split(',').filter(|h| !h.is_empty()).map(str::to_string).collect()
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let domain_name = std::env::var("DOMAIN_NAME").unwrap_or_else(|_| "localhost".to_string());

        // The health check is always reached through localhost.
        let mut allowed_hosts = parse_host_list(
            &std::env::var("ALLOWED_HOSTS").unwrap_or_else(|_| domain_name.clone()),
        );
        allowed_hosts.push("localhost".to_string());

        let debug = env_flag("DEBUG", false);
        let cors_allow_credentials = env_flag("CORS_ALLOW_CREDENTIALS", false);

        let user_profile_mode = std::env::var("USER_PROFILE_MODE")
            .unwrap_or_else(|_| "basic".to_string())
            .parse::<UserProfileMode>()
            .expect("USER_PROFILE_MODE must be either `basic` or `full`");

        let default_locale = std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string());

        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env {
            jwt_secret,
            database_url,
            redis_url,
            frontend_url,
            domain_name,
            allowed_hosts,
            debug,
            cors_allow_credentials,
            user_profile_mode,
            default_locale,
            ip,
            port,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            domain_name: self.domain_name.clone(),
            user_profile_mode: self.user_profile_mode,
            default_locale: self.default_locale.clone(),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// The part of the environment the services read at request time.
#[derive(Debug, Clone)]
pub struct Settings {
    pub domain_name: String,
    pub user_profile_mode: UserProfileMode,
    pub default_locale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_list_drops_spaces_and_blanks() {
        let hosts = parse_host_list(" api.example.com, ,example.com ,");
        assert_eq!(hosts, vec!["api.example.com".to_string(), "example.com".to_string()]);
    }

    #[test]
    fn empty_host_list() {
        assert!(parse_host_list("").is_empty());
    }
}
