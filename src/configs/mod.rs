use actix_cors::Cors;
use deadpool_redis::Runtime;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{api::error, ENV};

pub async fn connect_database() -> Result<PgPool, error::SystemError> {
    let database_url = &ENV.database_url;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database migrations applied");

    Ok(pool)
}

pub fn create_redis_pool() -> Result<deadpool_redis::Pool, error::SystemError> {
    let mut cfg = deadpool_redis::Config::from_url(&ENV.redis_url);
    cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}

pub fn cors() -> Cors {
    let cors = Cors::default()
        .allowed_origin(&ENV.frontend_url)
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::ACCEPT_LANGUAGE,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(3600);

    if ENV.cors_allow_credentials {
        cors.supports_credentials()
    } else {
        cors
    }
}
