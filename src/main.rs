use actix_web::{
    self,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, cors, create_redis_pool},
    middlewares::{allowed_hosts, authentication},
    modules::{
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        notification::publisher::RedisPublisher,
        referral::{repository_pg::ReferralRepositoryPg, service::ReferralService},
        user::repository_pg::UserRepositoryPg,
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        create_redis_pool().map_err(|_| std::io::Error::other("Redis connection error"))?;

    let settings = Arc::new(ENV.settings());
    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let events = Arc::new(RedisPublisher::new(redis_pool));

    let friend_service = FriendService::with_dependencies(
        Arc::new(FriendRepositoryPg::new(db_pool.clone())),
        user_repo.clone(),
        events,
        settings.clone(),
    );
    let referral_service = ReferralService::with_dependencies(
        Arc::new(ReferralRepositoryPg::new(db_pool)),
        user_repo,
        settings,
    );

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(from_fn(allowed_hosts))
            .wrap(cors())
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .service(health_check)
            .service(
                web::scope("/api/friends")
                    .wrap(from_fn(authentication(ENV.jwt_secret.as_bytes())))
                    .configure(modules::friend::route::configure)
                    .configure(modules::referral::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
