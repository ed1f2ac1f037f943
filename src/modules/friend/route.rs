use crate::modules::friend::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(list_friends).service(remove_friend).service(
        scope("/friend-request")
            .service(list_friend_requests)
            .service(send_friend_request)
            .service(confirm_friend_request)
            .service(reject_friend_request)
            .service(cancel_friend_request)
            .service(get_friend_request)
            .service(delete_friend_request),
    );
}
