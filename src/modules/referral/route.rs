use crate::modules::referral::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/referral-code")
            .service(list_referral_codes)
            .service(create_referral_code)
            .service(get_referral_code)
            .service(update_referral_code),
    )
    .service(
        scope("/referral-invite")
            .service(list_referral_invites)
            .service(redeem_referral_code)
            .service(get_my_referral_user)
            .service(get_referral_invite),
    );
}
