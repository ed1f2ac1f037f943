use actix_web::{get, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_actor,
    modules::{
        referral::{
            model::{
                CreateReferralCodeBody, RedeemReferralCodeBody, ReferralCodeResponse,
                ReferralInviteResponse, UpdateReferralCodeBody,
            },
            service::ReferralService,
        },
        user::model::UserProfile,
    },
    utils::ValidatedJson,
};

#[get("")]
pub async fn list_referral_codes(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ReferralCodeResponse>>, error::Error> {
    let actor = get_actor(&req)?;
    let codes = referral_service.get_referral_codes(&actor).await?;

    Ok(success::Success::ok(Some(codes)).message("Referral codes retrieved successfully"))
}

#[post("")]
pub async fn create_referral_code(
    referral_service: web::Data<ReferralService>,
    body: ValidatedJson<CreateReferralCodeBody>,
    req: HttpRequest,
) -> Result<success::Success<ReferralCodeResponse>, error::Error> {
    let actor = get_actor(&req)?;
    let code = referral_service.create_referral_code(&actor, body.0).await?;

    Ok(success::Success::created(Some(code)).message("Referral code created successfully"))
}

#[get("/{id}")]
pub async fn get_referral_code(
    referral_service: web::Data<ReferralService>,
    id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ReferralCodeResponse>, error::Error> {
    let actor = get_actor(&req)?;
    let code = referral_service.get_referral_code(&actor, *id).await?;

    Ok(success::Success::ok(Some(code)).message("Referral code retrieved successfully"))
}

#[patch("/{id}")]
pub async fn update_referral_code(
    referral_service: web::Data<ReferralService>,
    id: web::Path<Uuid>,
    body: ValidatedJson<UpdateReferralCodeBody>,
    req: HttpRequest,
) -> Result<success::Success<ReferralCodeResponse>, error::Error> {
    let actor = get_actor(&req)?;
    let code = referral_service.update_referral_code(&actor, *id, body.0).await?;

    Ok(success::Success::ok(Some(code)).message("Referral code updated successfully"))
}

#[get("")]
pub async fn list_referral_invites(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ReferralInviteResponse>>, error::Error> {
    let actor = get_actor(&req)?;
    let invites = referral_service.get_referral_invites(&actor).await?;

    Ok(success::Success::ok(Some(invites)).message("Referral invites retrieved successfully"))
}

#[post("")]
pub async fn redeem_referral_code(
    referral_service: web::Data<ReferralService>,
    body: ValidatedJson<RedeemReferralCodeBody>,
    req: HttpRequest,
) -> Result<success::Success<ReferralInviteResponse>, error::Error> {
    let actor = get_actor(&req)?;
    let invite = referral_service.redeem_referral_code(&actor, body.0).await?;

    Ok(success::Success::created(Some(invite)).message("Referral code redeemed successfully"))
}

#[get("/my-referral-user")]
pub async fn get_my_referral_user(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
) -> Result<success::Success<UserProfile>, error::Error> {
    let actor = get_actor(&req)?;
    let user = referral_service.get_my_referral_user(&actor).await?;

    Ok(success::Success::ok(Some(user)).message("Referral user retrieved successfully"))
}

#[get("/{id}")]
pub async fn get_referral_invite(
    referral_service: web::Data<ReferralService>,
    id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ReferralInviteResponse>, error::Error> {
    let actor = get_actor(&req)?;
    let invite = referral_service.get_referral_invite(&actor, *id).await?;

    Ok(success::Success::ok(Some(invite)).message("Referral invite retrieved successfully"))
}
