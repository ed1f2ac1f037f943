use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_actor,
    modules::friend::{
        model::{
            CreateFriendRequestBody, CreateFriendRequestOutcome, FriendRequestQuery,
            FriendRequestResponse, FriendResponse, RemoveFriendBody,
        },
        service::FriendService,
    },
    utils::{request_locale, ValidatedJson, ValidatedQuery},
};

#[get("")]
pub async fn list_friend_requests(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<FriendRequestQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let actor = get_actor(&req)?;
    let requests = friend_service.get_friend_requests(&actor, query.0).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[post("")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<CreateFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<CreateFriendRequestOutcome>, error::Error> {
    let actor = get_actor(&req)?;
    let locale =
        request_locale(&req).unwrap_or_else(|| friend_service.default_locale().to_string());

    let outcome = friend_service.send_friend_request(&actor, body.0, &locale).await?;

    Ok(match outcome {
        CreateFriendRequestOutcome::Created(_) => {
            success::Success::created(Some(outcome)).message("Friend request sent successfully")
        }
        CreateFriendRequestOutcome::ReferralLink(_) => {
            success::Success::ok(Some(outcome)).message("Referral link generated")
        }
    })
}

#[get("/{token}")]
pub async fn get_friend_request(
    friend_service: web::Data<FriendService>,
    token: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestResponse>, error::Error> {
    let actor = get_actor(&req)?;
    let request = friend_service.get_friend_request(&actor, *token).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request retrieved successfully"))
}

#[delete("/{token}")]
pub async fn delete_friend_request(
    friend_service: web::Data<FriendService>,
    token: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_actor(&req)?;
    friend_service.delete_friend_request(&actor, *token).await?;
    Ok(success::Success::no_content())
}

#[post("/{token}/confirm")]
pub async fn confirm_friend_request(
    friend_service: web::Data<FriendService>,
    token: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_actor(&req)?;
    friend_service.confirm_friend_request(&actor, *token).await?;

    Ok(success::Success::ok(None).message("Friend request confirmed successfully"))
}

#[delete("/{token}/reject")]
pub async fn reject_friend_request(
    friend_service: web::Data<FriendService>,
    token: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_actor(&req)?;
    friend_service.reject_friend_request(&actor, *token).await?;
    Ok(success::Success::no_content())
}

#[delete("/{token}/cancel")]
pub async fn cancel_friend_request(
    friend_service: web::Data<FriendService>,
    token: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_actor(&req)?;
    friend_service.cancel_friend_request(&actor, *token).await?;
    Ok(success::Success::no_content())
}

#[get("/friends")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let actor = get_actor(&req)?;
    let friends = friend_service.get_friends(&actor).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[delete("/delete-friend")]
pub async fn remove_friend(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<RemoveFriendBody>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_actor(&req)?;
    friend_service.remove_friend(&actor, body.0.user_id).await?;
    Ok(success::Success::no_content())
}
