use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    Error, HttpMessage, HttpRequest,
};
use futures_util::{future::LocalBoxFuture, FutureExt};

use crate::{api::error, modules::user::model::Actor, utils::Claims, ENV};

/// Reads `Authorization: Bearer <jwt>`. A missing header is 401, a token that
/// fails to decode with `secret` is 403.
pub fn bearer_claims(req: &ServiceRequest, secret: &[u8]) -> Result<Claims, error::Error> {
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired"));
        }
    };

    Claims::decode(token, secret).map_err(|_| error::Error::forbidden("Token Invalid or Expired"))
}

pub fn authentication<B>(
    secret: &'static [u8],
) -> impl Fn(ServiceRequest, Next<B>) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>
where
    B: MessageBody + 'static,
{
    move |req: ServiceRequest, next: Next<B>| {
        async move {
            let claims = bearer_claims(&req, secret)?;
            req.extensions_mut().insert(claims);

            next.call(req).await
        }
        .boxed_local()
    }
}

/// Rejects requests whose `Host` is not listed in `ALLOWED_HOSTS`, unless running in debug.
pub async fn allowed_hosts<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    if !ENV.debug {
        let host = req.connection_info().host().to_string();
        if !host_allowed(&host, &ENV.allowed_hosts) {
            log::warn!("Rejected request with host {host}");
            return Err(error::Error::bad_request("Invalid host header").into());
        }
    }

    next.call(req).await
}

pub fn host_allowed(host: &str, allowed: &[String]) -> bool {
    let name = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };

    allowed.iter().any(|pattern| {
        if pattern == "*" {
            return true;
        }
        // ".example.com" matches the domain and every subdomain.
        match pattern.strip_prefix('.') {
            Some(domain) => {
                name.eq_ignore_ascii_case(domain)
                    || name.to_ascii_lowercase().ends_with(&pattern.to_ascii_lowercase())
            }
            None => name.eq_ignore_ascii_case(pattern),
        }
    })
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(claims)
}

pub fn get_actor(req: &HttpRequest) -> Result<Actor, error::Error> {
    get_claims(req).map(|claims| Actor::from(&claims))
}
