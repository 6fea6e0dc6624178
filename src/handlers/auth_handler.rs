use actix_identity::Identity;
use actix_web::http::header;
use actix_web::{dev::Payload, get, web, FromRequest, HttpRequest, HttpResponse};
use futures::future::{err, ok, Ready};

use crate::api_error::ApiError;
use crate::config;
use crate::models::{AuthUser, User};

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<AuthUser, ApiError>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        if let Ok(identity) = Identity::from_request(req, pl).into_inner() {
            if let Some(user_json) = identity.identity() {
                if let Ok(user) = serde_json::from_str(&user_json) {
                    return ok(user);
                }
            }
        }
        err(ApiError::new(401, "Invalid Request".to_string()))
    }
}

/// Network signals feeding the like fingerprint. Always succeeds;
/// missing headers degrade to "unknown".
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

impl FromRequest for ClientInfo {
    type Error = ApiError;
    type Future = Ready<Result<ClientInfo, ApiError>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        ok(ClientInfo { ip, user_agent })
    }
}

/// Returns the current user, materializing the row on first sight of a
/// session identity. Role is decided here, once, from the allow-list.
#[get("/me/")]
async fn me(identity: AuthUser) -> Result<HttpResponse, ApiError> {
    let user = User::ensure(&identity, &config::get().admin_emails)?;

    Ok(HttpResponse::Ok().json(user))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(me);
}
