use crate::api_error::ApiError;
use crate::cache;
use crate::handlers::ClientInfo;
use crate::models::{AuthUser, Like};
use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use serde_json::json;

/// Toggle a like for the caller's fingerprint. Failures come back as a
/// `success: false` payload rather than an error status so the optimistic
/// UI can quietly revert.
#[post("/submissions/{id}/like/")]
async fn toggle_like(
    id: web::Path<Uuid>,
    identity: Option<AuthUser>,
    client: ClientInfo,
) -> Result<HttpResponse, ApiError> {
    let fingerprint = Like::fingerprint(
        identity.map(|identity| identity.id),
        &client.ip,
        &client.user_agent,
    );

    match Like::toggle(id.into_inner(), &fingerprint) {
        Ok(liked) => {
            cache::revalidate("/benchmarks");
            cache::revalidate("/dashboard");

            Ok(HttpResponse::Ok().json(json!({ "success": true, "liked": liked })))
        }
        Err(err) => {
            error!("Failed to toggle like: {}", err);

            Ok(HttpResponse::Ok()
                .json(json!({ "success": false, "error": "Failed to toggle like" })))
        }
    }
}

/// Primes the like button state; never mutates, errors read as "not liked".
#[get("/submissions/{id}/liked/")]
async fn check_liked(
    id: web::Path<Uuid>,
    identity: Option<AuthUser>,
    client: ClientInfo,
) -> Result<HttpResponse, ApiError> {
    let fingerprint = Like::fingerprint(
        identity.map(|identity| identity.id),
        &client.ip,
        &client.user_agent,
    );

    let liked = Like::exists(id.into_inner(), &fingerprint).unwrap_or(false);

    Ok(HttpResponse::Ok().json(liked))
}

pub fn like_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(toggle_like);
    cfg.service(check_liked);
}
