use crate::api_error::ApiError;
use crate::config;
use crate::models::AuthUser;
use actix_web::{post, web, HttpResponse};
use chrono::{Duration, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Chat logs and screenshots only; everything else is refused before a
/// grant is issued.
pub const ALLOWED_CONTENT_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "text/plain",
    "text/markdown",
    "application/json",
    "application/pdf",
];

#[derive(Deserialize)]
pub struct UploadRequest {
    pub pathname: String,
    pub content_type: String,
}

/// Short-lived grant the client hands to the external blob store. The
/// store re-derives the signature from the shared secret; this service
/// never sees the bytes.
#[derive(Serialize)]
pub struct UploadGrant {
    pub pathname: String,
    pub content_type: String,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

pub fn sign_grant(secret: &str, pathname: &str, content_type: &str, expires_at: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}|{}", secret, pathname, content_type, expires_at).as_bytes());

    base64::encode(&hasher.finalize())
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[post("/uploads/token/")]
async fn create_upload_token(
    request: web::Json<UploadRequest>,
    _identity: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();

    if !ALLOWED_CONTENT_TYPES.contains(&request.content_type.as_str()) {
        return Err(ApiError::new(
            400,
            format!("Content type {} is not allowed", request.content_type),
        ));
    }

    let pathname = format!("{}-{}", request.pathname, random_suffix(8));
    let expires_at = Utc::now() + Duration::hours(1);
    let token = sign_grant(
        &config::get().secret,
        &pathname,
        &request.content_type,
        expires_at.timestamp(),
    );

    Ok(HttpResponse::Ok().json(UploadGrant {
        pathname,
        content_type: request.content_type,
        token,
        expires_at: expires_at.naive_utc(),
    }))
}

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_upload_token);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic() {
        assert_eq!(
            sign_grant("secret", "logs/run.txt", "text/plain", 1_700_000_000),
            sign_grant("secret", "logs/run.txt", "text/plain", 1_700_000_000)
        );
    }

    #[test]
    fn signature_binds_every_field() {
        let base = sign_grant("secret", "logs/run.txt", "text/plain", 1_700_000_000);

        assert_ne!(base, sign_grant("other", "logs/run.txt", "text/plain", 1_700_000_000));
        assert_ne!(base, sign_grant("secret", "logs/other.txt", "text/plain", 1_700_000_000));
        assert_ne!(base, sign_grant("secret", "logs/run.txt", "application/pdf", 1_700_000_000));
        assert_ne!(base, sign_grant("secret", "logs/run.txt", "text/plain", 1_700_000_001));
    }

    #[test]
    fn suffix_is_alphanumeric_with_requested_length() {
        let suffix = random_suffix(8);

        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn markdown_is_allowed_executables_are_not() {
        assert!(ALLOWED_CONTENT_TYPES.contains(&"text/markdown"));
        assert!(!ALLOWED_CONTENT_TYPES.contains(&"application/octet-stream"));
    }
}
