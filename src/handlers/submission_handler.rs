use crate::api_error::ApiError;
use crate::cache;
use crate::models::{AuthUser, Submission, SubmissionInput, SubmissionStatus, User};
use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use serde_json::json;

/// Public leaderboard feed: approved submissions only.
#[get("/submissions/")]
async fn find_all() -> Result<HttpResponse, ApiError> {
    let submissions = Submission::find_approved()?;

    Ok(HttpResponse::Ok().json(submissions))
}

#[get("/submissions/{id}/")]
async fn find(id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let submission = Submission::find_view(id.into_inner())?;

    Ok(HttpResponse::Ok().json(submission))
}

#[post("/submissions/")]
async fn submit(
    input: web::Json<SubmissionInput>,
    identity: Option<AuthUser>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();

    let identity = match identity {
        Some(identity) => identity,
        None => {
            return Ok(HttpResponse::Unauthorized().json(json!({
                "message": "You must be logged in to submit a solution.",
                "fields": input,
            })));
        }
    };

    let input = input.with_session_defaults(&identity);

    let errors = input.validate();
    if !errors.is_empty() {
        return Ok(HttpResponse::UnprocessableEntity().json(json!({
            "errors": errors,
            "message": "Validation Failed. Please check your inputs.",
            "fields": input,
        })));
    }

    match Submission::create(input.into_message(identity.id)) {
        Ok(submission) => {
            cache::revalidate(&format!("/benchmarks/{}", submission.benchmark_id));

            Ok(HttpResponse::SeeOther()
                .insert_header((
                    header::LOCATION,
                    format!("/benchmarks/{}/submit/success", submission.benchmark_id),
                ))
                .finish())
        }
        Err(err) => {
            error!("Database error: failed to create submission: {}", err);

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Database Error: Failed to Create Submission.",
            })))
        }
    }
}

/// Dashboard: the signed-in caller's own submissions.
#[get("/user/submissions/")]
async fn user_submissions(identity: AuthUser) -> Result<HttpResponse, ApiError> {
    let submissions = Submission::find_by_user(identity.id)?;

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, cache::etag("/dashboard")))
        .json(submissions))
}

/// Moderation queue: pending submissions, oldest first.
#[get("/admin/submissions/")]
async fn admin_queue(identity: AuthUser) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    let submissions = Submission::find_pending()?;

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, cache::etag("/admin")))
        .json(submissions))
}

#[post("/submissions/{id}/approve/")]
async fn approve(id: web::Path<Uuid>, identity: AuthUser) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    let submission = Submission::set_status(id.into_inner(), SubmissionStatus::Approved)?;

    cache::revalidate("/admin");
    cache::revalidate("/dashboard");
    cache::revalidate("/benchmarks");

    Ok(HttpResponse::Ok().json(submission))
}

#[post("/submissions/{id}/reject/")]
async fn reject(id: web::Path<Uuid>, identity: AuthUser) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    let submission = Submission::set_status(id.into_inner(), SubmissionStatus::Rejected)?;

    cache::revalidate("/admin");
    cache::revalidate("/dashboard");
    cache::revalidate("/benchmarks");

    Ok(HttpResponse::Ok().json(submission))
}

pub fn submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
    cfg.service(submit);
    cfg.service(user_submissions);
    cfg.service(admin_queue);
    cfg.service(approve);
    cfg.service(reject);
}
