use crate::api_error::ApiError;
use crate::cache;
use crate::models::{AuthUser, Benchmark, BenchmarkInput, User};
use actix_web::http::{header, StatusCode};
use actix_web::{delete, get, post, put, web, HttpResponse};

use serde_json::json;

fn failure(status_code: u16, error: &str) -> HttpResponse {
    let status_code =
        StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status_code).json(json!({ "success": false, "error": error }))
}

#[get("/benchmarks/")]
async fn find_all() -> Result<HttpResponse, ApiError> {
    let benchmarks = Benchmark::find_active()?;

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, cache::etag("/benchmarks")))
        .json(benchmarks))
}

#[get("/benchmarks/{id}/")]
async fn find(id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let benchmark = Benchmark::find_detail(&id)?;

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, cache::etag(&format!("/benchmarks/{}", id))))
        .json(benchmark))
}

#[get("/admin/benchmarks/")]
async fn admin_find_all(identity: AuthUser) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    let benchmarks = Benchmark::find_all()?;

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, cache::etag("/admin")))
        .json(benchmarks))
}

#[post("/benchmarks/")]
async fn create(
    input: web::Json<BenchmarkInput>,
    identity: AuthUser,
) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    let input = input.into_inner();
    if input.title.trim().is_empty() {
        return Ok(failure(422, "Title is required"));
    }

    match Benchmark::create(input, identity.id) {
        Ok(benchmark) => {
            cache::revalidate("/benchmarks");
            cache::revalidate("/admin");

            Ok(HttpResponse::Ok().json(json!({ "success": true, "benchmark_id": benchmark.id })))
        }
        Err(err) => {
            error!("Failed to create benchmark: {}", err);
            Ok(failure(err.status_code, "Failed to create benchmark"))
        }
    }
}

#[put("/benchmarks/{id}/")]
async fn update(
    id: web::Path<String>,
    input: web::Json<BenchmarkInput>,
    identity: AuthUser,
) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    let input = input.into_inner();
    if input.title.trim().is_empty() {
        return Ok(failure(422, "Title is required"));
    }

    match Benchmark::update(&id.into_inner(), input) {
        Ok(_) => {
            cache::revalidate("/benchmarks");
            cache::revalidate("/admin");

            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Err(err) => {
            error!("Failed to update benchmark: {}", err);
            Ok(failure(err.status_code, "Failed to update benchmark"))
        }
    }
}

#[delete("/benchmarks/{id}/")]
async fn delete_benchmark(
    id: web::Path<String>,
    identity: AuthUser,
) -> Result<HttpResponse, ApiError> {
    User::require_admin(identity.id)?;

    match Benchmark::delete(&id.into_inner()) {
        Ok(_) => {
            cache::revalidate("/benchmarks");
            cache::revalidate("/admin");

            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Err(err) if err.is_constraint_violation() => {
            Ok(failure(409, "Benchmark has existing submissions"))
        }
        Err(err) => {
            error!("Failed to delete benchmark: {}", err);
            Ok(failure(err.status_code, "Failed to delete benchmark"))
        }
    }
}

pub fn benchmark_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
    cfg.service(admin_find_all);
    cfg.service(create);
    cfg.service(update);
    cfg.service(delete_benchmark);
}
