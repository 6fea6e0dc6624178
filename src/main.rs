#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;
#[macro_use]
extern crate log;

mod api_error;
mod cache;
mod config;
mod db;
mod handlers;
mod models;
mod schema;
mod seed;

use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{get, App, HttpResponse, HttpServer, Responder};
use dotenv::dotenv;
use listenfd::ListenFd;
use std::env;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Hello from vibebench 👋")
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    db::init();

    if env::args().any(|arg| arg == "--seed") {
        if let Err(err) = seed::run() {
            error!("Seed failed: {}", err);
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut listenfd = ListenFd::from_env();

    let mut server = HttpServer::new(|| {
        let secret = config::get().secret.as_bytes();
        App::new()
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(secret)
                    .name("vibebench-auth")
                    .secure(false),
            ))
            .service(index)
            .configure(handlers::auth_routes)
            .configure(handlers::benchmark_routes)
            .configure(handlers::submission_routes)
            .configure(handlers::like_routes)
            .configure(handlers::upload_routes)
    });

    server = match listenfd.take_tcp_listener(0)? {
        Some(listener) => server.listen(listener)?,
        None => {
            let host: String = env::var("HOST").expect("Host not set");
            let port: String = env::var("PORT").expect("Port not set");
            server.bind(format!("{}:{}", host, port))?
        }
    };

    info!("Starting server 🚀");

    server.run().await
}
