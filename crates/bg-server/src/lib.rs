//! Unified backend server: auth HTTP routes plus the single websocket
//! route that drives every live game through [`bg_hosting::Gateway`].
//!
//! Grounded on the teacher's `crates/server` (`src/lib.rs`'s `run()`):
//! same `Logger`/permissive-CORS wrapping, same `/health` and `/auth/*`
//! routes. The teacher's `/room/start`/`/room/enter`/`/room/leave` HTTP
//! endpoints have no counterpart here — a backgammon session is created
//! by an inbound websocket event (`start_pve`/`find_pvp_match`), not a
//! separate HTTP call, so there is nothing for those routes to do.

pub mod hosting;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tokio_postgres::Client;

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client.execute("SELECT 1", &[]).await {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(e) => {
            log::error!("health check failed: {e}");
            HttpResponse::ServiceUnavailable().body("database unavailable")
        }
    }
}

/// Startup overrides the `server` binary's CLI can supply on top of the
/// `BIND_ADDR`/`DB_URL`/`WORKER_THREADS` environment variables (§1's
/// "Configuration"). `None` leaves the corresponding environment
/// variable (or its default) in charge.
#[derive(Default)]
pub struct Config {
    pub bind: Option<String>,
    pub db_url: Option<String>,
    pub workers: Option<usize>,
}

fn worker_count(config: &Config) -> usize {
    config
        .workers
        .or_else(|| std::env::var("WORKER_THREADS").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(6)
}

#[rustfmt::skip]
pub async fn run(config: Config) -> Result<(), std::io::Error> {
    if let Some(db_url) = &config.db_url {
        std::env::set_var("DB_URL", db_url);
    }
    let bind = config.bind.clone().unwrap_or_else(|| std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"));
    let workers = worker_count(&config);

    let client = bg_database::db().await;
    bg_database::migrate(&client).await.expect("users table migration failed");

    let crypto = web::Data::new(bg_auth::Crypto::from_env());
    let stats_log = Arc::new(bg_database::StatsLog::open("logs/stats.jsonl").expect("open stats log"));
    let gateway = web::Data::new(bg_hosting::Gateway::new(client.clone(), stats_log));
    let client = web::Data::new(client);

    log::info!("starting backgammon server on {bind} with {workers} workers");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(crypto.clone())
            .app_data(gateway.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(bg_auth::register))
                    .route("/logout", web::post().to(bg_auth::logout))
                    .route("/login", web::post().to(bg_auth::login))
                    .route("/me", web::get().to(bg_auth::me)),
            )
            .route("/ws", web::get().to(hosting::connect))
    })
    .workers(workers)
    .bind(bind)?
    .run()
    .await
}
