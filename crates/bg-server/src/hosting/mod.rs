//! Single websocket route that upgrades a connection and hands it to
//! [`bg_hosting::Gateway::bridge`].
//!
//! Grounded on the teacher's `crates/server/src/hosting/handlers.rs`
//! `enter()`: token read out of the query string, `actix_ws::handle`
//! upgrade, then delegate. The teacher authenticates per-room and tolerates
//! an anonymous visitor; every session here needs a known username to seat
//! a player, so a missing or invalid token is a hard `auth_failed` instead.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;

use bg_auth::Crypto;
use bg_hosting::Gateway;

pub async fn connect(
    gateway: web::Data<Gateway>,
    crypto: web::Data<Crypto>,
    query: web::Query<HashMap<String, String>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let username = query
        .get("token")
        .and_then(|token| crypto.verify(token).ok())
        .filter(|claims| !claims.expired())
        .map(|claims| claims.usr);

    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => match gateway.bridge(username, session, stream).await {
            Ok(()) => response.map_into_left_body(),
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()).map_into_right_body(),
        },
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()).map_into_right_body(),
    }
}
