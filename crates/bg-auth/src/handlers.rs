#![cfg(feature = "server")]

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use tokio_postgres::Client;

use bg_core::Unique;

use crate::crypto::Crypto;
use crate::dto::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use crate::password;
use crate::repository::AuthRepository;
use crate::session::Session;

pub async fn register(
    db: web::Data<Arc<Client>>,
    crypto: web::Data<Crypto>,
    body: web::Json<RegisterRequest>,
) -> HttpResponse {
    if !password::username_is_valid(&body.username) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": "username must be 3-20 alphanumeric characters or underscores"
        }));
    }
    if !password::password_is_valid(&body.password) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": "password must be at least 8 characters with a letter and a digit"
        }));
    }

    match db.get_ref().exists(&body.username).await {
        Ok(true) => return HttpResponse::Conflict().json(serde_json::json!({ "message": "username taken" })),
        Ok(false) => {}
        Err(e) => return HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    }

    let hashed = match password::hash(&body.password) {
        Ok(h) => h,
        Err(e) => return HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    };

    let member = match db.get_ref().create(&body.username, &hashed).await {
        Ok(member) => member,
        Err(e) => return HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    };

    let session = Session::new();
    let token = match crypto.get_ref().issue(&member, &session) {
        Ok(t) => t,
        Err(e) => return HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserInfo {
            username: member.username().to_string(),
            elo: 0,
            money: 500,
            diamonds: 10,
            icon: "default.png".to_string(),
        },
    })
}

pub async fn login(
    db: web::Data<Arc<Client>>,
    crypto: web::Data<Crypto>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    let record = match db.get_ref().lookup(&body.username).await {
        Ok(Some(record)) => record,
        Ok(None) => return HttpResponse::Unauthorized().json(serde_json::json!({ "message": "invalid credentials" })),
        Err(e) => return HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    };

    if !password::verify(&body.password, &record.password_hash) {
        return HttpResponse::Unauthorized().json(serde_json::json!({ "message": "invalid credentials" }));
    }

    let session = Session::new();
    let token = match crypto.get_ref().issue(&record.member, &session) {
        Ok(t) => t,
        Err(e) => return HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserInfo {
            username: record.member.username().to_string(),
            elo: record.elo,
            money: record.money,
            diamonds: record.diamonds,
            icon: record.icon,
        },
    })
}

/// Stateless logout: the token is not server-side revocable (no session
/// table, per the out-of-scope rate-limiting/persistence bullets in §1);
/// this endpoint exists so clients have a uniform call to discard their
/// token against, and so a future revocation list has a natural home.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "logged out" }))
}

pub async fn me(db: web::Data<Arc<Client>>, crypto: web::Data<Crypto>, req: actix_web::HttpRequest) -> HttpResponse {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::Unauthorized().json(serde_json::json!({ "message": "missing bearer token" }));
    };
    let claims = match crypto.get_ref().verify(&token) {
        Ok(claims) => claims,
        Err(e) => return HttpResponse::Unauthorized().json(serde_json::json!({ "message": e.to_string() })),
    };
    match db.get_ref().lookup(&claims.usr).await {
        Ok(Some(record)) => HttpResponse::Ok().json(UserInfo {
            username: record.member.username().to_string(),
            elo: record.elo,
            money: record.money,
            diamonds: record.diamonds,
            icon: record.icon,
        }),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "message": "AUTH_USER_NOT_FOUND" })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "message": e.to_string() })),
    }
}

fn bearer_token(req: &actix_web::HttpRequest) -> Option<String> {
    let header = req.headers().get(actix_web::http::header::AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(|s| s.to_string())
}
