#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use posts_service::db::MemoryPostStore;
use posts_service::handlers;
use posts_service::middleware::{Claims, JwtValidator, RequestTiming};
use posts_service::services::PostService;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "posts-service-integration-secret-0123";

pub fn token_for(user: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.to_string(),
        exp: (now + 3600) as usize,
        iat: now as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign test token")
}

pub fn bearer(user: Uuid) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user)))
}

pub fn post_service() -> web::Data<PostService> {
    web::Data::new(PostService::new(Arc::new(MemoryPostStore::new())))
}

/// Full route table over the given service, authenticated with `TEST_SECRET`
pub fn app(
    service: web::Data<PostService>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(service)
        .app_data(web::Data::new(JwtValidator::new(TEST_SECRET)))
        .wrap(RequestTiming)
        .configure(handlers::configure)
}
