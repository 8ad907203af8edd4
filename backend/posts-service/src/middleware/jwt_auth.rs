use crate::error::AppError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Verifies HS256 bearer tokens issued by the users service.
///
/// Registered as app data; `UserId` looks it up on every authenticated route.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }

    fn user_id_from_header(&self, header: Option<&str>) -> Result<Uuid, AppError> {
        let header =
            header.ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let claims = self.validate(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        Uuid::parse_str(&claims.sub).map_err(|e| {
            tracing::warn!("Invalid user_id UUID in token: {}", e);
            AppError::Unauthorized("Invalid token: malformed user_id".into())
        })
    }
}

/// Authenticated user identifier.
///
/// Taking `UserId` as a handler argument makes the route require a valid
/// bearer token; the request is rejected with 401 before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(validator) = req.app_data::<web::Data<JwtValidator>>() else {
            tracing::error!("JwtValidator missing from app data");
            return ready(Err(AppError::Unauthorized(
                "Authentication is not configured".into(),
            )));
        };

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        ready(validator.user_id_from_header(header).map(UserId))
    }
}
