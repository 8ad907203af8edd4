/// Error types for Posts Service
///
/// Every failure a handler can produce is one of these variants. Each variant
/// renders as a fixed status code and a single-key JSON body, so clients can
/// branch on the key (`alreadyliked`, `postnotfound`, ...).
use crate::db::StoreError;
use crate::models::FieldErrors;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for posts-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation (post creation)
    #[error("Validation failed: {0:?}")]
    InvalidInput(FieldErrors),

    /// Nested entry body failed validation (comment / video add)
    #[error("Entry validation failed: {0:?}")]
    InvalidEntry(FieldErrors),

    #[error("No posts found")]
    NoPostsFound,

    #[error("No post found with that ID")]
    PostNotFoundById,

    #[error("No post found")]
    PostNotFound,

    #[error("User not authorized")]
    Forbidden,

    #[error("User already liked this post")]
    AlreadyLiked,

    #[error("You have not yet liked this post")]
    NotLiked,

    #[error("Comment does not exist")]
    CommentNotFound,

    /// Target post of a video add is missing
    #[error("Video not found")]
    VideoPostNotFound,

    #[error("Video does not exist")]
    VideoNotFound,

    #[error("Post was modified concurrently, retry")]
    Conflict,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// JSON body: a field map for validation failures, otherwise one key
    /// naming the error kind
    fn body(&self) -> serde_json::Value {
        let key = match self {
            AppError::InvalidInput(errors) | AppError::InvalidEntry(errors) => {
                return field_map(errors)
            }
            // Underlying cause is logged where it happened; clients only see not-found
            AppError::Store(_) => {
                return keyed("postnotfound", AppError::PostNotFound.to_string())
            }
            AppError::NoPostsFound => "nopostsfound",
            AppError::PostNotFoundById => "nopostfound",
            AppError::PostNotFound => "postnotfound",
            AppError::Forbidden => "notauthorized",
            AppError::AlreadyLiked => "alreadyliked",
            AppError::NotLiked => "notliked",
            AppError::CommentNotFound => "commentnotexists",
            AppError::VideoPostNotFound => "videonotfound",
            AppError::VideoNotFound => "videonotexists",
            AppError::Conflict => "conflict",
            AppError::Unauthorized(_) => "unauthorized",
        };
        keyed(key, self.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            // Nested entry routes report validation failures as 404
            AppError::InvalidEntry(_) => StatusCode::NOT_FOUND,
            AppError::NoPostsFound
            | AppError::PostNotFoundById
            | AppError::PostNotFound
            | AppError::CommentNotFound
            | AppError::VideoPostNotFound
            | AppError::VideoNotFound
            | AppError::Store(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::AlreadyLiked | AppError::NotLiked => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

fn field_map(errors: &FieldErrors) -> serde_json::Value {
    serde_json::Value::Object(
        errors
            .iter()
            .map(|(field, message)| (field.clone(), serde_json::Value::String(message.clone())))
            .collect(),
    )
}

fn keyed(key: &str, message: String) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), serde_json::Value::String(message));
    serde_json::Value::Object(body)
}
