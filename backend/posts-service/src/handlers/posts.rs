/// Post handlers - HTTP endpoints under `/api/posts`
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{CommentRequest, CreatePostRequest, FieldErrors, VideoRequest};
use crate::services::PostService;
use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};

/// Body field an unreadable request payload is reported under
pub const BODY_FIELD: &str = "body";

/// Describe a payload that never reached validation as a field error
fn payload_errors(err: &JsonPayloadError) -> FieldErrors {
    let message = match err {
        JsonPayloadError::ContentType => "Request body must be JSON".to_string(),
        JsonPayloadError::Deserialize(e) if e.is_eof() => "Request body is required".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_string()
        }
        other => format!("Request body could not be read: {}", other),
    };

    let mut errors = FieldErrors::new();
    errors.insert(BODY_FIELD.to_string(), message);
    errors
}

/// JSON extractor config for post creation: unreadable bodies are 400 field maps
pub fn post_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req: &HttpRequest| {
        tracing::debug!(path = %req.path(), error = %err, "rejected post body");
        AppError::InvalidInput(payload_errors(&err)).into()
    })
}

/// JSON extractor config for nested entries: unreadable bodies are 404 field maps
pub fn entry_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req: &HttpRequest| {
        tracing::debug!(path = %req.path(), error = %err, "rejected entry body");
        AppError::InvalidEntry(payload_errors(&err)).into()
    })
}

/// Smoke-test route
pub async fn posts_test() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "msg": "Posts works" }))
}

/// List all posts, newest first
pub async fn list_posts(service: web::Data<PostService>) -> Result<HttpResponse> {
    let posts = service.list_posts().await?;

    if posts.is_empty() {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "nopostsfound": "No posts found"
        })));
    }

    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post = service.get_post(&post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Create a new post owned by the caller
pub async fn create_post(
    user_id: UserId,
    service: web::Data<PostService>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = service.create_post(user_id.0, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post owned by the caller
pub async fn delete_post(
    user_id: UserId,
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    service.delete_post(user_id.0, &post_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub async fn like_post(
    user_id: UserId,
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post = service.like_post(user_id.0, &post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn unlike_post(
    user_id: UserId,
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post = service.unlike_post(user_id.0, &post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn add_comment(
    user_id: UserId,
    service: web::Data<PostService>,
    post_id: web::Path<String>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let post = service
        .add_comment(user_id.0, &post_id, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Remove a comment. Public route: no ownership check.
pub async fn remove_comment(
    service: web::Data<PostService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post = service.remove_comment(&post_id, &comment_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn add_video(
    user_id: UserId,
    service: web::Data<PostService>,
    post_id: web::Path<String>,
    req: web::Json<VideoRequest>,
) -> Result<HttpResponse> {
    let post = service
        .add_video(user_id.0, &post_id, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Remove a video entry. Public route: no ownership check.
pub async fn remove_video(
    service: web::Data<PostService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (post_id, video_id) = path.into_inner();
    let post = service.remove_video(&post_id, &video_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Configure routes for the posts resource
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/posts")
            .app_data(post_json_config())
            .route("/test", web::get().to(posts_test))
            .service(
                web::resource(["", "/"])
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .route("/like/{id}", web::post().to(like_post))
            .route("/unlike/{id}", web::post().to(unlike_post))
            .service(
                web::resource("/comment/{id}")
                    .app_data(entry_json_config())
                    .route(web::post().to(add_comment)),
            )
            .route(
                "/comment/{id}/{comment_id}",
                web::delete().to(remove_comment),
            )
            .service(
                web::resource("/video/{id}")
                    .app_data(entry_json_config())
                    .route(web::post().to(add_video)),
            )
            .route("/video/{id}/{video_id}", web::delete().to(remove_video))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_post))
                    .route(web::delete().to(delete_post)),
            ),
    );
}
