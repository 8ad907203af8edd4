/// Data models for posts-service
///
/// This module defines structures for:
/// - Post: top-level content item owned by a user
/// - Like / Comment / VideoEntry: entries nested inside a Post
/// - Request bodies accepted by the HTTP handlers, with their validation rules
pub mod post;
pub mod requests;

pub use post::{Comment, Like, Post, VideoEntry};
pub use requests::{
    validate_body, CommentRequest, CreatePostRequest, FieldErrors, VideoRequest,
};
