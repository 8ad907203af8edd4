/// Business logic layer for posts-service
pub mod posts;

pub use posts::{PostService, DEFAULT_MAX_ATTEMPTS};
