use crate::models::Post;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store holding Post documents.
///
/// Writes are whole-document: nested likes, comments and video entries are
/// persisted together with their parent.
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>>;

    /// Persist a new post. The returned post carries the stored version.
    async fn insert_post(&self, post: &Post) -> StoreResult<Post>;

    /// Rewrite a post if its stored version still equals `expected_version`.
    ///
    /// Returns the saved post with a bumped version, or `None` when the
    /// document was changed or removed since it was loaded.
    async fn replace_post(&self, post: &Post, expected_version: i64)
        -> StoreResult<Option<Post>>;

    /// Remove a post and everything nested in it. Returns false if it did not exist.
    async fn delete_post(&self, post_id: Uuid) -> StoreResult<bool>;

    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> StoreResult<()>;
}
