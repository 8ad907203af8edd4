/// Post service - listing, creation, deletion and nested-list mutations
use crate::db::{PostStore, StoreError};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    validate_body, Comment, CommentRequest, CreatePostRequest, Post, VideoEntry, VideoRequest,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

pub struct PostService {
    store: Arc<dyn PostStore>,
    max_attempts: u32,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Number of load/rewrite rounds a mutation gets before reporting a conflict
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn PostStore> {
        &self.store
    }

    /// All posts, newest first. An empty list is not an error.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.store.list_posts().await.map_err(|err| {
            tracing::error!(error = %err, "listing posts failed");
            AppError::NoPostsFound
        })
    }

    pub async fn get_post(&self, raw_id: &str) -> Result<Post> {
        let post_id = Uuid::parse_str(raw_id).map_err(|_| AppError::PostNotFoundById)?;

        match self.store.find_post(post_id).await {
            Ok(Some(post)) => Ok(post),
            Ok(None) => Err(AppError::PostNotFoundById),
            Err(err) => {
                tracing::error!(%post_id, error = %err, "loading post failed");
                Err(AppError::PostNotFoundById)
            }
        }
    }

    pub async fn create_post(&self, owner: Uuid, req: CreatePostRequest) -> Result<Post> {
        validate_body(&req).map_err(AppError::InvalidInput)?;

        let post = Post::new(
            owner,
            req.text,
            req.name,
            req.avatar,
            non_empty(req.image),
            non_empty(req.video),
        );

        let stored = self
            .store
            .insert_post(&post)
            .await
            .map_err(|err| store_failure("create", post.id, err))?;

        metrics::record_mutation("create", true);
        tracing::info!(post_id = %stored.id, user_id = %owner, "post created");
        Ok(stored)
    }

    /// Delete a post owned by `requester`
    pub async fn delete_post(&self, requester: Uuid, raw_id: &str) -> Result<()> {
        let post_id = parse_post_id(raw_id)?;
        let post = self.load(post_id).await?;

        if !post.is_owned_by(requester) {
            metrics::record_mutation("delete", false);
            tracing::warn!(%post_id, user_id = %requester, "delete rejected: not the owner");
            return Err(AppError::Forbidden);
        }

        let deleted = self
            .store
            .delete_post(post_id)
            .await
            .map_err(|err| store_failure("delete", post_id, err))?;
        if !deleted {
            return Err(AppError::PostNotFound);
        }

        metrics::record_mutation("delete", true);
        tracing::info!(%post_id, user_id = %requester, "post deleted");
        Ok(())
    }

    pub async fn like_post(&self, user_id: Uuid, raw_id: &str) -> Result<Post> {
        let post_id = parse_post_id(raw_id)?;
        self.mutate("like", post_id, |post| {
            if post.like(user_id) {
                Ok(())
            } else {
                Err(AppError::AlreadyLiked)
            }
        })
        .await
    }

    pub async fn unlike_post(&self, user_id: Uuid, raw_id: &str) -> Result<Post> {
        let post_id = parse_post_id(raw_id)?;
        self.mutate("unlike", post_id, |post| {
            if post.unlike(user_id) {
                Ok(())
            } else {
                Err(AppError::NotLiked)
            }
        })
        .await
    }

    pub async fn add_comment(
        &self,
        user_id: Uuid,
        raw_id: &str,
        req: CommentRequest,
    ) -> Result<Post> {
        validate_body(&req).map_err(AppError::InvalidEntry)?;
        let post_id = parse_post_id(raw_id)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            user: user_id,
            text: req.text,
            name: req.name,
            avatar: req.avatar,
            date: Utc::now(),
        };

        self.mutate("add_comment", post_id, |post| {
            post.add_comment(comment.clone());
            Ok(())
        })
        .await
    }

    /// Remove a comment. Any caller may remove any comment.
    pub async fn remove_comment(&self, raw_id: &str, raw_comment_id: &str) -> Result<Post> {
        let post_id = parse_post_id(raw_id)?;
        let comment_id = Uuid::parse_str(raw_comment_id).ok();

        self.mutate("remove_comment", post_id, |post| match comment_id {
            Some(id) if post.remove_comment(id) => Ok(()),
            _ => Err(AppError::CommentNotFound),
        })
        .await
    }

    pub async fn add_video(&self, user_id: Uuid, raw_id: &str, req: VideoRequest) -> Result<Post> {
        validate_body(&req).map_err(AppError::InvalidEntry)?;
        let post_id = parse_post_id(raw_id).map_err(|_| AppError::VideoPostNotFound)?;

        let entry = VideoEntry {
            id: Uuid::new_v4(),
            user: user_id,
            text: req.text,
            name: req.name,
            avatar: req.avatar,
            video: req.video,
        };

        self.mutate("add_video", post_id, |post| {
            post.add_video(entry.clone());
            Ok(())
        })
        .await
        .map_err(|err| match err {
            AppError::PostNotFound => AppError::VideoPostNotFound,
            other => other,
        })
    }

    /// Remove a video entry. Any caller may remove any entry.
    pub async fn remove_video(&self, raw_id: &str, raw_video_id: &str) -> Result<Post> {
        let post_id = parse_post_id(raw_id)?;
        let video_id = Uuid::parse_str(raw_video_id).ok();

        self.mutate("remove_video", post_id, |post| match video_id {
            Some(id) if post.remove_video(id) => Ok(()),
            _ => Err(AppError::VideoNotFound),
        })
        .await
    }

    async fn load(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await
            .map_err(|err| store_failure("load", post_id, err))?
            .ok_or(AppError::PostNotFound)
    }

    /// Load -> apply -> rewrite with a version check, reloading on conflict.
    ///
    /// `apply` may run more than once and must only touch the post it is given.
    async fn mutate<F>(&self, operation: &'static str, post_id: Uuid, mut apply: F) -> Result<Post>
    where
        F: FnMut(&mut Post) -> Result<()> + Send,
    {
        for attempt in 1..=self.max_attempts {
            let mut post = self.load(post_id).await?;
            let loaded_version = post.version;

            if let Err(err) = apply(&mut post) {
                metrics::record_mutation(operation, false);
                return Err(err);
            }

            let saved = self
                .store
                .replace_post(&post, loaded_version)
                .await
                .map_err(|err| store_failure(operation, post_id, err))?;

            if let Some(saved) = saved {
                metrics::record_mutation(operation, true);
                tracing::debug!(%post_id, operation, version = saved.version, "post updated");
                return Ok(saved);
            }

            metrics::record_version_conflict(operation);
            tracing::warn!(
                %post_id,
                operation,
                attempt,
                "post changed while updating, reloading"
            );
        }

        Err(AppError::Conflict)
    }
}

fn parse_post_id(raw_id: &str) -> Result<Uuid> {
    Uuid::parse_str(raw_id).map_err(|_| AppError::PostNotFound)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn store_failure(operation: &'static str, post_id: Uuid, err: StoreError) -> AppError {
    tracing::error!(%post_id, operation, error = %err, "post store operation failed");
    AppError::Store(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryPostStore, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> PostService {
        PostService::new(Arc::new(MemoryPostStore::new()))
    }

    fn create_req(text: &str) -> CreatePostRequest {
        CreatePostRequest {
            text: text.into(),
            name: "A".into(),
            avatar: "a.png".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_text() {
        let svc = service();
        let err = svc
            .create_post(Uuid::new_v4(), create_req(""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref e) if e.contains_key("text")));
        assert!(svc.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_optional_urls_are_dropped() {
        let svc = service();
        let mut req = create_req("hello");
        req.image = Some("  ".into());
        req.video = Some("https://cdn.example.com/v.mp4".into());

        let post = svc.create_post(Uuid::new_v4(), req).await.unwrap();
        assert_eq!(post.image, None);
        assert_eq!(post.video.as_deref(), Some("https://cdn.example.com/v.mp4"));
        assert!(post.videos.is_empty());
    }

    #[tokio::test]
    async fn delete_by_other_user_is_forbidden() {
        let svc = service();
        let owner = Uuid::new_v4();
        let post = svc.create_post(owner, create_req("hello")).await.unwrap();
        let id = post.id.to_string();

        let err = svc.delete_post(Uuid::new_v4(), &id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        assert_eq!(svc.get_post(&id).await.unwrap(), post);

        svc.delete_post(owner, &id).await.unwrap();
        assert!(matches!(
            svc.get_post(&id).await.unwrap_err(),
            AppError::PostNotFoundById
        ));
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let svc = service();
        assert!(matches!(
            svc.get_post("not-a-uuid").await.unwrap_err(),
            AppError::PostNotFoundById
        ));
        assert!(matches!(
            svc.like_post(Uuid::new_v4(), "not-a-uuid").await.unwrap_err(),
            AppError::PostNotFound
        ));
    }

    #[tokio::test]
    async fn video_on_missing_post_reports_video_not_found() {
        let svc = service();
        let req = VideoRequest {
            text: "clip".into(),
            video: "https://cdn.example.com/clip.mp4".into(),
            ..Default::default()
        };

        let err = svc
            .add_video(Uuid::new_v4(), &Uuid::new_v4().to_string(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VideoPostNotFound));
    }

    #[tokio::test]
    async fn remove_comment_with_malformed_id_reports_missing_comment() {
        let svc = service();
        let post = svc
            .create_post(Uuid::new_v4(), create_req("hello"))
            .await
            .unwrap();

        let err = svc
            .remove_comment(&post.id.to_string(), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CommentNotFound));
    }

    #[tokio::test]
    async fn rejected_mutation_does_not_bump_version() {
        let svc = service();
        let user = Uuid::new_v4();
        let post = svc
            .create_post(Uuid::new_v4(), create_req("hello"))
            .await
            .unwrap();
        let id = post.id.to_string();

        let liked = svc.like_post(user, &id).await.unwrap();
        assert_eq!(liked.version, 1);

        assert!(matches!(
            svc.like_post(user, &id).await.unwrap_err(),
            AppError::AlreadyLiked
        ));
        let stored = svc.get_post(&id).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.likes.len(), 1);
    }

    /// Store whose first `conflicts` rewrites lose a race against another writer.
    struct RacingStore {
        inner: MemoryPostStore,
        conflicts: AtomicUsize,
        intruder: Uuid,
    }

    #[async_trait::async_trait]
    impl PostStore for RacingStore {
        async fn list_posts(&self) -> StoreResult<Vec<Post>> {
            self.inner.list_posts().await
        }

        async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>> {
            self.inner.find_post(post_id).await
        }

        async fn insert_post(&self, post: &Post) -> StoreResult<Post> {
            self.inner.insert_post(post).await
        }

        async fn replace_post(
            &self,
            post: &Post,
            expected_version: i64,
        ) -> StoreResult<Option<Post>> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                // Another writer sneaks in a like first
                if let Some(mut current) = self.inner.find_post(post.id).await? {
                    let version = current.version;
                    current.like(self.intruder);
                    self.inner.replace_post(&current, version).await?;
                }
            }
            self.inner.replace_post(post, expected_version).await
        }

        async fn delete_post(&self, post_id: Uuid) -> StoreResult<bool> {
            self.inner.delete_post(post_id).await
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_write_is_retried_and_both_survive() {
        let intruder = Uuid::new_v4();
        let store = Arc::new(RacingStore {
            inner: MemoryPostStore::new(),
            conflicts: AtomicUsize::new(1),
            intruder,
        });
        let svc = PostService::new(store);
        let post = svc
            .create_post(Uuid::new_v4(), create_req("hello"))
            .await
            .unwrap();

        let user = Uuid::new_v4();
        let saved = svc.like_post(user, &post.id.to_string()).await.unwrap();

        assert_eq!(saved.likes.len(), 2);
        assert!(saved.has_liked(user));
        assert!(saved.has_liked(intruder));
    }

    #[tokio::test]
    async fn exhausted_retries_report_conflict() {
        let store = Arc::new(RacingStore {
            inner: MemoryPostStore::new(),
            conflicts: AtomicUsize::new(10),
            intruder: Uuid::new_v4(),
        });
        let svc = PostService::new(store).with_max_attempts(2);
        let post = svc
            .create_post(Uuid::new_v4(), create_req("hello"))
            .await
            .unwrap();

        let err = svc
            .like_post(Uuid::new_v4(), &post.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict));
    }
}
