use super::post_store::{PostStore, StoreError, StoreResult};
use crate::models::Post;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process post store.
///
/// Same contract as `PgPostStore`, including the version check on rewrite.
/// Used by tests and by `STORE_BACKEND=memory` local runs.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PostStore for MemoryPostStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }

    async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.posts.read().await.get(&post_id).cloned())
    }

    async fn insert_post(&self, post: &Post) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(StoreError::Internal(format!("post {} already exists", post.id)));
        }

        let mut stored = post.clone();
        stored.version = 0;
        posts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn replace_post(
        &self,
        post: &Post,
        expected_version: i64,
    ) -> StoreResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(current) = posts.get_mut(&post.id) else {
            return Ok(None);
        };
        if current.version != expected_version {
            return Ok(None);
        }

        let mut next = post.clone();
        next.user = current.user;
        next.date = current.date;
        next.version = expected_version + 1;
        *current = next.clone();
        Ok(Some(next))
    }

    async fn delete_post(&self, post_id: Uuid) -> StoreResult<bool> {
        Ok(self.posts.write().await.remove(&post_id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post_at(offset_secs: i64) -> Post {
        let mut post = Post::new(
            Uuid::new_v4(),
            "hello".into(),
            "A".into(),
            "a.png".into(),
            None,
            None,
        );
        post.date = Utc::now() + Duration::seconds(offset_secs);
        post
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryPostStore::new();
        let older = store.insert_post(&post_at(-60)).await.unwrap();
        let newest = store.insert_post(&post_at(0)).await.unwrap();
        let middle = store.insert_post(&post_at(-30)).await.unwrap();

        let ids: Vec<Uuid> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newest.id, middle.id, older.id]);
    }

    #[tokio::test]
    async fn replace_bumps_version() {
        let store = MemoryPostStore::new();
        let mut post = store.insert_post(&post_at(0)).await.unwrap();
        post.like(Uuid::new_v4());

        let saved = store.replace_post(&post, 0).await.unwrap().unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.likes.len(), 1);
    }

    #[tokio::test]
    async fn replace_with_stale_version_is_rejected() {
        let store = MemoryPostStore::new();
        let post = store.insert_post(&post_at(0)).await.unwrap();

        let mut first = post.clone();
        first.like(Uuid::new_v4());
        assert!(store.replace_post(&first, 0).await.unwrap().is_some());

        let mut second = post.clone();
        second.like(Uuid::new_v4());
        assert!(store.replace_post(&second, 0).await.unwrap().is_none());

        let stored = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.likes, first.likes);
    }

    #[tokio::test]
    async fn replace_cannot_change_owner() {
        let store = MemoryPostStore::new();
        let post = store.insert_post(&post_at(0)).await.unwrap();

        let mut hijacked = post.clone();
        hijacked.user = Uuid::new_v4();
        let saved = store.replace_post(&hijacked, 0).await.unwrap().unwrap();
        assert_eq!(saved.user, post.user);
    }

    #[tokio::test]
    async fn delete_reports_missing_posts() {
        let store = MemoryPostStore::new();
        let post = store.insert_post(&post_at(0)).await.unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(!store.delete_post(post.id).await.unwrap());
        assert!(store.find_post(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_an_error() {
        let store = MemoryPostStore::new();
        let post = post_at(0);
        store.insert_post(&post).await.unwrap();

        assert!(matches!(
            store.insert_post(&post).await,
            Err(StoreError::Internal(_))
        ));
    }
}
