use super::post_store::{PostStore, StoreResult};
use crate::models::{Comment, Like, Post, VideoEntry};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const POST_COLUMNS: &str = "id, user_id, text, name, avatar, image, video, \
                            likes, comments, videos, created_at, version";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    text: String,
    name: String,
    avatar: String,
    image: Option<String>,
    video: Option<String>,
    likes: Json<Vec<Like>>,
    comments: Json<Vec<Comment>>,
    videos: Json<Vec<VideoEntry>>,
    created_at: DateTime<Utc>,
    version: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            user: row.user_id,
            text: row.text,
            name: row.name,
            avatar: row.avatar,
            image: row.image,
            video: row.video,
            likes: row.likes.0,
            comments: row.comments.0,
            videos: row.videos.0,
            date: row.created_at,
            version: row.version,
        }
    }
}

/// PostgreSQL-backed post store
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed successfully");
        Ok(())
    }
}

#[async_trait::async_trait]
impl PostStore for PgPostStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, post_id: Uuid) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn insert_post(&self, post: &Post) -> StoreResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (id, user_id, text, name, avatar, image, video,
                               likes, comments, videos, created_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.id)
        .bind(post.user)
        .bind(&post.text)
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(&post.image)
        .bind(&post.video)
        .bind(Json(&post.likes))
        .bind(Json(&post.comments))
        .bind(Json(&post.videos))
        .bind(post.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn replace_post(
        &self,
        post: &Post,
        expected_version: i64,
    ) -> StoreResult<Option<Post>> {
        // Owner and creation time never change after insert
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET text = $3, name = $4, avatar = $5, image = $6, video = $7,
                likes = $8, comments = $9, videos = $10, version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.id)
        .bind(expected_version)
        .bind(&post.text)
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(&post.image)
        .bind(&post.video)
        .bind(Json(&post.likes))
        .bind(Json(&post.comments))
        .bind(Json(&post.videos))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn delete_post(&self, post_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
