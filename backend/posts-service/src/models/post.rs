use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's endorsement of a post. Unique per (post, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub user: Uuid,
}

/// A text reply nested in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// A user-submitted video attachment nested in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub video: String,
}

/// Post document
///
/// The nested lists have no lifecycle of their own: they are loaded, mutated
/// and persisted together with the post. `version` is the optimistic
/// concurrency token compared by the store on every rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub videos: Vec<VideoEntry>,
    pub date: DateTime<Utc>,
    #[serde(skip)]
    pub version: i64,
}

impl Post {
    pub fn new(
        owner: Uuid,
        text: String,
        name: String,
        avatar: String,
        image: Option<String>,
        video: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: owner,
            text,
            name,
            avatar,
            image,
            video,
            likes: Vec::new(),
            comments: Vec::new(),
            videos: Vec::new(),
            date: Utc::now(),
            version: 0,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user == user_id
    }

    pub fn has_liked(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|like| like.user == user_id)
    }

    /// Prepend a like from `user_id`. Returns false if the user already liked the post.
    pub fn like(&mut self, user_id: Uuid) -> bool {
        if self.has_liked(user_id) {
            return false;
        }
        self.likes.insert(
            0,
            Like {
                id: Uuid::new_v4(),
                user: user_id,
            },
        );
        true
    }

    /// Remove the first like from `user_id`. Returns false if there was none.
    pub fn unlike(&mut self, user_id: Uuid) -> bool {
        match self.likes.iter().position(|like| like.user == user_id) {
            Some(index) => {
                self.likes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    /// Remove the first comment with `comment_id`. Returns false if none matched.
    pub fn remove_comment(&mut self, comment_id: Uuid) -> bool {
        match self.comments.iter().position(|c| c.id == comment_id) {
            Some(index) => {
                self.comments.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn add_video(&mut self, entry: VideoEntry) {
        self.videos.insert(0, entry);
    }

    /// Remove the first video entry with `video_id`. Returns false if none matched.
    pub fn remove_video(&mut self, video_id: Uuid) -> bool {
        match self.videos.iter().position(|v| v.id == video_id) {
            Some(index) => {
                self.videos.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(owner: Uuid) -> Post {
        Post::new(
            owner,
            "hello".into(),
            "A".into(),
            "a.png".into(),
            None,
            None,
        )
    }

    fn sample_comment(user: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            user,
            text: "nice".into(),
            name: "B".into(),
            avatar: "b.png".into(),
            date: Utc::now(),
        }
    }

    #[test]
    fn new_post_starts_with_empty_lists() {
        let owner = Uuid::new_v4();
        let post = sample_post(owner);

        assert!(post.is_owned_by(owner));
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
        assert!(post.videos.is_empty());
        assert_eq!(post.version, 0);
    }

    #[test]
    fn like_is_rejected_twice_for_same_user() {
        let mut post = sample_post(Uuid::new_v4());
        let user = Uuid::new_v4();

        assert!(post.like(user));
        assert!(!post.like(user));
        assert_eq!(post.likes.len(), 1);
        assert_eq!(post.likes[0].user, user);
    }

    #[test]
    fn likes_are_prepended() {
        let mut post = sample_post(Uuid::new_v4());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        post.like(first);
        post.like(second);

        assert_eq!(post.likes[0].user, second);
        assert_eq!(post.likes[1].user, first);
    }

    #[test]
    fn unlike_restores_previous_likes() {
        let mut post = sample_post(Uuid::new_v4());
        let other = Uuid::new_v4();
        post.like(other);
        let before = post.likes.clone();

        let user = Uuid::new_v4();
        assert!(post.like(user));
        assert!(post.unlike(user));
        assert_eq!(post.likes, before);
    }

    #[test]
    fn unlike_without_like_leaves_list_untouched() {
        let mut post = sample_post(Uuid::new_v4());
        post.like(Uuid::new_v4());
        let before = post.likes.clone();

        assert!(!post.unlike(Uuid::new_v4()));
        assert_eq!(post.likes, before);
    }

    #[test]
    fn remove_comment_only_removes_matching_id() {
        let mut post = sample_post(Uuid::new_v4());
        let kept = sample_comment(Uuid::new_v4());
        let removed = sample_comment(Uuid::new_v4());
        post.add_comment(kept.clone());
        post.add_comment(removed.clone());

        assert!(post.remove_comment(removed.id));
        assert_eq!(post.comments, vec![kept]);
        assert!(!post.remove_comment(removed.id));
    }

    #[test]
    fn remove_video_with_unknown_id_is_a_no_op() {
        let mut post = sample_post(Uuid::new_v4());
        post.add_video(VideoEntry {
            id: Uuid::new_v4(),
            user: Uuid::new_v4(),
            text: "clip".into(),
            name: "C".into(),
            avatar: "c.png".into(),
            video: "https://cdn.example.com/clip.mp4".into(),
        });

        assert!(!post.remove_video(Uuid::new_v4()));
        assert_eq!(post.videos.len(), 1);
    }

    #[test]
    fn version_is_not_serialized() {
        let mut post = sample_post(Uuid::new_v4());
        post.version = 7;

        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("version").is_none());
        assert_eq!(value["likes"], serde_json::json!([]));
        assert_eq!(value["comments"], serde_json::json!([]));
    }
}
