//! Backend traits consumed by the client core

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AuthSession, Comment, CommentOrder, InsertedComment, InsertedLike, Like, LikeId, NewComment,
    NewLike, Video, VideoId,
};

/// Record storage for videos, likes and comments
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Fetch one video; `None` when no row matches
    async fn fetch_video(&self, id: &VideoId) -> Result<Option<Video>>;

    /// All likes for a video, in no particular order
    async fn list_likes(&self, video_id: &VideoId) -> Result<Vec<Like>>;

    async fn insert_like(&self, like: NewLike) -> Result<InsertedLike>;

    async fn delete_like(&self, id: &LikeId) -> Result<()>;

    /// All comments for a video in the requested order
    async fn list_comments(&self, video_id: &VideoId, order: CommentOrder)
        -> Result<Vec<Comment>>;

    async fn insert_comment(&self, comment: NewComment) -> Result<InsertedComment>;

    /// All videos, newest first
    async fn list_videos(&self) -> Result<Vec<Video>>;
}

/// Password authentication against the backend
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Register a new account. Returns a session when the backend signs the
    /// user in immediately, `None` when email confirmation is pending.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Option<AuthSession>>;

    async fn sign_out(&self) -> Result<()>;
}
