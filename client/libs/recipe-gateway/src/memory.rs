//! In-process backend
//!
//! Keeps the three collections in memory and answers the same calls as the
//! REST backend. Individual operations can be made to fail or to take a
//! fixed amount of (tokio) time, and every call is counted.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::error::{GatewayError, Result};
use crate::gateway::{AuthGateway, DataGateway};
use crate::models::{
    AuthSession, Comment, CommentId, CommentOrder, CurrentUser, InsertedComment, InsertedLike,
    Like, LikeId, NewComment, NewLike, UserId, Video, VideoId,
};

/// 2024-01-01T00:00:00Z; generated timestamps count up from here
const EPOCH_SECS: i64 = 1_704_067_200;

/// Gateway call kinds, used for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchVideo,
    ListLikes,
    InsertLike,
    DeleteLike,
    ListComments,
    InsertComment,
    ListVideos,
    SignIn,
    SignUp,
    SignOut,
}

#[derive(Default)]
struct Tables {
    videos: Vec<Video>,
    likes: Vec<Like>,
    comments: Vec<Comment>,
    accounts: HashMap<String, (String, CurrentUser)>,
    seq: i64,
}

impl Tables {
    fn next_seq(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn timestamp(seq: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(EPOCH_SECS, 0).unwrap_or_default()
            + ChronoDuration::seconds(seq)
    }
}

#[derive(Default)]
pub struct InMemoryGateway {
    tables: RwLock<Tables>,
    failing: Mutex<HashSet<Operation>>,
    latency: Mutex<HashMap<Operation, Duration>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a video owned by `owner`
    pub fn add_video(&self, id: &str, title: &str, owner: &str) -> Video {
        let mut tables = self.tables.write();
        let seq = tables.next_seq();
        let video = Video {
            id: VideoId::new(id),
            title: title.to_string(),
            description: None,
            user_id: UserId::new(owner),
            created_at: Tables::timestamp(seq),
            video_url: None,
        };
        tables.videos.push(video.clone());
        video
    }

    pub fn put_video(&self, video: Video) {
        let mut tables = self.tables.write();
        tables.videos.retain(|v| v.id != video.id);
        tables.videos.push(video);
    }

    /// Insert a like row directly, bypassing failure injection
    pub fn seed_like(&self, video_id: &str, user_id: &str) -> LikeId {
        let mut tables = self.tables.write();
        let seq = tables.next_seq();
        let id = LikeId::new(format!("like-{}", seq));
        tables.likes.push(Like {
            id: id.clone(),
            video_id: VideoId::new(video_id),
            user_id: UserId::new(user_id),
        });
        id
    }

    /// Insert a comment row directly, bypassing failure injection
    pub fn seed_comment(&self, video_id: &str, user_id: &str, text: &str) -> CommentId {
        let mut tables = self.tables.write();
        let seq = tables.next_seq();
        let id = CommentId::new(format!("comment-{}", seq));
        tables.comments.push(Comment {
            id: id.clone(),
            video_id: VideoId::new(video_id),
            user_id: UserId::new(user_id),
            comment: text.to_string(),
            created_at: Tables::timestamp(seq),
        });
        id
    }

    /// Register credentials accepted by `sign_in_with_password`
    pub fn add_account(&self, email: &str, password: &str, user: CurrentUser) {
        self.tables
            .write()
            .accounts
            .insert(email.to_string(), (password.to_string(), user));
    }

    /// Make every call of `op` fail until [`recover`](Self::recover)
    pub fn fail(&self, op: Operation) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.failing.lock().remove(&op);
    }

    /// Delay every call of `op` by `delay` before it touches the tables
    pub fn set_latency(&self, op: Operation, delay: Duration) {
        self.latency.lock().insert(op, delay);
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    pub fn likes_for(&self, video_id: &str) -> Vec<Like> {
        self.tables
            .read()
            .likes
            .iter()
            .filter(|l| l.video_id.as_str() == video_id)
            .cloned()
            .collect()
    }

    pub fn comments_for(&self, video_id: &str) -> Vec<Comment> {
        self.tables
            .read()
            .comments
            .iter()
            .filter(|c| c.video_id.as_str() == video_id)
            .cloned()
            .collect()
    }

    async fn enter(&self, op: Operation) -> Result<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;

        let delay = self.latency.lock().get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(&op) {
            return Err(GatewayError::Injected(format!("{:?}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn fetch_video(&self, id: &VideoId) -> Result<Option<Video>> {
        self.enter(Operation::FetchVideo).await?;
        Ok(self
            .tables
            .read()
            .videos
            .iter()
            .find(|v| &v.id == id)
            .cloned())
    }

    async fn list_likes(&self, video_id: &VideoId) -> Result<Vec<Like>> {
        self.enter(Operation::ListLikes).await?;
        Ok(self.likes_for(video_id.as_str()))
    }

    async fn insert_like(&self, like: NewLike) -> Result<InsertedLike> {
        self.enter(Operation::InsertLike).await?;
        let mut tables = self.tables.write();
        let seq = tables.next_seq();
        let id = LikeId::new(format!("like-{}", seq));
        tables.likes.push(Like {
            id: id.clone(),
            video_id: like.video_id,
            user_id: like.user_id,
        });
        Ok(InsertedLike { id })
    }

    async fn delete_like(&self, id: &LikeId) -> Result<()> {
        self.enter(Operation::DeleteLike).await?;
        self.tables.write().likes.retain(|l| &l.id != id);
        Ok(())
    }

    async fn list_comments(
        &self,
        video_id: &VideoId,
        order: CommentOrder,
    ) -> Result<Vec<Comment>> {
        self.enter(Operation::ListComments).await?;
        let mut comments = self.comments_for(video_id.as_str());
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        if order == CommentOrder::CreatedAtDesc {
            comments.reverse();
        }
        Ok(comments)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<InsertedComment> {
        self.enter(Operation::InsertComment).await?;
        let mut tables = self.tables.write();
        let seq = tables.next_seq();
        let id = CommentId::new(format!("comment-{}", seq));
        let created_at = Tables::timestamp(seq);
        tables.comments.push(Comment {
            id: id.clone(),
            video_id: comment.video_id,
            user_id: comment.user_id,
            comment: comment.comment,
            created_at,
        });
        Ok(InsertedComment { id, created_at })
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        self.enter(Operation::ListVideos).await?;
        let mut videos = self.tables.read().videos.clone();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.enter(Operation::SignIn).await?;
        let tables = self.tables.read();
        match tables.accounts.get(email) {
            Some((expected, user)) if expected == password => Ok(AuthSession {
                access_token: format!("token-{}", user.id),
                user: user.clone(),
            }),
            _ => Err(GatewayError::Unauthorized(
                "Invalid login credentials".to_string(),
            )),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Option<AuthSession>> {
        self.enter(Operation::SignUp).await?;
        let mut tables = self.tables.write();
        if tables.accounts.contains_key(email) {
            return Err(GatewayError::Unauthorized(
                "User already registered".to_string(),
            ));
        }

        let seq = tables.next_seq();
        let user = CurrentUser {
            id: UserId::new(format!("user-{}", seq)),
            email: Some(email.to_string()),
            display_name_hint: Some(username.to_string()),
        };
        tables
            .accounts
            .insert(email.to_string(), (password.to_string(), user.clone()));

        Ok(Some(AuthSession {
            access_token: format!("token-{}", user.id),
            user,
        }))
    }

    async fn sign_out(&self) -> Result<()> {
        self.enter(Operation::SignOut).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_like_insert_and_delete() {
        let gateway = InMemoryGateway::new();
        let inserted = gateway
            .insert_like(NewLike {
                video_id: VideoId::new("v1"),
                user_id: UserId::new("u1"),
            })
            .await
            .unwrap();

        assert_eq!(gateway.likes_for("v1").len(), 1);
        gateway.delete_like(&inserted.id).await.unwrap();
        assert!(gateway.likes_for("v1").is_empty());
        assert_eq!(gateway.call_count(Operation::InsertLike), 1);
        assert_eq!(gateway.call_count(Operation::DeleteLike), 1);
    }

    #[tokio::test]
    async fn test_comments_newest_first() {
        let gateway = InMemoryGateway::new();
        gateway.seed_comment("v1", "u1", "first");
        gateway.seed_comment("v1", "u2", "second");
        gateway.seed_comment("v2", "u1", "elsewhere");

        let comments = gateway
            .list_comments(&VideoId::new("v1"), CommentOrder::CreatedAtDesc)
            .await
            .unwrap();
        let texts: Vec<_> = comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_injected_failure_until_recovered() {
        let gateway = InMemoryGateway::new();
        gateway.fail(Operation::ListLikes);

        let err = gateway.list_likes(&VideoId::new("v1")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Injected(_)));

        gateway.recover(Operation::ListLikes);
        assert!(gateway.list_likes(&VideoId::new("v1")).await.is_ok());
        assert_eq!(gateway.call_count(Operation::ListLikes), 2);
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let gateway = InMemoryGateway::new();
        gateway.add_account("cook@example.com", "secret", CurrentUser::new("u1"));

        assert!(gateway
            .sign_in_with_password("cook@example.com", "wrong")
            .await
            .is_err());
        let session = gateway
            .sign_in_with_password("cook@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(session.user.id, UserId::new("u1"));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let gateway = InMemoryGateway::new();
        let first = gateway.sign_up("a@example.com", "pw", "anna").await.unwrap();
        assert!(first.is_some());

        let err = gateway
            .sign_up("a@example.com", "pw", "anna")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: User already registered");
    }
}
