use recipe_gateway::{Comment, CommentId, CommentOrder, DataGateway, NewComment, UserId, VideoId};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Comment list and composer state for one video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentState {
    /// Newest first, exactly as last returned by the backend
    pub comments: Vec<Comment>,
    pub draft: String,
    /// A post is in flight; input and button are disabled
    pub posting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted(CommentId),
    /// Text was empty after trimming; nothing was sent
    Empty,
    /// Another post is still in flight
    AlreadyPosting,
    /// Insert failed; the draft is kept for a retry
    Failed,
}

/// Keeps the comment list for a video in step with the backend
///
/// Posting never appends locally. After a successful insert the whole list
/// is fetched again, which also picks up comments written by others.
#[derive(Clone)]
pub struct CommentSynchronizer {
    gateway: Arc<dyn DataGateway>,
    state: Arc<watch::Sender<CommentState>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl CommentSynchronizer {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        let (_, shutdown_rx) = watch::channel(false);
        Self::with_shutdown(gateway, shutdown_rx)
    }

    pub fn with_shutdown(gateway: Arc<dyn DataGateway>, shutdown_rx: watch::Receiver<bool>) -> Self {
        let (state, _) = watch::channel(CommentState::default());
        Self {
            gateway,
            state: Arc::new(state),
            shutdown_rx,
        }
    }

    pub fn state(&self) -> CommentState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CommentState> {
        self.state.subscribe()
    }

    pub fn draft(&self) -> String {
        self.state.borrow().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| state.draft = text);
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Replace the local list with the backend's, newest first
    pub async fn refresh(&self, video_id: &VideoId) {
        let comments = match self
            .gateway
            .list_comments(video_id, CommentOrder::CreatedAtDesc)
            .await
        {
            Ok(comments) => comments,
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "Failed to fetch comments");
                Vec::new()
            }
        };

        if self.is_shut_down() {
            debug!(video_id = %video_id, "Discarding comment refresh after teardown");
            return;
        }

        debug!(video_id = %video_id, count = comments.len(), "Comments refreshed");
        self.state.send_modify(|state| state.comments = comments);
    }

    /// Post `text` as `user_id`
    pub async fn submit(&self, video_id: &VideoId, user_id: &UserId, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            debug!(video_id = %video_id, "Ignoring empty comment");
            return SubmitOutcome::Empty;
        }

        let mut started = false;
        self.state.send_if_modified(|state| {
            if state.posting {
                return false;
            }
            state.posting = true;
            started = true;
            true
        });
        if !started {
            debug!(video_id = %video_id, "Comment already posting");
            return SubmitOutcome::AlreadyPosting;
        }

        let request = NewComment {
            video_id: video_id.clone(),
            user_id: user_id.clone(),
            comment: text.to_string(),
        };

        match self.gateway.insert_comment(request).await {
            Ok(inserted) => {
                info!(video_id = %video_id, user_id = %user_id, comment_id = %inserted.id, "Comment posted");
                if self.is_shut_down() {
                    return SubmitOutcome::Posted(inserted.id);
                }
                self.state.send_modify(|state| {
                    state.draft.clear();
                    state.posting = false;
                });
                self.refresh(video_id).await;
                SubmitOutcome::Posted(inserted.id)
            }
            Err(e) => {
                warn!(video_id = %video_id, user_id = %user_id, error = %e, "Failed to post comment");
                if !self.is_shut_down() {
                    self.state.send_modify(|state| state.posting = false);
                }
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_gateway::{InMemoryGateway, Operation};
    use std::time::Duration;

    fn setup() -> (Arc<InMemoryGateway>, CommentSynchronizer) {
        let gateway = Arc::new(InMemoryGateway::new());
        let sync = CommentSynchronizer::new(gateway.clone());
        (gateway, sync)
    }

    #[tokio::test]
    async fn test_refresh_replaces_list_newest_first() {
        let (gateway, sync) = setup();
        gateway.seed_comment("v1", "u1", "Needs more ghee");
        gateway.seed_comment("v1", "u2", "Made it twice already");

        sync.refresh(&VideoId::new("v1")).await;

        let texts: Vec<_> = sync
            .state()
            .comments
            .iter()
            .map(|c| c.comment.clone())
            .collect();
        assert_eq!(texts, vec!["Made it twice already", "Needs more ghee"]);
    }

    #[tokio::test]
    async fn test_whitespace_comment_is_noop() {
        let (gateway, sync) = setup();
        gateway.seed_comment("v1", "u2", "existing");
        let video = VideoId::new("v1");
        sync.refresh(&video).await;
        sync.set_draft("   \n\t");

        let outcome = sync.submit(&video, &UserId::new("u1"), "   \n\t").await;

        assert_eq!(outcome, SubmitOutcome::Empty);
        assert_eq!(gateway.call_count(Operation::InsertComment), 0);
        assert_eq!(sync.state().comments.len(), 1);
        assert!(!sync.state().posting);
    }

    #[tokio::test]
    async fn test_successful_post_clears_draft_and_refreshes() {
        let (gateway, sync) = setup();
        let video = VideoId::new("v2");
        sync.set_draft("Great recipe!");

        let outcome = sync.submit(&video, &UserId::new("u1"), "Great recipe!").await;

        assert!(matches!(outcome, SubmitOutcome::Posted(_)));
        let state = sync.state();
        assert_eq!(state.comments.len(), 1);
        assert_eq!(state.comments[0].comment, "Great recipe!");
        assert_eq!(state.comments[0].user_id, UserId::new("u1"));
        assert!(state.draft.is_empty());
        assert!(!state.posting);
        assert_eq!(gateway.call_count(Operation::ListComments), 1);
    }

    #[tokio::test]
    async fn test_failed_post_keeps_draft() {
        let (gateway, sync) = setup();
        gateway.fail(Operation::InsertComment);
        let video = VideoId::new("v2");
        sync.set_draft("Great recipe!");

        let outcome = sync.submit(&video, &UserId::new("u1"), "Great recipe!").await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let state = sync.state();
        assert_eq!(state.draft, "Great recipe!");
        assert!(!state.posting);
        assert!(state.comments.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_posting_flag_held_during_insert() {
        let (gateway, sync) = setup();
        gateway.set_latency(Operation::InsertComment, Duration::from_millis(500));
        let video = VideoId::new("v2");

        let pending = {
            let sync = sync.clone();
            let video = video.clone();
            tokio::spawn(async move { sync.submit(&video, &UserId::new("u1"), "first").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sync.state().posting);

        let second = sync.submit(&video, &UserId::new("u1"), "second").await;
        assert_eq!(second, SubmitOutcome::AlreadyPosting);

        let first = pending.await.unwrap();
        assert!(matches!(first, SubmitOutcome::Posted(_)));
        assert!(!sync.state().posting);
        assert_eq!(gateway.call_count(Operation::InsertComment), 1);
    }
}
