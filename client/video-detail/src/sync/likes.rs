use recipe_gateway::{DataGateway, LikeId, NewLike, UserId, VideoId};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::session::SessionStore;

/// Lifetime of the floating heart shown after a successful like
pub const HEART_ANIMATION: Duration = Duration::from_millis(800);

/// Like state for one video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub likes_count: usize,
    /// Whether the current session user has a like on the video
    pub liked: bool,
    /// Row backing `liked`, used to delete it on unlike
    pub like_id: Option<LikeId>,
    /// One-shot "like" visual event
    pub heart_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Liked,
    Unliked,
    /// The mutation failed; the trailing refresh still ran
    Failed,
}

/// Keeps like count and liked-state for a video in step with the backend
///
/// Every mutation is applied optimistically and then followed by an
/// unconditional [`refresh`](Self::refresh). There is no rollback and no
/// ordering between overlapping refreshes: the last one to land wins.
#[derive(Clone)]
pub struct LikeSynchronizer {
    gateway: Arc<dyn DataGateway>,
    session: SessionStore,
    state: Arc<watch::Sender<LikeState>>,
    heart_generation: Arc<AtomicU64>,
    heart_duration: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl LikeSynchronizer {
    pub fn new(gateway: Arc<dyn DataGateway>, session: SessionStore) -> Self {
        let (_, shutdown_rx) = watch::channel(false);
        Self::with_shutdown(gateway, session, shutdown_rx)
    }

    /// Results arriving after `shutdown_rx` turns true are discarded
    pub fn with_shutdown(
        gateway: Arc<dyn DataGateway>,
        session: SessionStore,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let (state, _) = watch::channel(LikeState::default());
        Self {
            gateway,
            session,
            state: Arc::new(state),
            heart_generation: Arc::new(AtomicU64::new(0)),
            heart_duration: HEART_ANIMATION,
            shutdown_rx,
        }
    }

    pub fn with_heart_duration(mut self, duration: Duration) -> Self {
        self.heart_duration = duration;
        self
    }

    pub fn state(&self) -> LikeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LikeState> {
        self.state.subscribe()
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Re-read all likes for the video and re-derive count and liked-state
    pub async fn refresh(&self, video_id: &VideoId) {
        let likes = match self.gateway.list_likes(video_id).await {
            Ok(likes) => likes,
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "Failed to fetch likes");
                Vec::new()
            }
        };

        if self.is_shut_down() {
            debug!(video_id = %video_id, "Discarding like refresh after teardown");
            return;
        }

        let user_id = self.session.user_id();
        // First match wins if the backend ever holds duplicates
        let like_id = user_id
            .as_ref()
            .and_then(|uid| likes.iter().find(|like| &like.user_id == uid))
            .map(|like| like.id.clone());
        let likes_count = likes.len();

        debug!(
            video_id = %video_id,
            likes_count,
            liked = like_id.is_some(),
            "Likes refreshed"
        );

        self.state.send_modify(|state| {
            state.likes_count = likes_count;
            state.liked = like_id.is_some();
            state.like_id = like_id;
        });
    }

    /// Like or unlike on behalf of `user_id`, then reconcile
    pub async fn toggle(&self, video_id: &VideoId, user_id: &UserId) -> ToggleOutcome {
        let current = {
            let state = self.state.borrow();
            if state.liked {
                state.like_id.clone()
            } else {
                None
            }
        };

        let outcome = match current {
            Some(like_id) => self.unlike(video_id, &like_id).await,
            None => self.like(video_id, user_id).await,
        };

        self.refresh(video_id).await;
        outcome
    }

    async fn unlike(&self, video_id: &VideoId, like_id: &LikeId) -> ToggleOutcome {
        let outcome = match self.gateway.delete_like(like_id).await {
            Ok(()) => {
                info!(video_id = %video_id, like_id = %like_id, "Video unliked");
                ToggleOutcome::Unliked
            }
            Err(e) => {
                warn!(video_id = %video_id, like_id = %like_id, error = %e, "Failed to delete like");
                ToggleOutcome::Failed
            }
        };

        if !self.is_shut_down() {
            self.state.send_modify(|state| {
                state.likes_count = state.likes_count.saturating_sub(1);
                state.liked = false;
                state.like_id = None;
            });
        }
        outcome
    }

    async fn like(&self, video_id: &VideoId, user_id: &UserId) -> ToggleOutcome {
        let request = NewLike {
            video_id: video_id.clone(),
            user_id: user_id.clone(),
        };

        match self.gateway.insert_like(request).await {
            Ok(inserted) => {
                info!(video_id = %video_id, user_id = %user_id, like_id = %inserted.id, "Video liked");
                if !self.is_shut_down() {
                    self.state.send_modify(|state| {
                        state.likes_count += 1;
                        state.liked = true;
                        state.like_id = Some(inserted.id);
                    });
                    self.show_heart();
                }
                ToggleOutcome::Liked
            }
            Err(e) => {
                warn!(video_id = %video_id, user_id = %user_id, error = %e, "Failed to insert like");
                ToggleOutcome::Failed
            }
        }
    }

    /// Raise the heart event and clear it after `heart_duration`, unless a
    /// newer event has been raised in the meantime
    fn show_heart(&self) {
        let generation = self.heart_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.heart_visible = true);

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.heart_generation);
        let duration = self.heart_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if current.load(Ordering::SeqCst) == generation {
                state.send_modify(|state| state.heart_visible = false);
            }
        });
    }
}
