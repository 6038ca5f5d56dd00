//! Video detail screen state
//!
//! Composes the like and comment synchronizers with the video metadata
//! fetch and the session store:
//!
//! ```text
//! Init ──mount()──▶ Loading ──metadata + first refreshes──▶ Ready
//!                                                            │
//!                          comment post: Idle ⇄ Submitting ──┘
//! ```
//!
//! Like toggling never blocks `Ready`. After [`teardown`](VideoDetailViewModel::teardown)
//! every late response is discarded.

use recipe_gateway::{DataGateway, Video, VideoId};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use crate::sync::{
    CommentState, CommentSynchronizer, LikeState, LikeSynchronizer, SubmitOutcome,
    ToggleOutcome, HEART_ANIMATION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Idle,
    Submitting,
}

/// Result of a user action that needs a signed-in session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Performed(T),
    RedirectedToLogin,
}

/// Everything the presentation layer needs, taken at one instant
#[derive(Debug, Clone, Serialize)]
pub struct VideoDetailState {
    pub video_id: VideoId,
    pub phase: Phase,
    /// `None` when the video could not be fetched
    pub video: Option<Video>,
    pub likes: LikeState,
    pub comments: CommentState,
    pub signed_in: bool,
}

impl VideoDetailState {
    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Ready
    }

    pub fn activity(&self) -> Activity {
        if self.comments.posting {
            Activity::Submitting
        } else {
            Activity::Idle
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetailOptions {
    pub heart_duration: Duration,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            heart_duration: HEART_ANIMATION,
        }
    }
}

struct Inner {
    video_id: VideoId,
    gateway: Arc<dyn DataGateway>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    likes: LikeSynchronizer,
    comments: CommentSynchronizer,
    phase: watch::Sender<Phase>,
    video: watch::Sender<Option<Video>>,
    shutdown_tx: watch::Sender<bool>,
}

/// View-model for one video detail instance
#[derive(Clone)]
pub struct VideoDetailViewModel {
    inner: Arc<Inner>,
}

impl VideoDetailViewModel {
    pub fn new(
        video_id: VideoId,
        gateway: Arc<dyn DataGateway>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        options: DetailOptions,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let likes = LikeSynchronizer::with_shutdown(
            gateway.clone(),
            session.clone(),
            shutdown_rx.clone(),
        )
        .with_heart_duration(options.heart_duration);
        let comments = CommentSynchronizer::with_shutdown(gateway.clone(), shutdown_rx);
        let (phase, _) = watch::channel(Phase::Init);
        let (video, _) = watch::channel(None);

        Self {
            inner: Arc::new(Inner {
                video_id,
                gateway,
                session,
                navigator,
                likes,
                comments,
                phase,
                video,
                shutdown_tx,
            }),
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.inner.video_id
    }

    pub fn likes(&self) -> &LikeSynchronizer {
        &self.inner.likes
    }

    pub fn comments(&self) -> &CommentSynchronizer {
        &self.inner.comments
    }

    pub fn phase(&self) -> Phase {
        *self.inner.phase.borrow()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() != Phase::Ready
    }

    fn is_torn_down(&self) -> bool {
        *self.inner.shutdown_tx.borrow()
    }

    /// Load metadata, likes and comments concurrently and start following
    /// the session. Calling it again on a mounted instance does nothing.
    pub async fn mount(&self) {
        let started = self.inner.phase.send_if_modified(|phase| {
            if *phase != Phase::Init {
                return false;
            }
            *phase = Phase::Loading;
            true
        });
        if !started {
            debug!(video_id = %self.inner.video_id, "Already mounted");
            return;
        }

        info!(video_id = %self.inner.video_id, "Mounting video detail");
        self.spawn_session_watcher();

        let video_id = &self.inner.video_id;
        let metadata = async {
            match self.inner.gateway.fetch_video(video_id).await {
                Ok(video) => video,
                Err(e) => {
                    warn!(video_id = %video_id, error = %e, "Failed to fetch video metadata");
                    None
                }
            }
        };

        let (video, (), ()) = tokio::join!(
            metadata,
            self.inner.likes.refresh(video_id),
            self.inner.comments.refresh(video_id),
        );

        if self.is_torn_down() {
            debug!(video_id = %video_id, "Discarding mount results after teardown");
            return;
        }
        if video.is_none() {
            info!(video_id = %video_id, "Video metadata unavailable, showing placeholders");
        }

        self.inner.video.send_replace(video);
        self.inner.phase.send_replace(Phase::Ready);
        info!(video_id = %video_id, "Video detail ready");
    }

    /// Re-derive liked-state whenever the signed-in identity changes
    fn spawn_session_watcher(&self) {
        let mut session_rx = self.inner.session.subscribe();
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let likes = self.inner.likes.clone();
        let video_id = self.inner.video_id.clone();
        let mut last_user = session_rx.borrow_and_update().user_id().cloned();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    res = shutdown_rx.changed() => {
                        if res.is_err() || *shutdown_rx.borrow() {
                            debug!(video_id = %video_id, "Session watcher stopped");
                            break;
                        }
                    }
                    res = session_rx.changed() => {
                        if res.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                        let current = session_rx.borrow_and_update().user_id().cloned();
                        if current != last_user {
                            info!(
                                video_id = %video_id,
                                user_id = ?current,
                                "Session identity changed, refreshing likes"
                            );
                            last_user = current;
                            likes.refresh(&video_id).await;
                        }
                    }
                }
            }
        });
    }

    /// Stop following the session; later responses no longer touch state
    pub fn teardown(&self) {
        info!(video_id = %self.inner.video_id, "Tearing down video detail");
        self.inner.shutdown_tx.send_replace(true);
    }

    fn redirect_to_login(&self, action: &str) {
        info!(video_id = %self.inner.video_id, action, "Sign-in required, redirecting to login");
        self.inner.navigator.navigate(Route::Login);
    }

    pub async fn toggle_like(&self) -> ActionOutcome<ToggleOutcome> {
        let Some(user_id) = self.inner.session.user_id() else {
            self.redirect_to_login("like");
            return ActionOutcome::RedirectedToLogin;
        };

        ActionOutcome::Performed(self.inner.likes.toggle(&self.inner.video_id, &user_id).await)
    }

    /// Fire-and-forget variant of [`toggle_like`](Self::toggle_like)
    pub fn spawn_toggle_like(&self) -> JoinHandle<ActionOutcome<ToggleOutcome>> {
        let view_model = self.clone();
        tokio::spawn(async move { view_model.toggle_like().await })
    }

    pub fn set_comment_draft(&self, text: impl Into<String>) {
        self.inner.comments.set_draft(text);
    }

    /// Post the current draft
    pub async fn submit_comment(&self) -> ActionOutcome<SubmitOutcome> {
        let Some(user_id) = self.inner.session.user_id() else {
            self.redirect_to_login("comment");
            return ActionOutcome::RedirectedToLogin;
        };

        let draft = self.inner.comments.draft();
        ActionOutcome::Performed(
            self.inner
                .comments
                .submit(&self.inner.video_id, &user_id, &draft)
                .await,
        )
    }

    pub fn snapshot(&self) -> VideoDetailState {
        VideoDetailState {
            video_id: self.inner.video_id.clone(),
            phase: self.phase(),
            video: self.inner.video.borrow().clone(),
            likes: self.inner.likes.state(),
            comments: self.inner.comments.state(),
            signed_in: self.inner.session.user_id().is_some(),
        }
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.inner.phase.subscribe()
    }

    pub fn subscribe_likes(&self) -> watch::Receiver<LikeState> {
        self.inner.likes.subscribe()
    }

    pub fn subscribe_comments(&self) -> watch::Receiver<CommentState> {
        self.inner.comments.subscribe()
    }
}
