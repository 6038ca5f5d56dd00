//! Signed-in video feed
//!
//! Like and comment counts are computed here by fetching each video's full
//! like and comment sets and counting them.

use futures::future::join_all;
use recipe_gateway::{CommentOrder, DataGateway, Video};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub video: Video,
    pub likes: usize,
    pub comments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "entries", rename_all = "snake_case")]
pub enum FeedState {
    /// Anonymous visitor; a login redirect was requested
    RedirectedToLogin,
    /// Newest first; empty when nothing has been uploaded yet
    Ready(Vec<FeedEntry>),
}

pub struct VideoFeedViewModel {
    gateway: Arc<dyn DataGateway>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl VideoFeedViewModel {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            gateway,
            session,
            navigator,
        }
    }

    /// Wait for the session, then load the feed or redirect to login
    pub async fn load(&self) -> FeedState {
        let session = self.session.wait_until_resolved().await;
        if !session.is_signed_in() {
            info!("Feed requires sign-in, redirecting to login");
            self.navigator.navigate(Route::Login);
            return FeedState::RedirectedToLogin;
        }

        let videos = match self.gateway.list_videos().await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, "Failed to list videos");
                Vec::new()
            }
        };

        let entries = join_all(videos.into_iter().map(|video| self.entry(video))).await;
        info!(count = entries.len(), "Feed loaded");
        FeedState::Ready(entries)
    }

    async fn entry(&self, video: Video) -> FeedEntry {
        let (likes, comments) = tokio::join!(
            self.gateway.list_likes(&video.id),
            self.gateway
                .list_comments(&video.id, CommentOrder::CreatedAtDesc),
        );

        let likes = likes.map(|l| l.len()).unwrap_or_else(|e| {
            warn!(video_id = %video.id, error = %e, "Failed to count likes");
            0
        });
        let comments = comments.map(|c| c.len()).unwrap_or_else(|e| {
            warn!(video_id = %video.id, error = %e, "Failed to count comments");
            0
        });

        FeedEntry {
            video,
            likes,
            comments,
        }
    }
}
