//! Display strings and render models for the video detail and feed screens
//!
//! Everything here is a pure function of a view-model snapshot.

use chrono::{DateTime, Utc};
use recipe_gateway::{Comment, CommentId, Video, VideoId};
use serde::Serialize;

use crate::view_model::{FeedState, VideoDetailState};

pub const TITLE_FALLBACK: &str = "Recipe video";
pub const DESCRIPTION_FALLBACK: &str = "This recipe has been passed down through generations in my family. The secret is in the timing and using fresh, quality ingredients.";
pub const OWNER_FALLBACK: &str = "unknown";
pub const EMPTY_COMMENTS: &str = "No comments yet. Be the first to comment!";
pub const EMPTY_FEED: &str = "Upload a video. Become the first.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoDetailView {
    pub player: PlayerView,
    pub title: String,
    /// "by {owner} • {date}"
    pub byline: String,
    pub description: String,
    pub like_button: LikeButtonView,
    pub heart_visible: bool,
    pub composer: ComposerView,
    pub comments: Vec<CommentView>,
    /// Shown instead of the list when there are no comments
    pub empty_comments: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PlayerView {
    Stream(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeButtonView {
    pub label: String,
    pub aria_label: &'static str,
    pub pressed: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposerView {
    pub text: String,
    pub placeholder: &'static str,
    pub button_label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author: String,
    pub initial: String,
    pub body: String,
    pub timestamp: String,
}

pub fn likes_label(count: usize) -> String {
    if count == 1 {
        "1 like".to_string()
    } else {
        format!("{} likes", count)
    }
}

pub fn like_aria_label(liked: bool) -> &'static str {
    if liked {
        "Unlike video"
    } else {
        "Like video"
    }
}

pub fn player_placeholder(video_id: &VideoId) -> String {
    format!("Video Player - Recipe {}", video_id)
}

fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

pub fn owner_byline(video: Option<&Video>) -> String {
    match video {
        Some(video) => {
            let owner = prefix(video.user_id.as_str(), 6);
            let owner = if owner.is_empty() { OWNER_FALLBACK } else { owner };
            format!("by {} • {}", owner, video.created_at.format("%Y-%m-%d"))
        }
        None => format!("by {} • ", OWNER_FALLBACK),
    }
}

pub fn comment_author(comment: &Comment) -> String {
    prefix(comment.user_id.as_str(), 8).to_string()
}

pub fn avatar_initial(author: &str) -> String {
    author
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "U".to_string())
}

pub fn comment_timestamp(created_at: &DateTime<Utc>) -> String {
    created_at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn composer_placeholder(signed_in: bool) -> &'static str {
    if signed_in {
        "Add a comment..."
    } else {
        "Please sign in to comment"
    }
}

pub fn post_button_label(posting: bool) -> &'static str {
    if posting {
        "Posting..."
    } else {
        "Post"
    }
}

fn comment_view(comment: &Comment) -> CommentView {
    let author = comment_author(comment);
    CommentView {
        id: comment.id.clone(),
        initial: avatar_initial(&author),
        author,
        body: comment.comment.clone(),
        timestamp: comment_timestamp(&comment.created_at),
    }
}

/// Placeholder for a loaded feed with no videos
pub fn feed_placeholder(state: &FeedState) -> Option<&'static str> {
    match state {
        FeedState::Ready(entries) if entries.is_empty() => Some(EMPTY_FEED),
        _ => None,
    }
}

/// Render model for a snapshot; `None` while the screen is still loading
pub fn render(state: &VideoDetailState) -> Option<VideoDetailView> {
    if state.is_loading() {
        return None;
    }

    let video = state.video.as_ref();
    let player = match video.and_then(|v| v.video_url.clone()) {
        Some(url) => PlayerView::Stream(url),
        None => PlayerView::Placeholder(player_placeholder(&state.video_id)),
    };
    let description = video
        .and_then(|v| v.description.clone())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DESCRIPTION_FALLBACK.to_string());
    let posting = state.comments.posting;

    Some(VideoDetailView {
        player,
        title: video
            .map(|v| v.title.clone())
            .unwrap_or_else(|| TITLE_FALLBACK.to_string()),
        byline: owner_byline(video),
        description,
        like_button: LikeButtonView {
            label: likes_label(state.likes.likes_count),
            aria_label: like_aria_label(state.likes.liked),
            pressed: state.likes.liked,
            disabled: !state.signed_in,
        },
        heart_visible: state.likes.heart_visible,
        composer: ComposerView {
            text: state.comments.draft.clone(),
            placeholder: composer_placeholder(state.signed_in),
            button_label: post_button_label(posting),
            disabled: !state.signed_in || posting,
        },
        comments: state.comments.comments.iter().map(comment_view).collect(),
        empty_comments: state.comments.comments.is_empty().then_some(EMPTY_COMMENTS),
    })
}
