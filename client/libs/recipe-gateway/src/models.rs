//! Records exchanged with the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a row in `videos`
    VideoId
);
opaque_id!(
    /// Identifier of an authenticated user
    UserId
);
opaque_id!(
    /// Identifier of a row in `video_likes`
    LikeId
);
opaque_id!(
    /// Identifier of a row in `video_comments`
    CommentId
);

/// Uploaded recipe video metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Owner of the video
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// A user's like on a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub video_id: VideoId,
    pub user_id: UserId,
}

/// A comment left on a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub video_id: VideoId,
    pub user_id: UserId,
    /// Comment body as typed by the author
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLike {
    pub video_id: VideoId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub video_id: VideoId,
    pub user_id: UserId,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedLike {
    pub id: LikeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedComment {
    pub id: CommentId,
    pub created_at: DateTime<Utc>,
}

/// Sort order for comment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

impl CommentOrder {
    /// PostgREST `order=` value
    pub fn as_query(&self) -> &'static str {
        match self {
            CommentOrder::CreatedAtDesc => "created_at.desc",
            CommentOrder::CreatedAtAsc => "created_at.asc",
        }
    }
}

/// Signed-in user as reported by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    /// Username chosen at sign-up, when the backend returns one
    #[serde(default)]
    pub display_name_hint: Option<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name_hint: None,
        }
    }
}

/// Result of a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub user: CurrentUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let like = Like {
            id: LikeId::new("l1"),
            video_id: VideoId::new("v1"),
            user_id: UserId::new("u1"),
        };
        let json = serde_json::to_value(&like).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "l1", "video_id": "v1", "user_id": "u1"})
        );
    }

    #[test]
    fn test_video_optional_fields_default() {
        let video: Video = serde_json::from_value(serde_json::json!({
            "id": "v1",
            "title": "Ragi Mudde",
            "user_id": "owner-1",
            "created_at": "2024-05-01T12:34:56.123456+00:00"
        }))
        .unwrap();
        assert_eq!(video.description, None);
        assert_eq!(video.video_url, None);
        assert_eq!(video.id.as_str(), "v1");
    }

    #[test]
    fn test_comment_order_query() {
        assert_eq!(CommentOrder::default().as_query(), "created_at.desc");
        assert_eq!(CommentOrder::CreatedAtAsc.as_query(), "created_at.asc");
    }
}
