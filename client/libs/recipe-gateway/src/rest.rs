//! REST backend speaking the PostgREST and GoTrue dialects
//!
//! Table access goes through `/rest/v1/{table}` with `column=eq.value`
//! filters; auth goes through `/auth/v1/*`. Every request carries the public
//! `apikey` header and a bearer token: the signed-in user's access token when
//! there is one, the anon key otherwise.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{AuthGateway, DataGateway};
use crate::models::{
    AuthSession, Comment, CommentOrder, CurrentUser, InsertedComment, InsertedLike, Like, LikeId,
    NewComment, NewLike, UserId, Video, VideoId,
};

const VIDEOS: &str = "videos";
const LIKES: &str = "video_likes";
const COMMENTS: &str = "video_comments";

const VIDEO_COLUMNS: &str = "id,title,description,user_id,created_at,video_url";
const LIKE_COLUMNS: &str = "id,video_id,user_id";
const COMMENT_COLUMNS: &str = "id,video_id,user_id,comment,created_at";

/// HTTP client for the hosted backend
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    config: GatewayConfig,
    access_token: Arc<RwLock<Option<String>>>,
}

impl RestBackend {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: GatewayConfig, client: Client) -> Self {
        Self {
            client,
            config,
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Use a previously issued access token for subsequent requests
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .access_token()
            .unwrap_or_else(|| self.config.anon_key.clone());

        self.client
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .request(Method::GET, &self.config.rest_url(table))
            .query(query)
            .send()
            .await?;

        decode(ensure_success(response).await?).await
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, &self.config.rest_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let mut rows: Vec<T> = decode(ensure_success(response).await?).await?;
        if rows.is_empty() {
            return Err(GatewayError::NotFound(format!(
                "insert into {} returned no rows",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(GatewayError::from_status(status.as_u16(), body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl DataGateway for RestBackend {
    async fn fetch_video(&self, id: &VideoId) -> Result<Option<Video>> {
        let mut rows: Vec<Video> = self
            .select(
                VIDEOS,
                &[
                    ("select", VIDEO_COLUMNS.to_string()),
                    ("id", eq(id.as_str())),
                ],
            )
            .await?;

        debug!(video_id = %id, found = !rows.is_empty(), "Fetched video metadata");
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn list_likes(&self, video_id: &VideoId) -> Result<Vec<Like>> {
        self.select(
            LIKES,
            &[
                ("select", LIKE_COLUMNS.to_string()),
                ("video_id", eq(video_id.as_str())),
            ],
        )
        .await
    }

    async fn insert_like(&self, like: NewLike) -> Result<InsertedLike> {
        let inserted: InsertedLike = self.insert(LIKES, &like).await?;
        info!(
            video_id = %like.video_id,
            user_id = %like.user_id,
            like_id = %inserted.id,
            "Like inserted"
        );
        Ok(inserted)
    }

    async fn delete_like(&self, id: &LikeId) -> Result<()> {
        let response = self
            .request(Method::DELETE, &self.config.rest_url(LIKES))
            .query(&[("id", eq(id.as_str()))])
            .send()
            .await?;
        ensure_success(response).await?;

        info!(like_id = %id, "Like deleted");
        Ok(())
    }

    async fn list_comments(
        &self,
        video_id: &VideoId,
        order: CommentOrder,
    ) -> Result<Vec<Comment>> {
        self.select(
            COMMENTS,
            &[
                ("select", COMMENT_COLUMNS.to_string()),
                ("video_id", eq(video_id.as_str())),
                ("order", order.as_query().to_string()),
            ],
        )
        .await
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<InsertedComment> {
        let inserted: InsertedComment = self.insert(COMMENTS, &comment).await?;
        info!(
            video_id = %comment.video_id,
            user_id = %comment.user_id,
            comment_id = %inserted.id,
            "Comment inserted"
        );
        Ok(inserted)
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        self.select(
            VIDEOS,
            &[
                ("select", VIDEO_COLUMNS.to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }
}

// GoTrue wire types

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl From<AuthUser> for CurrentUser {
    fn from(user: AuthUser) -> Self {
        let display_name_hint = user
            .user_metadata
            .as_ref()
            .and_then(|meta| meta.get("username"))
            .and_then(|name| name.as_str())
            .map(str::to_string);

        CurrentUser {
            id: UserId::new(user.id),
            email: user.email,
            display_name_hint,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

/// Pull a human-readable message out of a GoTrue error body
fn auth_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

async fn ensure_auth_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        400 | 401 | 403 | 422 => Err(GatewayError::Unauthorized(auth_error_message(&body))),
        code => Err(GatewayError::from_status(code, body)),
    }
}

#[async_trait]
impl AuthGateway for RestBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let response = self
            .request(Method::POST, &self.config.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token: TokenResponse = decode(ensure_auth_success(response).await?).await?;
        self.set_access_token(Some(token.access_token.clone()));

        let session = AuthSession {
            access_token: token.access_token,
            user: token.user.into(),
        };
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Option<AuthSession>> {
        let response = self
            .request(Method::POST, &self.config.auth_url("signup"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "username": username },
            }))
            .send()
            .await?;

        let body: SignUpResponse = decode(ensure_auth_success(response).await?).await?;
        match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => {
                self.set_access_token(Some(access_token.clone()));
                let session = AuthSession {
                    access_token,
                    user: user.into(),
                };
                info!(user_id = %session.user.id, "Signed up and signed in");
                Ok(Some(session))
            }
            _ => {
                info!("Signed up, email confirmation pending");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        if self.access_token().is_none() {
            return Ok(());
        }

        let response = self
            .request(Method::POST, &self.config.auth_url("logout"))
            .send()
            .await?;
        // The local token is dropped even if the backend rejects the call
        self.set_access_token(None);
        ensure_auth_success(response).await?;

        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(auth_error_message(body), "Invalid login credentials");

        let body = r#"{"code":422,"msg":"Password should be at least 6 characters"}"#;
        assert_eq!(
            auth_error_message(body),
            "Password should be at least 6 characters"
        );

        assert_eq!(auth_error_message("plain text"), "plain text");
    }

    #[test]
    fn test_auth_user_reads_username_hint() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "cook@example.com",
            "user_metadata": { "username": "chef" }
        }))
        .unwrap();

        let current: CurrentUser = user.into();
        assert_eq!(current.id, UserId::new("u1"));
        assert_eq!(current.display_name_hint.as_deref(), Some("chef"));
    }

    #[test]
    fn test_access_token_roundtrip() {
        let backend = RestBackend::new(GatewayConfig::new("http://localhost", "anon"));
        assert!(backend.access_token().is_none());

        backend.set_access_token(Some("jwt".into()));
        assert_eq!(backend.access_token().as_deref(), Some("jwt"));
    }
}
