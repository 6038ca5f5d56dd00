//! Process-wide session state
//!
//! A [`SessionStore`] is created once at app start and passed by handle to
//! every view-model that needs the current identity. It starts in the
//! loading state, is resolved by the auth flow, and may change at any time
//! afterwards. Readers subscribe through a `watch` receiver; dropping the
//! receiver unsubscribes.

use recipe_gateway::{CurrentUser, UserId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<CurrentUser>,
    /// True until the auth backend has answered for the first time
    pub loading: bool,
}

impl Session {
    pub fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::loading());
        Self { tx: Arc::new(tx) }
    }

    /// Store with an already signed-in user
    pub fn signed_in(user: CurrentUser) -> Self {
        let store = Self::new();
        store.resolve(Some(user));
        store
    }

    /// Store resolved as anonymous
    pub fn anonymous() -> Self {
        let store = Self::new();
        store.resolve(None);
        store
    }

    /// Finish loading with the given identity (`None` = anonymous)
    pub fn resolve(&self, user: Option<CurrentUser>) {
        match &user {
            Some(u) => info!(user_id = %u.id, "Session resolved"),
            None => info!("Session resolved as anonymous"),
        }
        self.tx.send_replace(Session {
            user,
            loading: false,
        });
    }

    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.tx.borrow().user.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.tx.borrow().user_id().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Wait for the first resolution and return the session at that point
    pub async fn wait_until_resolved(&self) -> Session {
        let mut rx = self.subscribe();
        let session = match rx.wait_for(|s| !s.loading).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        };
        session
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_loading_and_anonymous() {
        let store = SessionStore::new();
        assert!(store.is_loading());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_resolve_signed_in() {
        let store = SessionStore::signed_in(CurrentUser::new("u1"));
        assert!(!store.is_loading());
        assert_eq!(store.user_id(), Some(UserId::new("u1")));
    }

    #[tokio::test]
    async fn test_subscribers_see_identity_changes() {
        let store = SessionStore::anonymous();
        let mut rx = store.subscribe();

        store.resolve(Some(CurrentUser::new("u1")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user_id(), Some(&UserId::new("u1")));

        store.resolve(None);
        rx.changed().await.unwrap();
        assert!(rx.borrow().user.is_none());
    }

    #[tokio::test]
    async fn test_wait_until_resolved() {
        let store = SessionStore::new();
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_until_resolved().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        store.resolve(Some(CurrentUser::new("u7")));

        let session = waiter.await.unwrap();
        assert!(!session.loading);
        assert_eq!(session.user_id(), Some(&UserId::new("u7")));
    }

    #[tokio::test]
    async fn test_wait_until_resolved_returns_immediately_when_resolved() {
        let store = SessionStore::anonymous();

        let session = tokio::time::timeout(Duration::from_secs(1), store.wait_until_resolved())
            .await
            .unwrap();

        assert!(!session.loading);
        assert!(!session.is_signed_in());
    }
}
