//! Sign-in, sign-up and sign-out flows
//!
//! Each flow talks to the [`AuthGateway`], resolves the shared
//! [`SessionStore`], and reports back to the user through a toast or a
//! navigation request.

use recipe_gateway::{AuthGateway, CurrentUser};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use crate::toast::{Toast, Toaster};

const MISSING_FIELDS_TITLE: &str = "Missing Information";
const MISSING_FIELDS_BODY: &str = "Please fill in all required fields.";

#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthGateway>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    toaster: Arc<dyn Toaster>,
}

impl AuthService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        toaster: Arc<dyn Toaster>,
    ) -> Self {
        Self {
            auth,
            session,
            navigator,
            toaster,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Without a persisted session the visitor starts anonymous
    pub fn initialize(&self) {
        if self.session.is_loading() {
            self.session.resolve(None);
        }
    }

    fn require(&self, fields: &[&str]) -> ClientResult<()> {
        if fields.iter().any(|f| f.trim().is_empty()) {
            self.toaster
                .show(Toast::error(MISSING_FIELDS_TITLE, MISSING_FIELDS_BODY));
            return Err(ClientError::InvalidInput(MISSING_FIELDS_BODY.to_string()));
        }
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<CurrentUser> {
        self.require(&[email, password])?;

        match self.auth.sign_in_with_password(email.trim(), password).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "Signed in");
                self.session.resolve(Some(session.user.clone()));
                self.navigator.navigate(Route::Feed);
                Ok(session.user)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.toaster
                    .show(Toast::error("Sign In Failed", e.description()));
                if self.session.is_loading() {
                    self.session.resolve(None);
                }
                Err(e.into())
            }
        }
    }

    /// Register an account; the session is resolved only when the backend
    /// signs the new user in straight away
    pub async fn sign_up(&self, email: &str, password: &str, username: &str) -> ClientResult<()> {
        self.require(&[email, password, username])?;

        match self.auth.sign_up(email.trim(), password, username.trim()).await {
            Ok(session) => {
                match session {
                    Some(session) => {
                        info!(user_id = %session.user.id, "Signed up and signed in");
                        self.session.resolve(Some(session.user));
                    }
                    None => info!("Signed up, email confirmation pending"),
                }
                self.toaster.show(Toast::info(
                    "Sign Up Successful",
                    "Welcome to Hosur Recipes! Please check your email to verify your account.",
                ));
                self.navigator.navigate(Route::Feed);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Sign-up failed");
                self.toaster
                    .show(Toast::error("Sign Up Failed", e.description()));
                Err(e.into())
            }
        }
    }

    /// The local session is cleared even if the backend call fails
    pub async fn sign_out(&self) -> ClientResult<()> {
        let result = self.auth.sign_out().await;
        if let Err(e) = &result {
            warn!(error = %e, "Backend sign-out failed, clearing local session anyway");
        }

        self.session.resolve(None);
        self.navigator.navigate(Route::Home);
        info!("Signed out");
        result.map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ChannelNavigator;
    use crate::toast::{ChannelToaster, ToastVariant};
    use recipe_gateway::{InMemoryGateway, Operation, UserId};
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        gateway: Arc<InMemoryGateway>,
        service: AuthService,
        routes: UnboundedReceiver<Route>,
        toasts: UnboundedReceiver<Toast>,
    }

    fn harness() -> Harness {
        let gateway = Arc::new(InMemoryGateway::new());
        let (navigator, routes) = ChannelNavigator::new();
        let (toaster, toasts) = ChannelToaster::new();
        let service = AuthService::new(
            gateway.clone(),
            SessionStore::new(),
            Arc::new(navigator),
            Arc::new(toaster),
        );
        Harness {
            gateway,
            service,
            routes,
            toasts,
        }
    }

    #[test]
    fn test_initialize_resolves_anonymous() {
        let h = harness();
        assert!(h.service.session().is_loading());

        h.service.initialize();

        assert!(!h.service.session().is_loading());
        assert!(h.service.session().current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_resolves_session_and_opens_feed() {
        let mut h = harness();
        h.gateway
            .add_account("cook@example.com", "secret", CurrentUser::new("u1"));

        let user = h.service.sign_in("cook@example.com", "secret").await.unwrap();

        assert_eq!(user.id, UserId::new("u1"));
        assert_eq!(h.service.session().user_id(), Some(UserId::new("u1")));
        assert_eq!(h.routes.try_recv().unwrap(), Route::Feed);
        assert!(h.toasts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sign_in_failure_shows_destructive_toast() {
        let mut h = harness();

        let err = h.service.sign_in("cook@example.com", "wrong").await.unwrap_err();

        assert!(matches!(err, ClientError::Gateway(_)));
        let toast = h.toasts.try_recv().unwrap();
        assert_eq!(toast.title, "Sign In Failed");
        assert_eq!(toast.description, "Invalid login credentials");
        assert_eq!(toast.variant, ToastVariant::Destructive);
        assert!(h.routes.try_recv().is_err());
        assert!(!h.service.session().is_loading());
    }

    #[tokio::test]
    async fn test_sign_in_requires_fields() {
        let mut h = harness();

        let err = h.service.sign_in("  ", "secret").await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert_eq!(h.gateway.call_count(Operation::SignIn), 0);
        assert_eq!(h.toasts.try_recv().unwrap().title, MISSING_FIELDS_TITLE);
    }

    #[tokio::test]
    async fn test_sign_up_success_toast() {
        let mut h = harness();

        h.service
            .sign_up("new@example.com", "secret", "priya")
            .await
            .unwrap();

        let toast = h.toasts.try_recv().unwrap();
        assert_eq!(toast.title, "Sign Up Successful");
        assert_eq!(
            toast.description,
            "Welcome to Hosur Recipes! Please check your email to verify your account."
        );
        assert_eq!(toast.variant, ToastVariant::Default);
        assert_eq!(h.routes.try_recv().unwrap(), Route::Feed);
        let user = h.service.session().current_user().unwrap();
        assert_eq!(user.display_name_hint.as_deref(), Some("priya"));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_reports_backend_message() {
        let mut h = harness();
        h.gateway
            .add_account("taken@example.com", "secret", CurrentUser::new("u9"));

        let result = h.service.sign_up("taken@example.com", "secret", "priya").await;

        assert!(result.is_err());
        let toast = h.toasts.try_recv().unwrap();
        assert_eq!(toast.title, "Sign Up Failed");
        assert_eq!(toast.description, "User already registered");
        assert!(h.routes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_on_backend_failure() {
        let mut h = harness();
        h.service.session().resolve(Some(CurrentUser::new("u1")));
        h.gateway.fail(Operation::SignOut);

        let result = h.service.sign_out().await;

        assert!(result.is_err());
        assert!(h.service.session().current_user().is_none());
        assert_eq!(h.routes.try_recv().unwrap(), Route::Home);
    }
}
