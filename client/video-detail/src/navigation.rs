//! Navigation requests
//!
//! The core never routes by itself. It asks the app shell to move to a
//! [`Route`] through a [`Navigator`].

use recipe_gateway::VideoId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Feed,
    Search,
    Upload,
    Login,
    SignUp,
    Recipe(String),
    Video(VideoId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Feed => "/feed".to_string(),
            Route::Search => "/search".to_string(),
            Route::Upload => "/upload".to_string(),
            Route::Login => "/login".to_string(),
            Route::SignUp => "/signup".to_string(),
            Route::Recipe(id) => format!("/recipe/{}", id),
            Route::Video(id) => format!("/video/{}", id),
        }
    }

    /// Where the brand logo leads
    pub fn logo_target(session: &Session) -> Route {
        if session.is_signed_in() {
            Route::Feed
        } else {
            Route::Home
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Forwards navigation requests to the app shell over a channel
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        debug!(path = %route.path(), "Navigation requested");
        if self.tx.send(route).is_err() {
            warn!("Navigation receiver dropped, request ignored");
        }
    }
}
