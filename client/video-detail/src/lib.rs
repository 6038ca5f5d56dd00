//! Video detail client core for Hosur Recipes
//!
//! Owns the like and comment synchronization for a single recipe video and
//! the small amount of app-shell state around it:
//!
//! - [`session`]: the process-wide observable session store
//! - [`sync`]: like and comment synchronizers (optimistic update, then refresh)
//! - [`view_model`]: video detail and feed view-models
//! - [`presentation`]: render models and display strings
//! - [`services`]: sign-in, sign-up and sign-out flows
//! - [`navigation`] / [`toast`]: requests to the app shell

pub mod config;
pub mod error;
pub mod navigation;
pub mod presentation;
pub mod services;
pub mod session;
pub mod sync;
pub mod telemetry;
pub mod toast;
pub mod view_model;

pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use navigation::{ChannelNavigator, Navigator, Route};
pub use services::AuthService;
pub use session::{Session, SessionStore};
pub use toast::{ChannelToaster, Toast, ToastVariant, Toaster};
pub use view_model::{
    ActionOutcome, DetailOptions, FeedState, VideoDetailState, VideoDetailViewModel,
    VideoFeedViewModel,
};
