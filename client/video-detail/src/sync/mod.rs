//! Synchronizers: fetch a collection, derive display state, reconcile after mutation

pub mod comments;
pub mod likes;

pub use comments::{CommentState, CommentSynchronizer, SubmitOutcome};
pub use likes::{LikeState, LikeSynchronizer, ToggleOutcome, HEART_ANIMATION};
