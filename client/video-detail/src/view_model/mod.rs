pub mod feed;
pub mod video_detail;

pub use feed::{FeedEntry, FeedState, VideoFeedViewModel};
pub use video_detail::{
    ActionOutcome, Activity, DetailOptions, Phase, VideoDetailState, VideoDetailViewModel,
};
