use recipe_gateway::{CurrentUser, InMemoryGateway, Operation};
use std::sync::Arc;
use std::time::Duration;
use video_detail::{ChannelNavigator, FeedState, Route, SessionStore, VideoFeedViewModel};

fn feed(
    gateway: Arc<InMemoryGateway>,
    session: SessionStore,
) -> (
    VideoFeedViewModel,
    tokio::sync::mpsc::UnboundedReceiver<Route>,
) {
    let (navigator, routes) = ChannelNavigator::new();
    (
        VideoFeedViewModel::new(gateway, session, Arc::new(navigator)),
        routes,
    )
}

#[tokio::test]
async fn test_anonymous_feed_redirects_to_login() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.add_video("v1", "Ragi Mudde", "owner-1");
    let (feed, mut routes) = feed(gateway.clone(), SessionStore::anonymous());

    let state = feed.load().await;

    assert_eq!(state, FeedState::RedirectedToLogin);
    assert_eq!(routes.try_recv().unwrap(), Route::Login);
    assert_eq!(gateway.call_count(Operation::ListVideos), 0);
}

#[tokio::test]
async fn test_feed_counts_match_records() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.add_video("v1", "Ragi Mudde", "owner-1");
    gateway.add_video("v2", "Bisi Bele Bath", "owner-2");
    gateway.seed_like("v1", "u1");
    gateway.seed_like("v1", "u2");
    gateway.seed_comment("v1", "u2", "Soft and fluffy");
    gateway.seed_comment("v2", "u1", "Needs more spice");
    gateway.seed_comment("v2", "u3", "Perfect");
    let (feed, _routes) = feed(gateway, SessionStore::signed_in(CurrentUser::new("u1")));

    let FeedState::Ready(entries) = feed.load().await else {
        panic!("expected a loaded feed");
    };

    assert_eq!(entries.len(), 2);
    for entry in &entries {
        match entry.video.id.as_str() {
            "v1" => {
                assert_eq!(entry.likes, 2);
                assert_eq!(entry.comments, 1);
            }
            "v2" => {
                assert_eq!(entry.likes, 0);
                assert_eq!(entry.comments, 2);
            }
            other => panic!("unexpected video {}", other),
        }
    }
}

#[tokio::test]
async fn test_feed_list_failure_is_empty() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.add_video("v1", "Ragi Mudde", "owner-1");
    gateway.fail(Operation::ListVideos);
    let (feed, _routes) = feed(gateway, SessionStore::signed_in(CurrentUser::new("u1")));

    assert_eq!(feed.load().await, FeedState::Ready(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn test_feed_waits_for_session() {
    let gateway = Arc::new(InMemoryGateway::new());
    let session = SessionStore::new();
    let (feed, mut routes) = feed(gateway.clone(), session.clone());

    let loading = tokio::spawn(async move { feed.load().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!loading.is_finished());
    assert!(routes.try_recv().is_err());

    session.resolve(Some(CurrentUser::new("u1")));

    assert_eq!(loading.await.unwrap(), FeedState::Ready(Vec::new()));
    assert_eq!(gateway.call_count(Operation::ListVideos), 1);
}
