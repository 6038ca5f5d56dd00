use anyhow::{Context, Result};
use recipe_gateway::{RestBackend, VideoId};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use video_detail::presentation;
use video_detail::telemetry::init_tracing;
use video_detail::{
    AuthService, ChannelNavigator, ChannelToaster, Config, DetailOptions, Route, SessionStore,
    Toast, VideoDetailViewModel, VideoFeedViewModel,
};

fn drain(routes: &mut UnboundedReceiver<Route>, toasts: &mut UnboundedReceiver<Toast>) {
    while let Ok(route) = routes.try_recv() {
        info!(path = %route.path(), "Navigation requested");
    }
    while let Ok(toast) = toasts.try_recv() {
        info!(title = %toast.title, description = %toast.description, variant = ?toast.variant, "Toast");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.log_format);

    info!(env = %config.app.env, backend = %config.gateway.url, "Starting video-detail client");

    let backend = Arc::new(RestBackend::new(config.gateway.clone()));
    let session = SessionStore::new();
    let (navigator, mut routes) = ChannelNavigator::new();
    let (toaster, mut toasts) = ChannelToaster::new();
    let navigator = Arc::new(navigator);

    let auth = AuthService::new(
        backend.clone(),
        session.clone(),
        navigator.clone(),
        Arc::new(toaster),
    );

    match (&config.demo.login_email, &config.demo.login_password) {
        (Some(email), Some(password)) => {
            // Failure is already reported through a toast
            let _ = auth.sign_in(email, password).await;
        }
        _ => auth.initialize(),
    }
    drain(&mut routes, &mut toasts);

    let video_id = std::env::args().nth(1).or_else(|| config.demo.video_id.clone());

    match video_id {
        Some(id) => {
            let view_model = VideoDetailViewModel::new(
                VideoId::new(id),
                backend.clone(),
                session.clone(),
                navigator.clone(),
                DetailOptions {
                    heart_duration: config.ui.heart_animation(),
                },
            );
            view_model.mount().await;

            let view = presentation::render(&view_model.snapshot());
            println!(
                "{}",
                serde_json::to_string_pretty(&view).context("Failed to serialize view")?
            );
            view_model.teardown();
        }
        None => {
            let feed = VideoFeedViewModel::new(backend.clone(), session.clone(), navigator.clone());
            let state = feed.load().await;
            if let Some(placeholder) = presentation::feed_placeholder(&state) {
                info!("{}", placeholder);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&state).context("Failed to serialize feed")?
            );
        }
    }

    drain(&mut routes, &mut toasts);
    info!("video-detail client finished");
    Ok(())
}
