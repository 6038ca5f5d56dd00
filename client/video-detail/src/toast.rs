//! Transient notifications shown by the app shell

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

pub trait Toaster: Send + Sync {
    fn show(&self, toast: Toast);
}

#[derive(Clone)]
pub struct ChannelToaster {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelToaster {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Toaster for ChannelToaster {
    fn show(&self, toast: Toast) {
        if self.tx.send(toast).is_err() {
            warn!("Toast receiver dropped, notification ignored");
        }
    }
}
