//! Reload escalation.

use tokio::sync::mpsc;

/// Performs a full application reload.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

/// Asks the composition root to rebuild the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequest;

/// Reloader that forwards requests over a channel.
#[derive(Debug, Clone)]
pub struct ChannelReloader {
    tx: mpsc::UnboundedSender<ReloadRequest>,
}

impl ChannelReloader {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReloadRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Reloader for ChannelReloader {
    fn reload(&self) {
        if self.tx.send(ReloadRequest).is_err() {
            tracing::error!("Reload requested but nothing is listening for reload requests");
        }
    }
}
