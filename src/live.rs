//! Live update channel.
//!
//! The backend pushes "something changed" messages with no schema we rely on.
//! We only track whether the socket is up and when the last message arrived,
//! and reconnect forever after any close or error.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reconnect delay used by the web client.
pub const DEFAULT_RECONNECT: Duration = Duration::from_secs(3);

/// How long to wait before the next connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Same delay every time, no retry limit.
    Fixed(Duration),
    /// `base * 2^(failures - 1)`, capped at `max`; resets after a successful connect.
    CappedExponential { base: Duration, max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_RECONNECT)
    }
}

impl ReconnectPolicy {
    /// Delay before the attempt following `consecutive_failures` failed ones (1-based).
    pub fn delay(&self, consecutive_failures: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::CappedExponential { base, max } => {
                let exp = consecutive_failures.saturating_sub(1).min(31);
                base.checked_mul(1u32 << exp).map_or(max, |d| d.min(max))
            }
        }
    }
}

/// Observable state of the live channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveStatus {
    pub connected: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub messages: u64,
    pub reconnects: u64,
}

/// Handle to the background reconnect task.
pub struct LiveChannel {
    status: watch::Receiver<LiveStatus>,
    handle: JoinHandle<()>,
}

impl LiveChannel {
    /// Spawn the connect/reconnect loop. It runs until `shutdown` is cancelled.
    pub fn spawn(url: String, policy: ReconnectPolicy, shutdown: CancellationToken) -> Self {
        let (tx, rx) = watch::channel(LiveStatus::default());
        let handle = tokio::spawn(run(url, policy, tx, shutdown));
        Self { status: rx, handle }
    }

    /// A receiver that is notified on every status change.
    pub fn status(&self) -> watch::Receiver<LiveStatus> {
        self.status.clone()
    }

    pub fn snapshot(&self) -> LiveStatus {
        self.status.borrow().clone()
    }

    /// Wait for the task to exit after shutdown was requested.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!("Live channel task ended abnormally: {e}");
        }
    }
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    tx: watch::Sender<LiveStatus>,
    shutdown: CancellationToken,
) {
    let mut failures: u32 = 0;

    loop {
        let attempt = tokio::select! {
            _ = shutdown.cancelled() => break,
            res = connect_async(url.as_str()) => res,
        };

        match attempt {
            Ok((ws, _)) => {
                info!("Live channel connected to {url}");
                failures = 0;
                tx.send_modify(|s| s.connected = true);

                let (mut write, mut read) = ws.split();
                let stop = loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            let _ = write.send(Message::Close(None)).await;
                            break true;
                        }
                        msg = read.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                debug!("Live message: {}", text.as_str());
                                mark_update(&tx);
                            }
                            Some(Ok(Message::Binary(_))) => mark_update(&tx),
                            Some(Ok(Message::Close(frame))) => {
                                debug!("Live channel close frame: {frame:?}");
                                break false;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!("Live channel error: {e}");
                                break false;
                            }
                            None => break false,
                        }
                    }
                };

                tx.send_modify(|s| s.connected = false);
                if stop {
                    break;
                }
                info!("Live channel disconnected");
            }
            Err(e) => {
                warn!("Live channel connect failed: {e}");
                tx.send_modify(|s| s.connected = false);
            }
        }

        failures = failures.saturating_add(1);
        let delay = policy.delay(failures);
        debug!("Reconnecting live channel in {delay:?}");
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        tx.send_modify(|s| s.reconnects += 1);
    }

    info!("Live channel stopped");
}

fn mark_update(tx: &watch::Sender<LiveStatus>) {
    tx.send_modify(|s| {
        s.last_update = Some(Utc::now());
        s.messages += 1;
    });
}

/// Waits for live messages the caller has not consumed yet.
///
/// The message count seen so far is kept across calls, so messages that
/// arrive while the caller is busy elsewhere still wake the next `changed`.
pub struct UpdateCursor {
    rx: watch::Receiver<LiveStatus>,
    seen: u64,
}

impl UpdateCursor {
    pub fn new(rx: watch::Receiver<LiveStatus>) -> Self {
        Self { rx, seen: 0 }
    }

    /// Resolves once `messages` exceeds the last count returned. Pends forever
    /// if the channel task is gone.
    pub async fn changed(&mut self) -> u64 {
        let seen = self.seen;
        let messages = match self.rx.wait_for(|s| s.messages > seen).await {
            Ok(status) => status.messages,
            Err(_) => return std::future::pending().await,
        };
        self.seen = messages;
        messages
    }
}
