use tokio::time::{interval_at, Duration, Instant};

use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Transport wrapper that keeps a quiet connection alive and notices when
/// the peer has gone silent.
///
/// Heartbeats are sent every `heartbeat_interval` while a `recv` is pending
/// and are filtered out of what the caller receives. Nothing heard for
/// `idle_timeout` fails the `recv`.
pub struct HeartbeatTransport<T: Transport> {
    inner: T,
    heartbeat_interval: Duration,
    idle_timeout: Duration,
    last_heard: Instant,
    enabled: bool,
}

impl<T: Transport> HeartbeatTransport<T> {
    pub fn new(inner: T, heartbeat_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            inner,
            heartbeat_interval,
            idle_timeout,
            last_heard: Instant::now(),
            enabled: true,
        }
    }

    /// Pass-through wrapper, for transports that cannot go stale.
    pub fn disabled(inner: T) -> Self {
        Self {
            enabled: false,
            ..Self::new(inner, Duration::from_secs(10), Duration::from_secs(45))
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn is_idle_timeout(&self) -> bool {
        self.last_heard.elapsed() > self.idle_timeout
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for HeartbeatTransport<T> {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        self.inner.send(msg).await
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        if !self.enabled {
            return self.inner.recv().await;
        }

        let mut heartbeat_timer = interval_at(Instant::now() + self.heartbeat_interval, self.heartbeat_interval);
        loop {
            tokio::select! {
                msg_result = self.inner.recv() => {
                    match msg_result? {
                        Message::Heartbeat { version } => {
                            if version != PROTOCOL_VERSION {
                                log::warn!(
                                    "heartbeat version mismatch: expected {}, got {}",
                                    PROTOCOL_VERSION,
                                    version
                                );
                                return Err(anyhow::anyhow!(
                                    "Heartbeat version mismatch: expected {}, got {}",
                                    PROTOCOL_VERSION,
                                    version
                                ));
                            }
                            self.last_heard = Instant::now();
                        }
                        msg => {
                            self.last_heard = Instant::now();
                            return Ok(msg);
                        }
                    }
                }
                _ = heartbeat_timer.tick() => {
                    if self.is_idle_timeout() {
                        log::warn!("peer silent for longer than {:?}", self.idle_timeout);
                        return Err(anyhow::anyhow!(
                            "Connection idle timeout exceeded ({:?})",
                            self.idle_timeout
                        ));
                    }
                    // a send cut short here is finished by the next inner send
                    self.inner.send(Message::Heartbeat { version: PROTOCOL_VERSION }).await?;
                }
            }
        }
    }
}
