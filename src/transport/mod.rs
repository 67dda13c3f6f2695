use crate::protocol::Message;

/// Bidirectional, ordered message channel between a client and the server.
///
/// `recv` must be cancel-safe: the server polls it inside `tokio::select!`
/// next to its outbound queue. A `send` dropped partway must not leave a torn
/// frame behind; the rest of it goes out before the next message.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod heartbeat;
pub mod in_memory;
pub mod tcp;

pub use heartbeat::HeartbeatTransport;
pub use in_memory::InMemoryTransport;
pub use tcp::TcpTransport;
