use std::io::ErrorKind;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::Transport;

/// Default timeout for network operations (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum message size (10 MB) to prevent excessive memory allocation.
const MAX_MESSAGE_SIZE: u32 = 10_000_000;

const LEN_PREFIX: usize = 4;
const READ_CHUNK: usize = 4096;

/// Length-prefixed bincode frames over a TCP stream.
///
/// Both directions are buffered. A `recv` dropped halfway through a frame
/// loses nothing, and the unwritten tail of an interrupted `send` goes out
/// ahead of the next frame.
pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
    max_message_size: u32,
    read_buf: Vec<u8>,
    write_buf: Vec<u8>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE)
    }

    pub fn with_config(stream: TcpStream, timeout_duration: Duration, max_message_size: u32) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("could not disable Nagle: {}", e);
        }
        Self {
            stream,
            timeout_duration,
            max_message_size,
            read_buf: Vec::new(),
            write_buf: Vec::new(),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Decode one complete frame from the front of the buffer, if present.
    fn take_frame(&mut self) -> anyhow::Result<Option<Message>> {
        if self.read_buf.len() < LEN_PREFIX {
            return Ok(None);
        }
        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&self.read_buf[..LEN_PREFIX]);
        let len = u32::from_be_bytes(len_bytes);
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }
        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        let end = LEN_PREFIX + len as usize;
        if self.read_buf.len() < end {
            return Ok(None);
        }
        let msg = bincode::deserialize(&self.read_buf[LEN_PREFIX..end])
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e));
        self.read_buf.drain(..end);
        msg.map(Some)
    }

    /// Write out everything queued. Bytes leave the buffer only once the
    /// socket has taken them.
    async fn flush_pending(&mut self) -> anyhow::Result<()> {
        while !self.write_buf.is_empty() {
            let n = self.stream.write(&self.write_buf).await.map_err(write_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.write_buf.drain(..n);
        }
        self.stream.flush().await.map_err(write_error)
    }
}

fn write_error(e: std::io::Error) -> anyhow::Error {
    if e.kind() == ErrorKind::BrokenPipe || e.kind() == ErrorKind::ConnectionReset {
        anyhow::anyhow!("Connection closed by peer")
    } else {
        anyhow::anyhow!("Write error: {}", e)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let data = bincode::serialize(&msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() > self.max_message_size as usize {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.max_message_size
            ));
        }
        self.write_buf.reserve(LEN_PREFIX + data.len());
        self.write_buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.write_buf.extend_from_slice(&data);

        let limit = self.timeout_duration;
        timeout(limit, self.flush_pending())
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limit))?
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(msg) = self.take_frame()? {
                return Ok(msg);
            }
            let n = timeout(self.timeout_duration, self.stream.read(&mut chunk))
                .await
                .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", self.timeout_duration))?
                .map_err(|e| {
                    if e.kind() == ErrorKind::ConnectionReset {
                        anyhow::anyhow!("Connection reset by peer")
                    } else {
                        anyhow::anyhow!("Read error: {}", e)
                    }
                })?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.read_buf.extend_from_slice(&chunk[..n]);
        }
    }
}
