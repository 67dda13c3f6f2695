#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod core;
pub mod player;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod transport;

pub use crate::core::*;
pub use player::{AiController, Controller};

#[cfg(feature = "std")]
pub use client::ClientNode;
#[cfg(feature = "std")]
pub use logging::{init_logging, parse_level, LOG_ENV};
#[cfg(feature = "std")]
pub use protocol::{Message, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use server::{MatchServer, MatchSummary, ServerHandle, DEFAULT_TICK};
#[cfg(feature = "std")]
pub use transport::{HeartbeatTransport, InMemoryTransport, TcpTransport, Transport};
