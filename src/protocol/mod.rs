//! Sync wire protocol
//!
//! Every request uses its own TCP connection. The first byte selects a
//! [`Command`]; snapshots and diffs travel as length-prefixed frames, file
//! contents as a raw sized stream.

pub mod client;
pub mod codec;
pub mod command;
pub mod server;

pub use client::HostClient;
pub use codec::FrameCodec;
pub use command::Command;
pub use server::Host;
