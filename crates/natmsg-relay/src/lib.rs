//! Message relay between a caller-facing port and a spawned processor.
//!
//! Some message handlers cannot run on an arbitrary execution context —
//! they belong to a library that demands its own process. The relay
//! keeps the caller's stdio channel in this process and moves the real
//! handler into a child: it spawns the processor, establishes a private
//! channel to it, confirms liveness with a one-shot handshake, then
//! pumps messages in both directions until either stream ends.
//!
//! Lifetimes of relay and processor are coupled through
//! [`natmsg_lifeline::ProcessGroup`], so neither outlives the other.

pub mod error;
pub mod handshake;
pub mod processor;
pub mod relay;
pub mod spawn;

pub use error::{RelayError, Result};
pub use handshake::{sync_child, sync_parent, SYNC_TOKEN};
pub use processor::run_processor;
pub use relay::{Relay, StopHandle};
pub use spawn::{connect_processor, spawn_processor, ChannelPort, PROCESS_MODE_ARG};
