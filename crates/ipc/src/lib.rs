//! IPC Server: the named-pipe transport, the per-connection state machine,
//! and the Ping fast path that answers liveness checks without the render
//! thread.

mod error;
mod server;
mod transport;

#[cfg(windows)]
mod real_pipe;

pub mod fake_pipe;

pub use error::IpcError;
pub use server::{run_session, IpcServer, PollConfig};
pub use transport::{PipeConnection, PipeListener, ReadOutcome};

#[cfg(windows)]
pub use real_pipe::{RealPipeConnection, RealPipeListener};
