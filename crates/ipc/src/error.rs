use thiserror::Error;

/// Failures from the pipe transport layer. These are load/connection-time
/// problems, distinct from the protocol-level and dispatch-level error tags
/// that travel inside response bodies.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("failed to create named pipe instance: {0}")]
    CreateFailed(String),

    #[error("failed to connect named pipe: {0}")]
    ConnectFailed(String),

    #[error("failed to read from named pipe: {0}")]
    ReadFailed(String),

    #[error("failed to write to named pipe: {0}")]
    WriteFailed(String),
}
