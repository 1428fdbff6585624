use thiserror::Error;

/// Failure of the install-time pointer walk. Per the design's own rule,
/// every one of these aborts installation without crashing the host: the
/// bridge logs and keeps running with no hook, which leaves the queues
/// filling up and the IPC server timing out every response. That state is
/// observable and deliberate, not a bug to work around here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HookError {
    #[error("present anchor resolved to null")]
    NullAnchor,
    #[error("device pointer resolved to null")]
    NullDevice,
    #[error("vtable pointer resolved to null")]
    NullVtable,
    #[error("vtable slot resolved to null")]
    NullSlot,
}
