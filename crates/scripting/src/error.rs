use thiserror::Error;

/// Failure modes for a single scripting-adapter call. Never escapes to the
/// controller directly; the dispatcher turns each variant into the
/// protocol's own tagged string.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("scripting state pointer is null")]
    StateNull,

    #[error("load failed: {0}")]
    LoadFailed(String),

    #[error("pcall failed: {0}")]
    PcallFailed(String),

    #[error("host code panicked; stack reset")]
    Panicked,

    #[error("result at index {index} had unexpected type")]
    UnexpectedResultType { index: i32 },
}
