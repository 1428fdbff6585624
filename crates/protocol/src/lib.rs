//! Shared wire types for the named-pipe RPC channel: the `Request` enum the
//! IPC server parses into, and the command-grammar parser itself.
//!
//! Response formatting is deliberately not in this crate: each tag's body is
//! specific enough to its command (see the dispatcher) that a shared
//! `Response` type would just be a `String` wrapper with no behavior of its
//! own.

mod parse;
mod request;

pub use parse::parse_command;
pub use request::Request;

/// Canonical named-pipe path the IPC server listens on.
pub const PIPE_NAME: &str = r"\\.\pipe\WowInjectPipe";

/// Field delimiter used by every response tag except `SPELLINFO`.
pub const FIELD_DELIMITER: char = ',';

/// Field delimiter used only by `SPELLINFO`, because spell names may
/// themselves contain commas. This is the one documented exception to
/// `FIELD_DELIMITER` in the whole protocol.
pub const SPELLINFO_DELIMITER: char = '|';
