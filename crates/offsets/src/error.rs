use thiserror::Error;

/// Failures that can occur while loading or querying the offsets table.
///
/// Every variant here is a *shape* failure (missing key, address that does not
/// parse as a number). The table never validates that an address is
/// meaningful to the host process (see the crate-level docs).
#[derive(Debug, Error)]
pub enum OffsetsError {
    #[error("failed to read offsets file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse offsets file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("offsets table key {key} has unparseable address: {value}")]
    InvalidAddress { key: &'static str, value: String },

    #[error("offsets table was already initialized")]
    AlreadyInitialized,

    #[error("offsets table has not been initialized yet")]
    NotInitialized,
}
