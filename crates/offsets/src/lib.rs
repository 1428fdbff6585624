//! Offsets Table: the symbolic-name-to-address map that retargets the
//! bridge to a specific host build.
//!
//! The table is opaque to every other component: it answers "where is
//! `pcall`" but has no opinion on whether that address is correct. Changing
//! the offsets file is the entire mechanism for supporting a new host
//! version.

mod error;
mod raw;
mod table;

pub use error::OffsetsError;
pub use raw::RawOffsets;
pub use table::OffsetsTable;

use once_cell::sync::OnceCell;
use std::path::Path;

static GLOBAL: OnceCell<OffsetsTable> = OnceCell::new();

/// Loads the offsets file at `path`, parses every address, and installs it
/// as the process-wide table. May only succeed once per process.
pub fn init_from_file(path: &Path) -> Result<&'static OffsetsTable, OffsetsError> {
    let text = std::fs::read_to_string(path).map_err(|source| OffsetsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let raw: RawOffsets = toml::from_str(&text).map_err(|source| OffsetsError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    let table = OffsetsTable::from_raw(raw)?;
    GLOBAL
        .set(table)
        .map_err(|_| OffsetsError::AlreadyInitialized)?;
    log::info!("offsets table loaded from {}", path.display());
    GLOBAL.get().ok_or(OffsetsError::NotInitialized)
}

/// Returns the process-wide offsets table, if it has been initialized.
pub fn global() -> Result<&'static OffsetsTable, OffsetsError> {
    GLOBAL.get().ok_or(OffsetsError::NotInitialized)
}

/// True once `init_from_file` has succeeded. A readiness check, not a
/// validity check.
pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}
