//! Marshals values across the boundary into the host's embedded scripting
//! engine: load/pcall, typed stack push/pop, and the native `GetSpellInfo`
//! fast path. Every entry point restores the stack it was handed, on every
//! exit including a caught panic, the one invariant the rest of the bridge
//! depends on.

mod adapter;
mod error;
mod host;
mod lua_state;
mod real_host;
mod spell_info;
mod value;

pub mod fake;

pub use adapter::{format_number, ScriptingAdapter};
pub use error::ScriptError;
pub use host::ScriptHost;
pub use lua_state::{LuaState, LuaType, LUA_MULTRET};
pub use real_host::RealScriptHost;
pub use spell_info::{SpellInfo, SENTINEL_INTEGER, SENTINEL_NUMBER, SENTINEL_STRING};
pub use value::{LuaArg, LuaResult};
