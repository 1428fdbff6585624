/// Opaque handle to the host's scripting state, read once per request from
/// the state-pointer anchor. Stored as a plain address rather than a raw
/// pointer so it can cross the `dyn ScriptHost` boundary without `unsafe impl
/// Send`/`Sync` gymnastics; it is cast back to a pointer only at the FFI call
/// site in `RealScriptHost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuaState(pub usize);

/// Matches the embedded engine's `lua_pcall` convention: request every
/// result the callee produced.
pub const LUA_MULTRET: i32 = -1;

/// The host's embedded engine uses the standard Lua 5.1 stack type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaType {
    Nil,
    Boolean,
    LightUserdata,
    Number,
    String,
    Table,
    Function,
    Userdata,
    Thread,
    Other(i32),
}

impl LuaType {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => LuaType::Nil,
            1 => LuaType::Boolean,
            2 => LuaType::LightUserdata,
            3 => LuaType::Number,
            4 => LuaType::String,
            5 => LuaType::Table,
            6 => LuaType::Function,
            7 => LuaType::Userdata,
            8 => LuaType::Thread,
            other => LuaType::Other(other),
        }
    }
}
