use crate::lua_state::{LuaState, LuaType};

/// The raw call surface the adapter needs from the host's embedded scripting
/// engine. `RealScriptHost` implements this over function pointers read from
/// the offsets table; `fake::FakeScriptHost` implements it over an in-memory
/// stack so adapter and dispatcher logic can be exercised without a live
/// host.
///
/// `Send + Sync` because the singleton holding this behind a `dyn` pointer
/// lives in process-wide static storage, even though in practice only the
/// render thread ever calls into it.
pub trait ScriptHost: Send + Sync {
    /// Reads the state pointer from the anchor address. `None` if the
    /// anchor currently holds zero.
    fn state_pointer(&self) -> Option<LuaState>;

    fn get_top(&self, state: LuaState) -> i32;
    fn set_top(&self, state: LuaState, index: i32);

    fn push_integer(&self, state: LuaState, value: i64);
    fn push_string(&self, state: LuaState, value: &str);
    fn push_nil(&self, state: LuaState);

    fn lua_type_of(&self, state: LuaState, index: i32) -> LuaType;
    fn to_number(&self, state: LuaState, index: i32) -> f64;
    fn to_integer(&self, state: LuaState, index: i32) -> i64;
    fn to_boolean(&self, state: LuaState, index: i32) -> bool;
    /// The host's string-coercion primitive: works on strings and numbers,
    /// returns `None` for anything else (mirrors `lua_tolstring`).
    fn to_lstring(&self, state: LuaState, index: i32) -> Option<String>;

    /// Compiles `code` as a chunk named `chunk_name`. Returns `0` on
    /// success; on failure the error message is left on top of the stack.
    fn load_buffer(&self, state: LuaState, code: &[u8], chunk_name: &str) -> i32;

    /// Calls the function on top of the stack with `nargs` arguments
    /// already pushed beneath it. Returns `0` on success; on failure the
    /// error message is left on top of the stack.
    fn pcall(&self, state: LuaState, nargs: i32, nresults: i32) -> i32;

    /// Fire-and-forget: the host's "execute script text" entry point. No
    /// result is observable through this path.
    fn script_execute(&self, code: &[u8], source_name: &str);

    /// Invokes the host's native spell-info function directly (not through
    /// `pcall`) with the spell id already pushed. Returns the number of
    /// result values the callee left on the stack.
    fn call_native_spell_info(&self, state: LuaState) -> i32;
}
