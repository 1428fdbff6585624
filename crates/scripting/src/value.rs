/// A typed argument pushed onto the stack ahead of a `pcall`.
#[derive(Debug, Clone)]
pub enum LuaArg {
    Integer(i64),
    Str(String),
}

/// A typed result read back off the stack after a successful `pcall`,
/// classified by `lua_type_of` rather than coerced to a string. Used by
/// dispatcher-level callers that need to interpret numbers and booleans on
/// their own terms (cooldowns, range checks) instead of the generic
/// comma-joined text `pcall_execute` produces for `EXEC_LUA`.
#[derive(Debug, Clone, PartialEq)]
pub enum LuaResult {
    Nil,
    Boolean(bool),
    Number(f64),
    Str(String),
    Other,
}
