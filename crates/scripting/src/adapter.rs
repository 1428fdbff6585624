use std::panic::{self, AssertUnwindSafe};

use crate::error::ScriptError;
use crate::host::ScriptHost;
use crate::lua_state::{LuaState, LuaType, LUA_MULTRET};
use crate::spell_info::{SpellInfo, SENTINEL_INTEGER, SENTINEL_NUMBER, SENTINEL_STRING};
use crate::value::{LuaArg, LuaResult};

const CHUNK_NAME: &str = "=WowBridge";

/// Everything that touches the host's scripting stack goes through here.
/// Every public entry point restores the stack to the depth it found on
/// entry, on every exit path, including a panic inside the host call,
/// which is caught and treated as a hard stack reset to zero.
pub struct ScriptingAdapter<H: ScriptHost> {
    host: H,
}

impl<H: ScriptHost> ScriptingAdapter<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    fn state(&self) -> Result<LuaState, ScriptError> {
        self.host.state_pointer().ok_or(ScriptError::StateNull)
    }

    /// Whether the scripting state pointer currently resolves. Dispatcher
    /// handlers that have their own variant-specific "unavailable" tag
    /// check this up front rather than relying on the generic error text a
    /// failed `pcall_eval` would produce.
    pub fn is_available(&self) -> bool {
        self.state().is_ok()
    }

    /// Fire-and-forget script execution; no result is observable.
    pub fn simple_execute(&self, code: &[u8], source_name: &str) -> Result<(), ScriptError> {
        self.state()?;
        self.host.script_execute(code, source_name);
        Ok(())
    }

    /// `EXEC_LUA` path: loads and calls `code`, coercing every result to a
    /// string and comma-joining them, fully formatted as a `LUA_RESULT:`
    /// response. Never panics past this call.
    pub fn pcall_execute(&self, code: &[u8]) -> String {
        let state = match self.state() {
            Ok(s) => s,
            Err(_) => return "LUA_RESULT:ERROR:state null".to_string(),
        };
        let snapshot = self.host.get_top(state);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pcall_execute_inner(state, snapshot, code)));
        match outcome {
            Ok(response) => response,
            Err(_) => {
                self.host.set_top(state, 0);
                "LUA_RESULT:ERROR:panicked".to_string()
            }
        }
    }

    fn pcall_execute_inner(&self, state: LuaState, snapshot: i32, code: &[u8]) -> String {
        let load_rc = self.host.load_buffer(state, code, CHUNK_NAME);
        if load_rc != 0 {
            let msg = self.host.to_lstring(state, -1).unwrap_or_else(|| "unknown error".to_string());
            self.host.set_top(state, snapshot);
            return format!("LUA_RESULT:ERROR:load failed:{msg}");
        }
        let pcall_rc = self.host.pcall(state, 0, LUA_MULTRET);
        if pcall_rc != 0 {
            let msg = self.host.to_lstring(state, -1).unwrap_or_else(|| "unknown error".to_string());
            self.host.set_top(state, snapshot);
            return format!("LUA_RESULT:ERROR:pcall failed:{msg}");
        }
        let after = self.host.get_top(state);
        let mut parts = Vec::new();
        for idx in (snapshot + 1)..=after {
            parts.push(self.coerce_to_string(state, idx));
        }
        self.host.set_top(state, snapshot);
        format!("LUA_RESULT:{}", parts.join(","))
    }

    fn coerce_to_string(&self, state: LuaState, idx: i32) -> String {
        match self.host.lua_type_of(state, idx) {
            LuaType::Nil => "nil".to_string(),
            LuaType::Boolean => {
                if self.host.to_boolean(state, idx) {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            LuaType::Number => format_number(self.host.to_number(state, idx)),
            _ => self
                .host
                .to_lstring(state, idx)
                .unwrap_or_else(|| "userdata".to_string()),
        }
    }

    /// Typed pcall path used by the dispatcher's own command handlers
    /// (cooldowns, range checks, time): loads `code`, pushes `args` in
    /// order, calls with `args.len()` arguments and `LUA_MULTRET`, and
    /// classifies each result by stack type instead of stringifying it.
    /// Restores the stack on every exit path, including a caught panic.
    pub fn pcall_eval(&self, code: &[u8], args: &[LuaArg]) -> Result<Vec<LuaResult>, ScriptError> {
        let state = self.state()?;
        let snapshot = self.host.get_top(state);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pcall_eval_inner(state, snapshot, code, args)));
        match outcome {
            Ok(result) => result,
            Err(_) => {
                self.host.set_top(state, 0);
                Err(ScriptError::Panicked)
            }
        }
    }

    fn pcall_eval_inner(
        &self,
        state: LuaState,
        snapshot: i32,
        code: &[u8],
        args: &[LuaArg],
    ) -> Result<Vec<LuaResult>, ScriptError> {
        let load_rc = self.host.load_buffer(state, code, CHUNK_NAME);
        if load_rc != 0 {
            let msg = self.host.to_lstring(state, -1).unwrap_or_else(|| "unknown error".to_string());
            self.host.set_top(state, snapshot);
            return Err(ScriptError::LoadFailed(msg));
        }
        for arg in args {
            match arg {
                LuaArg::Integer(v) => self.host.push_integer(state, *v),
                LuaArg::Str(v) => self.host.push_string(state, v),
            }
        }
        let pcall_rc = self.host.pcall(state, args.len() as i32, LUA_MULTRET);
        if pcall_rc != 0 {
            let msg = self.host.to_lstring(state, -1).unwrap_or_else(|| "unknown error".to_string());
            self.host.set_top(state, snapshot);
            return Err(ScriptError::PcallFailed(msg));
        }
        let after = self.host.get_top(state);
        let mut results = Vec::new();
        for idx in (snapshot + 1)..=after {
            results.push(self.classify(state, idx));
        }
        self.host.set_top(state, snapshot);
        Ok(results)
    }

    fn classify(&self, state: LuaState, idx: i32) -> LuaResult {
        match self.host.lua_type_of(state, idx) {
            LuaType::Nil => LuaResult::Nil,
            LuaType::Boolean => LuaResult::Boolean(self.host.to_boolean(state, idx)),
            LuaType::Number => LuaResult::Number(self.host.to_number(state, idx)),
            LuaType::String => LuaResult::Str(self.host.to_lstring(state, idx).unwrap_or_default()),
            _ => LuaResult::Other,
        }
    }

    /// `GetSpellInfo`: pushes `spell_id`, invokes the native function
    /// directly (bypassing `pcall`), and reads the fixed result indices the
    /// host's function is known to populate. Missing/mistyped fields
    /// become sentinels rather than failing the call.
    pub fn get_spell_info(&self, spell_id: i32) -> SpellInfo {
        let state = match self.state() {
            Ok(s) => s,
            Err(_) => return SpellInfo::unavailable(),
        };
        let snapshot = self.host.get_top(state);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.get_spell_info_inner(state, spell_id)));
        match outcome {
            Ok(info) => {
                self.host.set_top(state, snapshot);
                info
            }
            Err(_) => {
                self.host.set_top(state, 0);
                SpellInfo::unavailable()
            }
        }
    }

    fn get_spell_info_inner(&self, state: LuaState, spell_id: i32) -> SpellInfo {
        self.host.push_integer(state, spell_id as i64);
        self.host.call_native_spell_info(state);

        let name = self.string_field(state, 2);
        let rank = self.string_field(state, 3);
        let icon = self.string_field(state, 4);
        let cost = self.number_field(state, 5);
        let power_type = self.integer_field(state, 7);
        let cast_time_ms = self.number_field(state, 8);
        let min_range = self.number_field(state, 9);
        let max_range = if self.host.lua_type_of(state, 10) == LuaType::Number {
            Some(self.host.to_number(state, 10))
        } else {
            None
        };

        SpellInfo {
            name,
            rank,
            icon,
            cost,
            power_type,
            cast_time_ms,
            min_range,
            max_range,
        }
    }

    fn string_field(&self, state: LuaState, idx: i32) -> String {
        match self.host.lua_type_of(state, idx) {
            LuaType::String => self.host.to_lstring(state, idx).unwrap_or_else(|| SENTINEL_STRING.to_string()),
            _ => SENTINEL_STRING.to_string(),
        }
    }

    fn number_field(&self, state: LuaState, idx: i32) -> f64 {
        match self.host.lua_type_of(state, idx) {
            LuaType::Number => self.host.to_number(state, idx),
            _ => SENTINEL_NUMBER,
        }
    }

    fn integer_field(&self, state: LuaState, idx: i32) -> i64 {
        match self.host.lua_type_of(state, idx) {
            LuaType::Number => self.host.to_integer(state, idx),
            _ => SENTINEL_INTEGER,
        }
    }
}

/// Mirrors the host's own number-to-string coercion: integral floats print
/// without a trailing `.0` (`EXEC_LUA:return 1` must read back as `1`, not
/// `1.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
