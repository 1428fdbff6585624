use parking_lot::Mutex;

use crate::host::ScriptHost;
use crate::lua_state::{LuaState, LuaType};

/// A stack slot value as the fake engine models it. Distinct from
/// `value::LuaArg`/`value::LuaResult`: this is the fake's own storage
/// representation, not part of the public adapter surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Str(String),
}

impl LuaValue {
    fn type_tag(&self) -> LuaType {
        match self {
            LuaValue::Nil => LuaType::Nil,
            LuaValue::Boolean(_) => LuaType::Boolean,
            LuaValue::Integer(_) | LuaValue::Number(_) => LuaType::Number,
            LuaValue::Str(_) => LuaType::String,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            LuaValue::Integer(v) => *v as f64,
            LuaValue::Number(v) => *v,
            _ => 0.0,
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            LuaValue::Integer(v) => *v,
            LuaValue::Number(v) => *v as i64,
            _ => 0,
        }
    }

    fn as_bool(&self) -> bool {
        !matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    fn as_string(&self) -> Option<String> {
        match self {
            LuaValue::Str(s) => Some(s.clone()),
            LuaValue::Integer(v) => Some(v.to_string()),
            LuaValue::Number(v) => Some(crate::adapter::format_number(*v)),
            _ => None,
        }
    }
}

enum NextLoad {
    Success,
    Failure(String),
}

enum NextPcall {
    Success(Vec<LuaValue>),
    Failure(String),
}

struct FakeInner {
    state_present: bool,
    stack: Vec<LuaValue>,
    next_load: NextLoad,
    next_pcall: NextPcall,
    executed: Vec<(Vec<u8>, String)>,
}

impl Default for FakeInner {
    fn default() -> Self {
        Self {
            state_present: true,
            stack: Vec::new(),
            next_load: NextLoad::Success,
            next_pcall: NextPcall::Success(Vec::new()),
            executed: Vec::new(),
        }
    }
}

/// A scripted stand-in for the host's embedded engine. Tests configure what
/// the next `load_buffer`/`pcall`/`GetSpellInfo` call should produce, then
/// drive the adapter against it, with no real memory or process involved.
pub struct FakeScriptHost {
    inner: Mutex<FakeInner>,
}

impl FakeScriptHost {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FakeInner::default()),
        }
    }

    pub fn set_state_absent(&self) {
        self.inner.lock().state_present = false;
    }

    pub fn queue_load_failure(&self, message: &str) {
        self.inner.lock().next_load = NextLoad::Failure(message.to_string());
    }

    pub fn queue_pcall_success(&self, results: Vec<LuaValue>) {
        self.inner.lock().next_pcall = NextPcall::Success(results);
    }

    pub fn queue_pcall_failure(&self, message: &str) {
        self.inner.lock().next_pcall = NextPcall::Failure(message.to_string());
    }

    /// Pre-populates the fixed indices `get_spell_info` reads (offset 2
    /// through 10), as if the native function had just run.
    #[allow(clippy::too_many_arguments)]
    pub fn set_spell_info(
        &self,
        name: &str,
        rank: &str,
        icon: &str,
        cost: f64,
        power_type: i64,
        cast_time_ms: f64,
        min_range: f64,
        max_range: Option<f64>,
    ) {
        let mut guard = self.inner.lock();
        guard.stack.clear();
        guard.stack.push(LuaValue::Integer(0)); // index 1: the pushed spell id argument
        guard.stack.push(LuaValue::Str(name.to_string())); // 2
        guard.stack.push(LuaValue::Str(rank.to_string())); // 3
        guard.stack.push(LuaValue::Str(icon.to_string())); // 4
        guard.stack.push(LuaValue::Number(cost)); // 5
        guard.stack.push(LuaValue::Nil); // 6: reserved/unused
        guard.stack.push(LuaValue::Integer(power_type)); // 7
        guard.stack.push(LuaValue::Number(cast_time_ms)); // 8
        guard.stack.push(LuaValue::Number(min_range)); // 9
        if let Some(max_range) = max_range {
            guard.stack.push(LuaValue::Number(max_range)); // 10
        }
    }

    pub fn push_marker_value(&self) {
        self.inner.lock().stack.push(LuaValue::Str("marker".to_string()));
    }

    pub fn stack_len(&self) -> i32 {
        self.inner.lock().stack.len() as i32
    }

    pub fn executed_scripts(&self) -> Vec<(Vec<u8>, String)> {
        self.inner.lock().executed.clone()
    }

    /// Resolves a 1-based or Lua-style negative (from-top) stack index
    /// against the current stack, mirroring the real engine's indexing
    /// convention (`-1` is the top of the stack).
    fn slot(inner: &FakeInner, index: i32) -> Option<LuaValue> {
        let len = inner.stack.len() as i32;
        let absolute = if index < 0 { len + index + 1 } else { index };
        if absolute < 1 || absolute > len {
            return None;
        }
        inner.stack.get(absolute as usize - 1).cloned()
    }
}

impl Default for FakeScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost for FakeScriptHost {
    fn state_pointer(&self) -> Option<LuaState> {
        if self.inner.lock().state_present {
            Some(LuaState(0xDEAD_BEEF))
        } else {
            None
        }
    }

    fn get_top(&self, _state: LuaState) -> i32 {
        self.inner.lock().stack.len() as i32
    }

    fn set_top(&self, _state: LuaState, index: i32) {
        let mut guard = self.inner.lock();
        let index = index.max(0) as usize;
        if index <= guard.stack.len() {
            guard.stack.truncate(index);
        } else {
            guard.stack.resize(index, LuaValue::Nil);
        }
    }

    fn push_integer(&self, _state: LuaState, value: i64) {
        self.inner.lock().stack.push(LuaValue::Integer(value));
    }

    fn push_string(&self, _state: LuaState, value: &str) {
        self.inner.lock().stack.push(LuaValue::Str(value.to_string()));
    }

    fn push_nil(&self, _state: LuaState) {
        self.inner.lock().stack.push(LuaValue::Nil);
    }

    fn lua_type_of(&self, _state: LuaState, index: i32) -> LuaType {
        let guard = self.inner.lock();
        Self::slot(&guard, index).map(|v| v.type_tag()).unwrap_or(LuaType::Nil)
    }

    fn to_number(&self, _state: LuaState, index: i32) -> f64 {
        let guard = self.inner.lock();
        Self::slot(&guard, index).map(|v| v.as_f64()).unwrap_or(0.0)
    }

    fn to_integer(&self, _state: LuaState, index: i32) -> i64 {
        let guard = self.inner.lock();
        Self::slot(&guard, index).map(|v| v.as_i64()).unwrap_or(0)
    }

    fn to_boolean(&self, _state: LuaState, index: i32) -> bool {
        let guard = self.inner.lock();
        Self::slot(&guard, index).map(|v| v.as_bool()).unwrap_or(false)
    }

    fn to_lstring(&self, _state: LuaState, index: i32) -> Option<String> {
        let guard = self.inner.lock();
        Self::slot(&guard, index).and_then(|v| v.as_string())
    }

    fn load_buffer(&self, _state: LuaState, _code: &[u8], _chunk_name: &str) -> i32 {
        let mut guard = self.inner.lock();
        match std::mem::replace(&mut guard.next_load, NextLoad::Success) {
            NextLoad::Success => {
                // A real load leaves the compiled chunk as one value on the
                // stack, ready for the args + pcall that follow.
                guard.stack.push(LuaValue::Str("<function>".to_string()));
                0
            }
            NextLoad::Failure(msg) => {
                guard.stack.push(LuaValue::Str(msg));
                1
            }
        }
    }

    fn pcall(&self, _state: LuaState, nargs: i32, _nresults: i32) -> i32 {
        let mut guard = self.inner.lock();
        let consumed = nargs as usize + 1; // the function plus its arguments
        let new_len = guard.stack.len().saturating_sub(consumed);
        guard.stack.truncate(new_len);
        match std::mem::replace(&mut guard.next_pcall, NextPcall::Success(Vec::new())) {
            NextPcall::Success(results) => {
                guard.stack.extend(results);
                0
            }
            NextPcall::Failure(msg) => {
                guard.stack.push(LuaValue::Str(msg));
                1
            }
        }
    }

    fn script_execute(&self, code: &[u8], source_name: &str) {
        self.inner.lock().executed.push((code.to_vec(), source_name.to_string()));
    }

    fn call_native_spell_info(&self, _state: LuaState) -> i32 {
        // `set_spell_info` pre-populates the fixed indices directly; the
        // call itself is a no-op against the scripted stack.
        self.inner.lock().stack.len() as i32
    }
}
