use std::panic::{self, AssertUnwindSafe};

use wowbridge_offsets::OffsetsTable;
use wowbridge_protocol::{Request, FIELD_DELIMITER, SPELLINFO_DELIMITER};
use wowbridge_scripting::{LuaArg, LuaResult, ScriptHost, ScriptingAdapter};

use crate::memory::HostMemory;

/// Combo-point byte readings above this are pointer-staleness noise, not
/// real combo point counts; clamp rather than trust them.
const MAX_PLAUSIBLE_COMBO_POINTS: u8 = 5;

/// Turns a parsed `Request` into the exact response string the wire
/// protocol expects. One instance per process, owned by the frame hook and
/// called once per drained request, always on the render thread.
pub struct Dispatcher<H: ScriptHost, M: HostMemory> {
    adapter: ScriptingAdapter<H>,
    memory: M,
    offsets: &'static OffsetsTable,
}

impl<H: ScriptHost, M: HostMemory> Dispatcher<H, M> {
    pub fn new(adapter: ScriptingAdapter<H>, memory: M, offsets: &'static OffsetsTable) -> Self {
        Self { adapter, memory, offsets }
    }

    /// Never panics past this call: any panic raised while handling the
    /// request is caught here as the dispatcher's own crash boundary, on
    /// top of whatever narrower boundary the scripting adapter already
    /// applied internally.
    pub fn dispatch(&self, request: Request) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch_inner(request))) {
            Ok(response) => response,
            Err(_) => {
                log::error!("dispatch panicked; returning generic error");
                "ERROR:dispatch panicked".to_string()
            }
        }
    }

    fn dispatch_inner(&self, request: Request) -> String {
        match request {
            Request::Ping => "PONG".to_string(),
            Request::ExecScript { code } => self.adapter.pcall_execute(&code),
            Request::GetTimeMs => self.handle_get_time_ms(),
            Request::GetCooldown { spell_id } => self.handle_get_cooldown(spell_id),
            Request::IsInRange { spell_id, unit_id } => self.handle_is_in_range(spell_id, &unit_id),
            Request::GetSpellInfo { spell_id } => self.handle_get_spell_info(spell_id),
            Request::CastSpell { spell_id, target_guid } => self.handle_cast_spell(spell_id, target_guid),
            Request::GetTargetGuid => self.handle_get_target_guid(),
            Request::GetComboPoints => self.handle_get_combo_points(),
            Request::IsBehindTarget { target_guid } => self.handle_is_behind_target(target_guid),
            Request::Unknown { raw } => {
                log::debug!("unrecognized request: {raw:?}");
                "ERROR:Unknown request".to_string()
            }
        }
    }

    fn handle_get_time_ms(&self) -> String {
        if !self.adapter.is_available() {
            return "ERROR:state null".to_string();
        }
        match self.adapter.pcall_eval(b"return GetTime()", &[]) {
            Ok(results) => match results.as_slice() {
                [LuaResult::Number(seconds)] => format!("TIME:{}", (seconds * 1000.0).round() as i64),
                _ => "ERROR:GetTime result type invalid".to_string(),
            },
            Err(e) => format!("ERROR:{e}"),
        }
    }

    fn handle_get_cooldown(&self, spell_id: i32) -> String {
        if !self.adapter.is_available() {
            return "CD_ERR:state null".to_string();
        }
        let code = b"local id = ...\nreturn GetSpellCooldown(id)";
        match self.adapter.pcall_eval(code, &[LuaArg::Integer(spell_id as i64)]) {
            Ok(results) => match results.as_slice() {
                [LuaResult::Number(start), LuaResult::Number(duration), LuaResult::Number(enabled)] => format!(
                    "CD:{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
                    (start * 1000.0).round() as i64,
                    (duration * 1000.0).round() as i64,
                    enabled.round() as i64
                ),
                _ => "ERROR:GetSpellCooldown result types invalid".to_string(),
            },
            Err(e) => format!("CD_ERR:{e}"),
        }
    }

    fn handle_is_in_range(&self, spell_id: i32, unit_id: &str) -> String {
        if !self.adapter.is_available() {
            return "RANGE_ERR:state null".to_string();
        }
        let info = self.adapter.get_spell_info(spell_id);
        if info.name == wowbridge_scripting::SENTINEL_STRING {
            return "RANGE_ERR:GetSpellInfo failed".to_string();
        }
        let code = b"local name, unit = ...\nreturn IsSpellInRange(name, unit)";
        let args = [LuaArg::Str(info.name), LuaArg::Str(unit_id.to_string())];
        match self.adapter.pcall_eval(code, &args) {
            Ok(results) => {
                let value = match results.as_slice() {
                    [LuaResult::Number(n)] => *n as i64,
                    [LuaResult::Boolean(b)] => *b as i64,
                    [LuaResult::Nil] | [] => 0,
                    _ => -1,
                };
                format!("IN_RANGE:{value}")
            }
            Err(e) => format!("RANGE_ERR:{e}"),
        }
    }

    fn handle_get_spell_info(&self, spell_id: i32) -> String {
        if !self.adapter.is_available() {
            return "SPELLINFO_ERR:state null".to_string();
        }
        let info = self.adapter.get_spell_info(spell_id);
        format!(
            "SPELLINFO:{}{SPELLINFO_DELIMITER}{}{SPELLINFO_DELIMITER}{}{SPELLINFO_DELIMITER}{:.1}{SPELLINFO_DELIMITER}{:.1}{SPELLINFO_DELIMITER}{}{SPELLINFO_DELIMITER}{}{SPELLINFO_DELIMITER}{}",
            info.name,
            info.rank,
            info.cast_time_ms.round() as i64,
            info.min_range,
            info.max_range.unwrap_or(wowbridge_scripting::SENTINEL_NUMBER),
            info.icon,
            info.cost.round() as i64,
            info.power_type,
        )
    }

    fn handle_cast_spell(&self, spell_id: i32, target_guid: u64) -> String {
        if self.offsets.native_cast_spell == 0 {
            return "CAST_RESULT:ERROR:func null".to_string();
        }
        let raw_result = self.memory.cast_local_player_spell(spell_id, target_guid);
        format!("CAST_RESULT:{spell_id}{FIELD_DELIMITER}{raw_result}")
    }

    fn handle_get_target_guid(&self) -> String {
        let guid = self.memory.read_u64(self.offsets.current_target_guid_anchor);
        format!("TARGET_GUID:{guid}")
    }

    /// `catch_unwind` only catches Rust panics, not the SEH access violation
    /// a genuinely bad `addr` would raise on Windows (the original used
    /// `__try`/`__except` for that). The `CP:-99` arm below is reachable for
    /// a panicking `read_u8` implementation, not for a real wild read; there
    /// is no safe-Rust equivalent of catching hardware memory faults.
    fn handle_get_combo_points(&self) -> String {
        let memory = &self.memory;
        let addr = self.offsets.combo_points_anchor;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| memory.read_u8(addr)));
        match outcome {
            Ok(raw) if raw > MAX_PLAUSIBLE_COMBO_POINTS => {
                log::warn!("combo point byte {raw} > {MAX_PLAUSIBLE_COMBO_POINTS}, clamping to 0");
                "CP:0".to_string()
            }
            Ok(raw) => format!("CP:{raw}"),
            Err(_) => "CP:-99".to_string(),
        }
    }

    fn handle_is_behind_target(&self, target_guid: u64) -> String {
        let memory = &self.memory;
        let offsets = self.offsets;

        let client_connection = memory.read_usize(offsets.client_connection_anchor);
        if client_connection == 0 {
            return "[ERROR:CC null]".to_string();
        }
        let object_manager = memory.read_usize(client_connection + offsets.object_manager_offset);
        if object_manager == 0 {
            return "[ERROR:OM null]".to_string();
        }
        let player_guid = memory.read_u64(object_manager + offsets.local_guid_offset);
        if player_guid == 0 {
            return "[ERROR:PlayerGUID 0]".to_string();
        }
        let player_obj = memory.find_object_by_guid(player_guid, 1);
        if player_obj == 0 {
            return "[ERROR:PlayerLookup fail]".to_string();
        }
        let target_obj = memory.find_object_by_guid(target_guid, 1);
        if target_obj == 0 {
            return "[ERROR:TargetLookup fail]".to_string();
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let target_thinks_player_in_front = memory.in_front(target_obj, player_obj);
            let player_thinks_target_in_front = memory.in_front(player_obj, target_obj);
            !target_thinks_player_in_front && player_thinks_target_in_front
        }));
        match outcome {
            Ok(is_behind) => format!("[IS_BEHIND_TARGET_OK:{}]", is_behind as u8),
            Err(_) => "[ERROR:AV checking position]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_memory::FakeHostMemory;
    use wowbridge_scripting::fake::{FakeScriptHost, LuaValue};

    fn test_offsets() -> &'static OffsetsTable {
        Box::leak(Box::new(OffsetsTable {
            script_execute: 0x10,
            pcall: 0x11,
            load_buffer: 0x12,
            get_top: 0x13,
            set_top: 0x14,
            to_number: 0x15,
            to_integer: 0x16,
            to_boolean: 0x17,
            to_lstring: 0x18,
            is_number: 0x19,
            is_string: 0x1A,
            lua_type: 0x1B,
            push_integer: 0x1C,
            push_string: 0x1D,
            push_nil: 0x1E,
            get_field: 0x1F,
            state_pointer_anchor: 0x20,
            native_spell_info: 0x21,
            native_cast_spell: 0x22,
            find_object_by_guid: 0x23,
            in_front_check: 0x24,
            client_connection_anchor: 0x1000,
            object_manager_offset: 0x74,
            local_guid_offset: 0xC0,
            combo_points_anchor: 0x2000,
            current_target_guid_anchor: 0x3000,
            present_function_anchor: 0x4000,
            present_anchor_indirection_1: 0x4004,
            present_anchor_indirection_2: 0x4008,
            present_vtable_slot: 17,
        }))
    }

    struct Harness {
        dispatcher: Dispatcher<FakeScriptHost, FakeHostMemory>,
    }

    fn build() -> Harness {
        let host = FakeScriptHost::new();
        let memory = FakeHostMemory::new();
        let adapter = wowbridge_scripting::ScriptingAdapter::new(host);
        Harness {
            dispatcher: Dispatcher::new(adapter, memory, test_offsets()),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(build().dispatcher.dispatch(Request::Ping), "PONG");
    }

    #[test]
    fn unknown_returns_tagged_error() {
        let response = build().dispatcher.dispatch(Request::Unknown { raw: "garbage".to_string() });
        assert_eq!(response, "ERROR:Unknown request");
    }

    #[test]
    fn get_cooldown_formats_examples_from_spec() {
        // (start, duration, enabled) in seconds -> CD:<ms>,<ms>,<enabled>
        let cases = [
            (vec![LuaValue::Number(0.0), LuaValue::Number(0.0), LuaValue::Number(1.0)], "CD:0,0,1"),
            (vec![LuaValue::Number(1234.567), LuaValue::Number(1.5), LuaValue::Number(0.0)], "CD:1234567,1500,0"),
        ];
        for (values, expected) in cases {
            let host = FakeScriptHost::new();
            host.queue_pcall_success(values);
            let memory = FakeHostMemory::new();
            let adapter = wowbridge_scripting::ScriptingAdapter::new(host);
            let dispatcher = Dispatcher::new(adapter, memory, test_offsets());
            assert_eq!(dispatcher.dispatch(Request::GetCooldown { spell_id: 133 }), expected);
        }
    }

    #[test]
    fn get_cooldown_rejects_non_numeric_results() {
        let host = FakeScriptHost::new();
        host.queue_pcall_success(vec![LuaValue::Str("a".to_string()), LuaValue::Number(0.0), LuaValue::Number(0.0)]);
        let memory = FakeHostMemory::new();
        let adapter = wowbridge_scripting::ScriptingAdapter::new(host);
        let dispatcher = Dispatcher::new(adapter, memory, test_offsets());
        assert_eq!(
            dispatcher.dispatch(Request::GetCooldown { spell_id: 1 }),
            "ERROR:GetSpellCooldown result types invalid"
        );
    }

    #[test]
    fn combo_points_pass_through_when_plausible() {
        let h = build();
        h.dispatcher.memory.set_cell(h.dispatcher.offsets.combo_points_anchor, 3);
        assert_eq!(h.dispatcher.dispatch(Request::GetComboPoints), "CP:3");
    }

    #[test]
    fn combo_points_above_five_are_clamped_to_zero() {
        let h = build();
        h.dispatcher.memory.set_cell(h.dispatcher.offsets.combo_points_anchor, 7);
        assert_eq!(h.dispatcher.dispatch(Request::GetComboPoints), "CP:0");
    }

    #[test]
    fn target_guid_reads_static_address() {
        let h = build();
        h.dispatcher
            .memory
            .set_cell(h.dispatcher.offsets.current_target_guid_anchor, 0xABCDEF);
        assert_eq!(h.dispatcher.dispatch(Request::GetTargetGuid), "TARGET_GUID:11259375");
    }

    #[test]
    fn cast_spell_passes_exact_args_and_reflects_result_byte() {
        let h = build();
        h.dispatcher.memory.set_cast_result(9);
        let response = h.dispatcher.dispatch(Request::CastSpell { spell_id: 17, target_guid: 42 });
        assert_eq!(response, "CAST_RESULT:17,9");
        assert_eq!(h.dispatcher.memory.cast_calls(), vec![(17, 42)]);
    }

    fn wire_player_and_target(h: &Harness, player_guid: u64, target_guid: u64, player_obj: usize, target_obj: usize) {
        let offsets = h.dispatcher.offsets;
        h.dispatcher.memory.set_cell(offsets.client_connection_anchor, 0x1000);
        h.dispatcher.memory.set_cell(0x1000 + offsets.object_manager_offset, 0x2000);
        h.dispatcher.memory.set_cell(0x2000 + offsets.local_guid_offset, player_guid);
        h.dispatcher.memory.set_object(player_guid, player_obj);
        h.dispatcher.memory.set_object(target_guid, target_obj);
    }

    #[test]
    fn is_behind_target_matrix() {
        let cases = [
            (false, true, 1u8),
            (true, true, 0),
            (false, false, 0),
            (true, false, 0),
        ];
        for (target_thinks_player_in_front, player_thinks_target_in_front, expected) in cases {
            let h = build();
            wire_player_and_target(&h, 100, 200, 0x5000, 0x6000);
            h.dispatcher.memory.queue_in_front(target_thinks_player_in_front);
            h.dispatcher.memory.queue_in_front(player_thinks_target_in_front);
            let response = h.dispatcher.dispatch(Request::IsBehindTarget { target_guid: 200 });
            assert_eq!(response, format!("[IS_BEHIND_TARGET_OK:{expected}]"));
        }
    }

    #[test]
    fn is_behind_target_reports_null_chain_in_order() {
        let h = build();
        assert_eq!(
            h.dispatcher.dispatch(Request::IsBehindTarget { target_guid: 1 }),
            "[ERROR:CC null]"
        );

        let offsets = h.dispatcher.offsets;
        h.dispatcher.memory.set_cell(offsets.client_connection_anchor, 0x1000);
        assert_eq!(
            h.dispatcher.dispatch(Request::IsBehindTarget { target_guid: 1 }),
            "[ERROR:OM null]"
        );

        h.dispatcher.memory.set_cell(0x1000 + offsets.object_manager_offset, 0x2000);
        assert_eq!(
            h.dispatcher.dispatch(Request::IsBehindTarget { target_guid: 1 }),
            "[ERROR:PlayerGUID 0]"
        );

        h.dispatcher.memory.set_cell(0x2000 + offsets.local_guid_offset, 42);
        assert_eq!(
            h.dispatcher.dispatch(Request::IsBehindTarget { target_guid: 1 }),
            "[ERROR:PlayerLookup fail]"
        );

        h.dispatcher.memory.set_object(42, 0x7000);
        assert_eq!(
            h.dispatcher.dispatch(Request::IsBehindTarget { target_guid: 1 }),
            "[ERROR:TargetLookup fail]"
        );
    }

    #[test]
    fn get_spell_info_uses_pipe_delimiter() {
        let h = build();
        // No fixture configured, so every field is the sentinel value.
        let response = h.dispatcher.dispatch(Request::GetSpellInfo { spell_id: 133 });
        assert_eq!(response, "SPELLINFO:N/A|N/A|-1|-1.0|-1.0|N/A|-1|-1");
    }

    #[test]
    fn exec_script_forwards_to_scripting_adapter() {
        let host = FakeScriptHost::new();
        host.queue_pcall_success(vec![LuaValue::Integer(7)]);
        let memory = FakeHostMemory::new();
        let adapter = wowbridge_scripting::ScriptingAdapter::new(host);
        let dispatcher = Dispatcher::new(adapter, memory, test_offsets());
        let response = dispatcher.dispatch(Request::ExecScript { code: b"return 7".to_vec() });
        assert_eq!(response, "LUA_RESULT:7");
    }

    proptest::proptest! {
        #[test]
        fn combo_points_clamp_property(raw in 0u8..=255) {
            let h = build();
            h.dispatcher.memory.set_cell(h.dispatcher.offsets.combo_points_anchor, raw as u64);
            let response = h.dispatcher.dispatch(Request::GetComboPoints);
            if raw > MAX_PLAUSIBLE_COMBO_POINTS {
                proptest::prop_assert_eq!(response, "CP:0".to_string());
            } else {
                proptest::prop_assert_eq!(response, format!("CP:{raw}"));
            }
        }

        #[test]
        fn cooldown_rounding_property(
            start in 0.0f64..100_000.0,
            duration in 0.0f64..100_000.0,
            enabled in 0i32..=1,
        ) {
            let host = FakeScriptHost::new();
            host.queue_pcall_success(vec![
                LuaValue::Number(start),
                LuaValue::Number(duration),
                LuaValue::Number(enabled as f64),
            ]);
            let memory = FakeHostMemory::new();
            let adapter = wowbridge_scripting::ScriptingAdapter::new(host);
            let dispatcher = Dispatcher::new(adapter, memory, test_offsets());
            let response = dispatcher.dispatch(Request::GetCooldown { spell_id: 1 });
            let expected = format!(
                "CD:{},{},{}",
                (start * 1000.0).round() as i64,
                (duration * 1000.0).round() as i64,
                enabled
            );
            proptest::prop_assert_eq!(response, expected);
        }
    }
}
