use crate::raw::{parse_address, RawOffsets};
use crate::OffsetsError;

/// Immutable, process-lifetime map from symbolic name to absolute address in
/// the host process.
///
/// Nothing here is checked against the running host: the constructor only
/// verifies that every required key is present in the source file and that
/// every value parses as an address. Whether `script_execute` really points
/// at the host's script-execute entry point is the offsets file's contract,
/// not something this table can verify (see `crate` docs).
#[derive(Debug, Clone, Copy)]
pub struct OffsetsTable {
    pub script_execute: usize,
    pub pcall: usize,
    pub load_buffer: usize,
    pub get_top: usize,
    pub set_top: usize,
    pub to_number: usize,
    pub to_integer: usize,
    pub to_boolean: usize,
    pub to_lstring: usize,
    pub is_number: usize,
    pub is_string: usize,
    pub lua_type: usize,
    pub push_integer: usize,
    pub push_string: usize,
    pub push_nil: usize,
    pub get_field: usize,
    pub state_pointer_anchor: usize,
    pub native_spell_info: usize,
    pub native_cast_spell: usize,
    pub find_object_by_guid: usize,
    pub in_front_check: usize,
    pub client_connection_anchor: usize,
    pub object_manager_offset: usize,
    pub local_guid_offset: usize,
    pub combo_points_anchor: usize,
    pub current_target_guid_anchor: usize,
    pub present_function_anchor: usize,
    pub present_anchor_indirection_1: usize,
    pub present_anchor_indirection_2: usize,
    pub present_vtable_slot: usize,
}

impl OffsetsTable {
    pub fn from_raw(raw: RawOffsets) -> Result<Self, OffsetsError> {
        Ok(Self {
            script_execute: parse_address("script_execute", &raw.script_execute)?,
            pcall: parse_address("pcall", &raw.pcall)?,
            load_buffer: parse_address("load_buffer", &raw.load_buffer)?,
            get_top: parse_address("get_top", &raw.get_top)?,
            set_top: parse_address("set_top", &raw.set_top)?,
            to_number: parse_address("to_number", &raw.to_number)?,
            to_integer: parse_address("to_integer", &raw.to_integer)?,
            to_boolean: parse_address("to_boolean", &raw.to_boolean)?,
            to_lstring: parse_address("to_lstring", &raw.to_lstring)?,
            is_number: parse_address("is_number", &raw.is_number)?,
            is_string: parse_address("is_string", &raw.is_string)?,
            lua_type: parse_address("lua_type", &raw.lua_type)?,
            push_integer: parse_address("push_integer", &raw.push_integer)?,
            push_string: parse_address("push_string", &raw.push_string)?,
            push_nil: parse_address("push_nil", &raw.push_nil)?,
            get_field: parse_address("get_field", &raw.get_field)?,
            state_pointer_anchor: parse_address("state_pointer_anchor", &raw.state_pointer_anchor)?,
            native_spell_info: parse_address("native_spell_info", &raw.native_spell_info)?,
            native_cast_spell: parse_address("native_cast_spell", &raw.native_cast_spell)?,
            find_object_by_guid: parse_address("find_object_by_guid", &raw.find_object_by_guid)?,
            in_front_check: parse_address("in_front_check", &raw.in_front_check)?,
            client_connection_anchor: parse_address(
                "client_connection_anchor",
                &raw.client_connection_anchor,
            )?,
            object_manager_offset: parse_address(
                "object_manager_offset",
                &raw.object_manager_offset,
            )?,
            local_guid_offset: parse_address("local_guid_offset", &raw.local_guid_offset)?,
            combo_points_anchor: parse_address("combo_points_anchor", &raw.combo_points_anchor)?,
            current_target_guid_anchor: parse_address(
                "current_target_guid_anchor",
                &raw.current_target_guid_anchor,
            )?,
            present_function_anchor: parse_address(
                "present_function_anchor",
                &raw.present_function_anchor,
            )?,
            present_anchor_indirection_1: parse_address(
                "present_anchor_indirection_1",
                &raw.present_anchor_indirection_1,
            )?,
            present_anchor_indirection_2: parse_address(
                "present_anchor_indirection_2",
                &raw.present_anchor_indirection_2,
            )?,
            present_vtable_slot: parse_address("present_vtable_slot", &raw.present_vtable_slot)?,
        })
    }

    /// Casts a stored address to a callable function pointer.
    ///
    /// # Safety
    /// The caller asserts that `F` matches the calling convention and
    /// signature of the host function actually living at `addr`. This is the
    /// one escape hatch in the whole table; every other accessor returns a
    /// plain `usize`.
    pub unsafe fn as_fn<F: Copy>(&self, addr: usize) -> F {
        debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<usize>());
        std::mem::transmute_copy::<usize, F>(&addr)
    }
}
