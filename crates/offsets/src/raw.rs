use serde::Deserialize;

/// The offsets file as it exists on disk: every address is written as a hex
/// or decimal string so the TOML stays readable and diffable across host
/// builds (`0x006F2080`, not a bare `7279232`).
#[derive(Debug, Deserialize)]
pub struct RawOffsets {
    pub script_execute: String,
    pub pcall: String,
    pub load_buffer: String,
    pub get_top: String,
    pub set_top: String,
    pub to_number: String,
    pub to_integer: String,
    pub to_boolean: String,
    pub to_lstring: String,
    pub is_number: String,
    pub is_string: String,
    pub lua_type: String,
    pub push_integer: String,
    pub push_string: String,
    pub push_nil: String,
    pub get_field: String,
    pub state_pointer_anchor: String,
    pub native_spell_info: String,
    pub native_cast_spell: String,
    pub find_object_by_guid: String,
    pub in_front_check: String,
    pub client_connection_anchor: String,
    pub object_manager_offset: String,
    pub local_guid_offset: String,
    pub combo_points_anchor: String,
    pub current_target_guid_anchor: String,
    pub present_function_anchor: String,
    pub present_anchor_indirection_1: String,
    pub present_anchor_indirection_2: String,
    pub present_vtable_slot: String,
}

/// Parses `"0x1234"` or `"1234"` into an address. The host process is
/// 32-bit, so every offset fits in a `u32`; we keep it as `usize` from here
/// on since that's what pointer casts want.
pub fn parse_address(key: &'static str, value: &str) -> Result<usize, crate::OffsetsError> {
    let trimmed = value.trim();
    let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<u32>()
    };
    parsed
        .map(|v| v as usize)
        .map_err(|_| crate::OffsetsError::InvalidAddress {
            key,
            value: value.to_string(),
        })
}
