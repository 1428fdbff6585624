/// Raw host-memory and native-function access for the three commands that
/// bypass the scripting stack entirely: target GUID, combo points, and the
/// behind-target positional check, plus the direct `CastLocalPlayerSpell`
/// call. Kept separate from `wowbridge_scripting::ScriptHost` because none
/// of these touch the Lua state.
pub trait HostMemory: Send + Sync {
    fn read_u8(&self, addr: usize) -> u8;
    fn read_u64(&self, addr: usize) -> u64;
    fn read_usize(&self, addr: usize) -> usize;

    /// `find-object-by-guid-and-flags(guid, flags)`; `0` means not found.
    fn find_object_by_guid(&self, guid: u64, flags: i32) -> usize;

    /// `unit-vector-difference-within-hemisphere(observer, observed)`: is
    /// `observed` within `observer`'s forward hemisphere?
    fn in_front(&self, observer: usize, observed: usize) -> bool;

    /// `CastLocalPlayerSpell(spell_id, 0, target_guid, 0)`; returns the raw
    /// result byte verbatim.
    fn cast_local_player_spell(&self, spell_id: i32, target_guid: u64) -> u8;
}
