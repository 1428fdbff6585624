use wowbridge_offsets::OffsetsTable;

use crate::error::HookError;
use crate::memory::HookMemory;

/// The present function's vtable slot address and what currently sits there
/// (the host's original function), resolved by walking the anchor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub slot_addr: usize,
    pub original_fn: usize,
}

/// Walks `present_function_anchor` through its two pointer indirections down
/// to the device object, reads its vtable, then the present slot inside that
/// vtable. Pure function of memory + offsets so the four null-checks the
/// install path needs can be exercised without a live host.
pub fn resolve_present_slot(
    mem: &dyn HookMemory,
    offsets: &OffsetsTable,
) -> Result<ResolvedSlot, HookError> {
    let anchor = mem.read_usize(offsets.present_function_anchor);
    if anchor == 0 {
        return Err(HookError::NullAnchor);
    }

    let indirected = mem.read_usize(anchor + offsets.present_anchor_indirection_1);
    let device = if indirected == 0 {
        0
    } else {
        mem.read_usize(indirected + offsets.present_anchor_indirection_2)
    };
    if device == 0 {
        return Err(HookError::NullDevice);
    }

    let vtable = mem.read_usize(device);
    if vtable == 0 {
        return Err(HookError::NullVtable);
    }

    let slot_addr = vtable + offsets.present_vtable_slot;
    let original_fn = mem.read_usize(slot_addr);
    if original_fn == 0 {
        return Err(HookError::NullSlot);
    }

    Ok(ResolvedSlot {
        slot_addr,
        original_fn,
    })
}
