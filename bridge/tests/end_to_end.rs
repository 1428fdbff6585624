//! Cross-crate integration: wires the protocol parser, the two queues, the
//! dispatcher, the frame hook, and the IPC session state machine together
//! with fakes standing in for the host's script engine, raw memory, and
//! named pipe. Exercises P1 (ordering), P3 (tag prefix on every response),
//! and P10 (reconnect) without a live host process.

use std::thread;
use std::time::Duration;

use wowbridge_dispatcher::{fake_memory::FakeHostMemory, Dispatcher};
use wowbridge_hook::FrameHook;
use wowbridge_ipc::{fake_pipe::FakeConnection, run_session, PollConfig};
use wowbridge_offsets::OffsetsTable;
use wowbridge_queue::{RequestQueue, ResponseQueue, ShutdownFlag};
use wowbridge_scripting::{fake::FakeScriptHost, ScriptingAdapter};

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

/// Builds the render-thread side (dispatcher + frame hook over fakes) and a
/// background thread that stands in for the host calling the present hook
/// once per frame, pumping the queues the same way `hooked_present` would.
fn spawn_fake_render_thread(
    requests: &'static RequestQueue,
    responses: &'static ResponseQueue,
    shutdown: &'static ShutdownFlag,
) -> thread::JoinHandle<()> {
    let host = FakeScriptHost::new();
    let adapter = ScriptingAdapter::new(host);
    let memory = FakeHostMemory::new();
    memory.set_cell(test_offsets().current_target_guid_anchor, 0xABCDEF);
    let dispatcher = Dispatcher::new(adapter, memory, test_offsets());
    let hook = FrameHook::new(dispatcher, requests, responses, shutdown, 0);

    thread::spawn(move || {
        while !shutdown.is_signaled() {
            hook.pump();
            thread::sleep(Duration::from_millis(2));
        }
    })
}

#[test]
fn commands_on_one_connection_are_answered_in_submission_order() {
    let requests: &'static RequestQueue = Box::leak(Box::new(RequestQueue::new(16)));
    let responses: &'static ResponseQueue = Box::leak(Box::new(ResponseQueue::new()));
    let shutdown: &'static ShutdownFlag = Box::leak(Box::new(ShutdownFlag::new()));

    let render_thread = spawn_fake_render_thread(requests, responses, shutdown);

    let mut conn = FakeConnection::new(vec![
        b"ping".to_vec(),
        b"GET_TARGET_GUID".to_vec(),
        b"GET_COMBO_POINTS".to_vec(),
        b"NOT_A_REAL_COMMAND".to_vec(),
        b"CAST_SPELL:17,42".to_vec(),
    ]);

    run_session(&mut conn, requests, responses, &PollConfig::default());

    shutdown.signal();
    render_thread.join().unwrap();

    assert_eq!(
        conn.written,
        vec![
            b"PONG".to_vec(),
            b"TARGET_GUID:11259375".to_vec(),
            b"CP:0".to_vec(),
            b"ERROR:Unknown request".to_vec(),
            b"CAST_RESULT:17,0".to_vec(),
        ]
    );

    // Every response the session wrote back carries a recognized tag.
    let known_prefixes = ["PONG", "TARGET_GUID:", "CP:", "ERROR:", "CAST_RESULT:"];
    for written in &conn.written {
        let text = std::str::from_utf8(written).unwrap();
        assert!(
            known_prefixes.iter().any(|p| text.starts_with(p)),
            "response {text:?} did not start with a known tag"
        );
        assert!(!text.is_empty());
    }
}

#[test]
fn a_fresh_connection_after_disconnect_is_served_without_reloading_the_bridge() {
    let requests: &'static RequestQueue = Box::leak(Box::new(RequestQueue::new(16)));
    let responses: &'static ResponseQueue = Box::leak(Box::new(ResponseQueue::new()));
    let shutdown: &'static ShutdownFlag = Box::leak(Box::new(ShutdownFlag::new()));

    let render_thread = spawn_fake_render_thread(requests, responses, shutdown);

    let mut first = FakeConnection::new(vec![b"ping".to_vec()]);
    run_session(&mut first, requests, responses, &PollConfig::default());
    assert_eq!(first.written, vec![b"PONG".to_vec()]);

    // Same queues, same dispatcher/frame-hook thread: a brand new connection
    // (as after a client disconnect) is served with no extra setup.
    let mut second = FakeConnection::new(vec![b"GET_TARGET_GUID".to_vec()]);
    run_session(&mut second, requests, responses, &PollConfig::default());
    assert_eq!(second.written, vec![b"TARGET_GUID:11259375".to_vec()]);

    shutdown.signal();
    render_thread.join().unwrap();
}
