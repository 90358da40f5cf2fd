//! Tests for the command exchange
//!
//! These tests verify:
//! - Reassembly of fragmented responses via the sentinel packet
//! - Foreign ids are skipped
//! - Unexpected packet types and read failures keep partial output
//! - Shared sessions serialize concurrent exchanges

#[path = "../common/mod.rs"]
mod common;

use std::thread;

use common::{
    response, scripted_session, serve_rcon, spawn_server, split_frames, Exhausted, ScriptedStream,
};
use sandstorm_rcon::exchange::{ExchangeState, PendingExchange, Step};
use sandstorm_rcon::protocol::{Packet, RequestType};
use sandstorm_rcon::RconError;

// =============================================================================
// State Machine Tests
// =============================================================================

#[test]
fn test_pending_exchange_transitions() {
    let mut pending = PendingExchange::new(4);
    assert_eq!(pending.state(), ExchangeState::AwaitingFirstFragment);

    assert_eq!(pending.accept(response(4, "part one ")).unwrap(), Step::SendSentinel);
    pending.sentinel_sent();
    assert_eq!(pending.state(), ExchangeState::AwaitingTermination);

    assert_eq!(pending.accept(response(4, "part two")).unwrap(), Step::Continue);
    assert_eq!(pending.accept(response(4, "")).unwrap(), Step::Finished);
    assert_eq!(pending.state(), ExchangeState::Done);

    assert_eq!(pending.into_text(), "part one part two");
}

#[test]
fn test_empty_first_fragment_does_not_finish() {
    let mut pending = PendingExchange::new(1);

    assert_eq!(pending.accept(response(1, "")).unwrap(), Step::SendSentinel);
    pending.sentinel_sent();
    assert_eq!(pending.state(), ExchangeState::AwaitingTermination);
}

#[test]
fn test_foreign_id_is_skipped() {
    let mut pending = PendingExchange::new(2);

    assert_eq!(pending.accept(response(1, "stale")).unwrap(), Step::Continue);
    assert_eq!(pending.state(), ExchangeState::AwaitingFirstFragment);
    assert_eq!(pending.text(), "");
}

#[test]
fn test_correlated_wrong_type_is_error() {
    let mut pending = PendingExchange::new(2);

    assert!(matches!(
        pending.accept(Packet::new(2, 2, "")),
        Err(RconError::UnexpectedPacketType { id: 2, packet_type: 2 })
    ));
}

#[test]
fn test_sentinel_sent_only_moves_forward() {
    let mut pending = PendingExchange::new(1);
    pending.accept(response(1, "x")).unwrap();
    pending.sentinel_sent();
    pending.accept(response(1, "")).unwrap();

    pending.sentinel_sent();
    assert_eq!(pending.state(), ExchangeState::Done);
}

// =============================================================================
// Scripted Exchange Tests
// =============================================================================

#[test]
fn test_fragmented_response_reassembled() {
    let stream = ScriptedStream::replying(&[
        response(1, "Hello, "),
        response(1, "world"),
        response(1, ""),
        // Echo of the sentinel
        response(1, ""),
    ]);
    let (mut session, written) = scripted_session(stream);

    assert_eq!(session.execute("say hi").unwrap(), "Hello, world");

    let sent = split_frames(&written.lock());
    assert_eq!(
        sent,
        vec![
            Packet::request(1, RequestType::ExecCommand, "say hi"),
            Packet::sentinel(1),
        ]
    );
}

#[test]
fn test_single_fragment_response() {
    let stream = ScriptedStream::replying(&[response(1, "ID: 1 | Name: sam"), response(1, "")]);
    let (mut session, _) = scripted_session(stream);

    assert_eq!(session.execute("listplayers").unwrap(), "ID: 1 | Name: sam");
}

#[test]
fn test_empty_response() {
    let stream = ScriptedStream::replying(&[response(1, ""), response(1, "")]);
    let (mut session, written) = scripted_session(stream);

    assert_eq!(session.execute("restartround").unwrap(), "");
    assert_eq!(split_frames(&written.lock()).len(), 2);
}

#[test]
fn test_foreign_id_interleaved() {
    let stream = ScriptedStream::replying(&[
        response(1, "Hello, "),
        response(77, "someone else's output"),
        response(1, "world"),
        response(1, ""),
    ]);
    let (mut session, _) = scripted_session(stream);

    assert_eq!(session.execute("say hi").unwrap(), "Hello, world");
}

#[test]
fn test_sentinel_sent_once() {
    let stream = ScriptedStream::replying(&[
        response(1, "a"),
        response(1, "b"),
        response(1, "c"),
        response(1, ""),
    ]);
    let (mut session, written) = scripted_session(stream);

    assert_eq!(session.execute("maps").unwrap(), "abc");

    let sentinels = split_frames(&written.lock())
        .into_iter()
        .filter(|p| *p == Packet::sentinel(1))
        .count();
    assert_eq!(sentinels, 1);
}

#[test]
fn test_multibyte_char_split_across_fragments() {
    let text = "Zoë";
    let bytes = text.as_bytes();
    let split = bytes.len() - 1; // inside the two-byte 'ë'

    let stream = ScriptedStream::replying(&[
        Packet::new(1, 0, &bytes[..split]),
        Packet::new(1, 0, &bytes[split..]),
        response(1, ""),
    ]);
    let (mut session, _) = scripted_session(stream);

    assert_eq!(session.execute("listplayers").unwrap(), text);
}

#[test]
fn test_unexpected_type_keeps_partial() {
    let stream = ScriptedStream::replying(&[response(1, "partial "), Packet::new(1, 2, "")]);
    let (mut session, _) = scripted_session(stream);

    let err = session.execute("maps").unwrap_err();
    assert_eq!(err.partial_output(), Some("partial "));
    match err {
        RconError::Interrupted { source, .. } => assert!(matches!(
            *source,
            RconError::UnexpectedPacketType { id: 1, packet_type: 2 }
        )),
        other => panic!("Expected Interrupted, got {other:?}"),
    }
}

#[test]
fn test_timeout_keeps_partial() {
    // Server stops answering after the first fragment
    let stream = ScriptedStream::replying(&[response(1, "Hello")]);
    let (mut session, _) = scripted_session(stream);

    let err = session.execute("listbans").unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.partial_output(), Some("Hello"));
}

#[test]
fn test_timeout_with_nothing_received() {
    let (mut session, _) = scripted_session(ScriptedStream::replying(&[]));

    let err = session.execute("listbans").unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.partial_output(), Some(""));
}

#[test]
fn test_truncation_keeps_partial() {
    let mut input = common::frames(&[response(1, "kept")]);
    input.extend_from_slice(&sandstorm_rcon::protocol::encode(1, 0, b"lost")[..6]);
    let (mut session, _) = scripted_session(ScriptedStream::new(input, Exhausted::Eof));

    let err = session.execute("scenarios").unwrap_err();
    assert_eq!(err.partial_output(), Some("kept"));
    match err {
        RconError::Interrupted { source, .. } => {
            assert!(matches!(*source, RconError::Truncated { .. }))
        }
        other => panic!("Expected Interrupted, got {other:?}"),
    }
}

#[test]
fn test_each_command_gets_fresh_id() {
    let stream = ScriptedStream::replying(&[
        response(1, "one"),
        response(1, ""),
        response(2, "two"),
        response(2, ""),
    ]);
    let (mut session, written) = scripted_session(stream);

    assert_eq!(session.execute("first").unwrap(), "one");
    assert_eq!(session.execute("second").unwrap(), "two");

    let ids: Vec<i32> = split_frames(&written.lock()).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 1, 2, 2]);
}

// =============================================================================
// TCP Exchange Tests
// =============================================================================

#[test]
fn test_exchange_over_tcp() {
    let (addr, server) = spawn_server(|transport| {
        serve_rcon(transport, "secret", |command| match command {
            "say hi" => vec!["Hello, ".to_string(), "world".to_string(), String::new()],
            "listplayers" => vec!["ID | Name\n".to_string(), "1 | sam\n".to_string()],
            _ => Vec::new(),
        })
    });

    let mut session = common::connect(addr, 2000);
    assert!(session.authenticate("secret"));

    assert_eq!(session.execute("say hi").unwrap(), "Hello, world");
    // The echo of the previous sentinel is still in flight and must be skipped
    assert_eq!(session.execute("listplayers").unwrap(), "ID | Name\n1 | sam\n");
    assert_eq!(session.execute("restartround").unwrap(), "");

    drop(session);
    server.join().unwrap();
}

#[test]
fn test_shared_session_serializes_exchanges() {
    let (addr, server) = spawn_server(|transport| {
        serve_rcon(transport, "secret", |command| {
            vec![format!("{command}:a "), format!("{command}:b "), format!("{command}:c")]
        })
    });

    let shared = common::connect(addr, 2000).into_shared();
    assert!(shared.lock().authenticate("secret"));

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let shared = shared.clone();
            thread::spawn(move || {
                for n in 0..10 {
                    let command = format!("w{worker}-{n}");
                    let output = shared.execute(&command).unwrap();
                    assert_eq!(output, format!("{command}:a {command}:b {command}:c"));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(shared.peer(), addr.to_string());
    drop(shared);
    server.join().unwrap();
}
