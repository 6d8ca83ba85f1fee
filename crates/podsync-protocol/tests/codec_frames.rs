// crates/podsync-protocol/tests/codec_frames.rs
use podsync_core::{
    BookingStatus, ClientMessage, CoreError, PodStatus, PodUpdate, RoomId, ServerEvent,
    ServerMessage,
};
use podsync_protocol::json_codec::{decode_client, decode_server, encode_client, encode_server};
use podsync_protocol::text_codec::{format_client, format_server, parse_client_line, parse_server_line};
use podsync_protocol::wire_types::{WireClientEvent, WireServerEvent};
use podsync_protocol::{Codec, ProtocolError};

#[test]
fn json_join_frames_carry_plain_ids() {
    assert_eq!(
        decode_client(r#"{"event":"join-pod","data":"p1"}"#).unwrap(),
        ClientMessage::Join(RoomId::pod("p1").unwrap())
    );
    assert_eq!(
        decode_client(r#"{"event":"leave-booking","data":"b7"}"#).unwrap(),
        ClientMessage::Leave(RoomId::booking("b7").unwrap())
    );
    assert_eq!(
        encode_client(&ClientMessage::Join(RoomId::booking("b1").unwrap())).unwrap(),
        r#"{"event":"join-booking","data":"b1"}"#
    );
}

#[test]
fn json_update_frames_have_id_and_status() {
    let line = encode_server(&ServerEvent::pod("p1", PodStatus::Occupied).into()).unwrap();
    assert_eq!(line, r#"{"event":"pod-update","data":{"id":"p1","status":"OCCUPIED"}}"#);

    let msg = decode_client(
        r#"{"event":"update-booking","data":{"id":"b1","status":"CONFIRMED"}}"#,
    )
    .unwrap();
    match msg {
        ClientMessage::UpdateBooking(u) => {
            assert_eq!(u.booking_id, "b1");
            assert_eq!(u.status, BookingStatus::Confirmed);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn json_control_frames() {
    assert_eq!(decode_client(r#"{"event":"ping"}"#).unwrap(), ClientMessage::Ping);
    assert_eq!(encode_server(&ServerMessage::Pong).unwrap(), r#"{"event":"pong"}"#);

    let rejected = ServerMessage::join_rejected(RoomId::booking("b1").unwrap(), "bookings are private");
    let line = encode_server(&rejected).unwrap();
    assert_eq!(
        line,
        r#"{"event":"join-rejected","data":{"room":"booking:b1","reason":"bookings are private"}}"#
    );
    assert_eq!(decode_server(&line).unwrap(), rejected);

    let joined = encode_server(&ServerMessage::Joined(RoomId::pod("p1").unwrap())).unwrap();
    assert_eq!(joined, r#"{"event":"joined","data":"pod:p1"}"#);
}

#[test]
fn json_rejects_bad_frames() {
    assert!(matches!(
        decode_client(r#"{"event":"join-desk","data":"d1"}"#),
        Err(ProtocolError::Json(_))
    ));
    assert!(matches!(decode_client("not json"), Err(ProtocolError::Json(_))));
    assert!(matches!(decode_client("   "), Err(ProtocolError::EmptyFrame)));
    assert!(matches!(
        decode_client(r#"{"event":"join-pod","data":""}"#),
        Err(ProtocolError::Invalid(CoreError::EmptyResourceId))
    ));
    assert!(matches!(
        decode_client(r#"{"event":"update-pod","data":{"id":"p1","status":"BROKEN"}}"#),
        Err(ProtocolError::Invalid(CoreError::UnknownStatus { .. }))
    ));

    let huge = format!(r#"{{"event":"join-pod","data":"{}"}}"#, "x".repeat(5000));
    assert!(matches!(decode_client(&huge), Err(ProtocolError::FrameTooLong(_))));
}

#[test]
fn json_event_tags_match_wire_names() {
    let p1 = RoomId::pod("p1").unwrap();
    let b1 = RoomId::booking("b1").unwrap();
    let client_msgs = [
        (ClientMessage::Join(p1.clone()), WireClientEvent::JoinPod),
        (ClientMessage::Join(b1.clone()), WireClientEvent::JoinBooking),
        (ClientMessage::Leave(p1.clone()), WireClientEvent::LeavePod),
        (ClientMessage::Leave(b1.clone()), WireClientEvent::LeaveBooking),
        (
            ClientMessage::UpdatePod(PodUpdate {
                pod_id: "p1".into(),
                status: PodStatus::Available,
            }),
            WireClientEvent::UpdatePod,
        ),
        (ClientMessage::Ping, WireClientEvent::Ping),
    ];
    for (msg, name) in client_msgs {
        let value: serde_json::Value = serde_json::from_str(&encode_client(&msg).unwrap()).unwrap();
        assert_eq!(value["event"], name.as_str());
    }

    let server_msgs = [
        (
            ServerMessage::from(ServerEvent::booking("b1", BookingStatus::Active)),
            WireServerEvent::BookingUpdate,
        ),
        (ServerMessage::Left(p1), WireServerEvent::Left),
        (ServerMessage::Error("bad".into()), WireServerEvent::Error),
    ];
    for (msg, name) in server_msgs {
        let value: serde_json::Value = serde_json::from_str(&encode_server(&msg).unwrap()).unwrap();
        assert_eq!(value["event"], name.as_str());
    }
}

#[test]
fn text_commands_parse() {
    assert_eq!(
        parse_client_line("join-pod, p1").unwrap(),
        Some(ClientMessage::Join(RoomId::pod("p1").unwrap()))
    );
    assert_eq!(
        parse_client_line("  leave-booking ,b2  ").unwrap(),
        Some(ClientMessage::Leave(RoomId::booking("b2").unwrap()))
    );
    assert_eq!(parse_client_line("ping").unwrap(), Some(ClientMessage::Ping));
    assert_eq!(parse_client_line("").unwrap(), None);
    assert_eq!(parse_client_line("# comment").unwrap(), None);

    match parse_client_line("update-pod, p1, MAINTENANCE").unwrap() {
        Some(ClientMessage::UpdatePod(u)) => {
            assert_eq!(u.pod_id, "p1");
            assert_eq!(u.status, PodStatus::Maintenance);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn text_commands_reject_malformed_lines() {
    assert!(matches!(
        parse_client_line("subscribe, p1"),
        Err(ProtocolError::UnknownEvent(e)) if e == "subscribe"
    ));
    assert!(matches!(
        parse_client_line("join-pod"),
        Err(ProtocolError::WrongArity { expected: 1, got: 0, .. })
    ));
    assert!(matches!(
        parse_client_line("update-booking, b1"),
        Err(ProtocolError::WrongArity { expected: 2, got: 1, .. })
    ));
    assert!(matches!(
        parse_client_line("join-pod, has space"),
        Err(ProtocolError::Invalid(CoreError::ReservedCharacter(' ')))
    ));
}

#[test]
fn text_output_lines() {
    assert_eq!(
        format_server(&ServerEvent::booking("b1", BookingStatus::Cancelled).into()),
        "booking-update, b1, CANCELLED"
    );
    assert_eq!(
        format_server(&ServerMessage::Joined(RoomId::pod("p1").unwrap())),
        "joined, pod:p1"
    );
    assert_eq!(
        format_server(&ServerMessage::Error("line one\nline two".into())),
        "error, line one line two"
    );
    assert_eq!(
        format_client(&ClientMessage::Leave(RoomId::pod("p9").unwrap())),
        "leave-pod, p9"
    );
}

#[test]
fn text_server_lines_parse_back() {
    let rejected = parse_server_line("join-rejected, booking:b1, private, owner only")
        .unwrap()
        .unwrap();
    assert_eq!(
        rejected,
        ServerMessage::join_rejected(RoomId::booking("b1").unwrap(), "private, owner only")
    );
    assert_eq!(
        parse_server_line("pod-update, p1, OCCUPIED").unwrap(),
        Some(ServerMessage::from(ServerEvent::pod("p1", PodStatus::Occupied)))
    );
    assert_eq!(parse_server_line("pong").unwrap(), Some(ServerMessage::Pong));
    assert!(matches!(
        parse_server_line("pong, extra"),
        Err(ProtocolError::WrongArity { expected: 0, got: 1, .. })
    ));
}

#[test]
fn codec_detection_and_dispatch() {
    assert_eq!(Codec::detect(b'{'), Codec::Json);
    assert_eq!(Codec::detect(b'j'), Codec::Text);

    assert_eq!(Codec::Json.decode_client("").unwrap(), None);
    assert_eq!(
        Codec::Text.decode_client("join-booking, b3").unwrap(),
        Some(ClientMessage::Join(RoomId::booking("b3").unwrap()))
    );
    assert_eq!(
        Codec::Text.encode_server(&ServerMessage::Pong).unwrap(),
        "pong\n"
    );
    assert_eq!(
        Codec::Json.encode_server(&ServerMessage::Pong).unwrap(),
        "{\"event\":\"pong\"}\n"
    );
}
