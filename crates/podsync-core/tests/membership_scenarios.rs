// crates/podsync-core/tests/membership_scenarios.rs
use podsync_core::{ConnectionId, RoomId, RoomRegistry, ServerEvent, PodStatus};

const SCENARIOS: &str = include_str!("data/membership_scenarios.txt");

fn conn(token: &str) -> ConnectionId {
    ConnectionId(token.parse().expect("connection id"))
}

fn room(token: &str) -> RoomId {
    token.parse().expect("room id")
}

fn split_scenarios(input: &str) -> Vec<(String, Vec<String>)> {
    let mut scenarios = Vec::new();
    let mut current_name = String::new();
    let mut current_lines: Vec<String> = Vec::new();

    for line in input.lines() {
        if let Some(name) = line.strip_prefix("#name:") {
            if !current_lines.is_empty() {
                scenarios.push((current_name.clone(), current_lines.clone()));
            }
            current_name = name.trim().to_string();
            current_lines.clear();
        } else if !line.starts_with('#') && !line.trim().is_empty() {
            current_lines.push(line.trim().to_string());
        }
    }
    if !current_lines.is_empty() {
        scenarios.push((current_name, current_lines));
    }

    scenarios
}

#[test]
fn replay_membership_scenarios() {
    let scenarios = split_scenarios(SCENARIOS);
    assert_eq!(scenarios.len(), 5);

    for (name, lines) in scenarios {
        let mut registry = RoomRegistry::new();

        for line in &lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["join", c, r] => {
                    registry.join(conn(c), room(r));
                }
                ["leave", c, r] => {
                    registry.leave(conn(c), &room(r));
                }
                ["disconnect", c] => {
                    registry.disconnect(conn(c));
                }
                ["expect", r, "-"] => {
                    assert!(!registry.contains(&room(r)), "{name}: {r} should be gone");
                }
                ["expect", r, list] => {
                    let mut members = registry.members(&room(r));
                    members.sort();
                    let expected: Vec<ConnectionId> = list.split(',').map(conn).collect();
                    assert_eq!(members, expected, "{name}: members of {r}");
                }
                ["rooms", n] => {
                    let n: usize = n.parse().expect("room count");
                    assert_eq!(registry.room_count(), n, "{name}: room count");
                }
                other => panic!("{name}: unknown command {other:?}"),
            }
        }
    }
}

#[test]
fn join_reports_new_membership_only_once() {
    let mut registry = RoomRegistry::new();
    let p1 = RoomId::pod("p1").unwrap();

    assert!(registry.join(ConnectionId(1), p1.clone()));
    assert!(!registry.join(ConnectionId(1), p1.clone()));
    assert!(registry.is_member(ConnectionId(1), &p1));
    assert!(!registry.is_member(ConnectionId(2), &p1));
    assert!(registry.leave(ConnectionId(1), &p1));
    assert!(!registry.leave(ConnectionId(1), &p1));
    assert!(!registry.is_member(ConnectionId(1), &p1));
}

#[test]
fn disconnect_returns_left_rooms_sorted() {
    let mut registry = RoomRegistry::new();
    registry.join(ConnectionId(7), RoomId::pod("p2").unwrap());
    registry.join(ConnectionId(7), RoomId::booking("b1").unwrap());
    registry.join(ConnectionId(7), RoomId::pod("p1").unwrap());

    let left = registry.disconnect(ConnectionId(7));
    let rendered: Vec<String> = left.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["pod:p1", "pod:p2", "booking:b1"]);

    assert!(registry.rooms_of(ConnectionId(7)).is_empty());
    assert_eq!(registry.connection_count(), 0);
    assert!(registry.disconnect(ConnectionId(7)).is_empty());
}

#[test]
fn member_snapshot_survives_later_leave() {
    let mut registry = RoomRegistry::new();
    let p1 = RoomId::pod("p1").unwrap();
    registry.join(ConnectionId(1), p1.clone());
    registry.join(ConnectionId(2), p1.clone());

    let snapshot = registry.members(&p1);
    registry.leave(ConnectionId(1), &p1);
    registry.leave(ConnectionId(2), &p1);

    assert_eq!(snapshot.len(), 2);
    assert!(registry.members(&p1).is_empty());
}

#[test]
fn events_route_to_their_resource_room() {
    let event = ServerEvent::pod("p1", PodStatus::Occupied);
    assert_eq!(event.room(), RoomId::pod("p1").unwrap());
    assert_eq!(event.name(), "pod-update");

    let mut registry = RoomRegistry::new();
    registry.join(ConnectionId(1), RoomId::pod("p1").unwrap());
    registry.join(ConnectionId(2), RoomId::pod("p2").unwrap());
    assert_eq!(registry.members(&event.room()), vec![ConnectionId(1)]);
}
