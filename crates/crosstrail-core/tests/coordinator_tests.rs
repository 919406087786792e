mod common;

use common::{ClosedOutbox, RecordingOutbox};
use crosstrail_core::{
    decode_client_message, decode_server_message, encode, ClientMessage, Coordinator, ParticipantId, ServerMessage, HUE_RANGE, OFFSCREEN_POSITION,
    SOUND_PROFILE_COUNT,
};

fn id(s: &str) -> ParticipantId {
    ParticipantId::from(s)
}

fn connect(coord: &mut Coordinator<RecordingOutbox>, name: &str) -> RecordingOutbox {
    let outbox = RecordingOutbox::default();
    coord.connect_with_id(id(name), outbox.clone());
    outbox
}

#[test]
fn connect_sends_init_with_full_snapshot_and_announces_to_others() {
    let mut coord = Coordinator::new(7);
    let a = connect(&mut coord, "a1");
    a.clear();
    let b = connect(&mut coord, "b1");

    let b_msgs = b.messages();
    assert_eq!(b_msgs.len(), 1);
    match &b_msgs[0] {
        ServerMessage::Init { id: self_id, state } => {
            assert_eq!(self_id, &id("b1"));
            assert_eq!(state.users.len(), 2);
            assert!(state.users.contains_key(&id("a1")));
            assert!(state.users.contains_key(&id("b1")));
        }
        other => panic!("expected init, got {other:?}"),
    }

    let a_msgs = a.messages();
    assert_eq!(a_msgs.len(), 1);
    assert!(matches!(
        &a_msgs[0],
        ServerMessage::UserJoined { id: joined, .. } if joined == &id("b1")
    ));
}

#[test]
fn new_participant_starts_offscreen_with_profile_in_range() {
    let mut coord: Coordinator<RecordingOutbox> = Coordinator::new(1);
    for i in 0..50 {
        let user = coord.connect_with_id(id(&format!("p{i}")), RecordingOutbox::default());
        assert_eq!([user.x, user.y], OFFSCREEN_POSITION);
        assert!(user.sound_index < SOUND_PROFILE_COUNT);
        assert!(user.hue < HUE_RANGE);
    }
    assert_eq!(coord.len(), 50);
}

#[test]
fn generated_ids_are_unique() {
    let mut coord: Coordinator<RecordingOutbox> = Coordinator::new(3);
    let a = coord.connect(RecordingOutbox::default());
    let b = coord.connect(RecordingOutbox::default());
    assert_ne!(a, b);
    assert!(coord.contains(&a) && coord.contains(&b));
}

#[test]
fn move_updates_registry_and_skips_the_sender() {
    let mut coord = Coordinator::new(7);
    let a = connect(&mut coord, "a1");
    let b = connect(&mut coord, "b1");
    let c = connect(&mut coord, "c1");
    a.clear();
    b.clear();
    c.clear();

    assert!(coord.handle_message(&id("a1"), ClientMessage::Move { x: 0.25, y: 0.75 }));

    let user = coord.participant(&id("a1")).expect("a1 registered");
    assert_eq!((user.x, user.y), (0.25, 0.75));
    assert!(a.messages().is_empty(), "sender must not receive its own move");
    let expected = ServerMessage::UserMoved {
        id: id("a1"),
        x: 0.25,
        y: 0.75,
    };
    assert_eq!(b.messages(), vec![expected.clone()]);
    assert_eq!(c.messages(), vec![expected]);
}

#[test]
fn out_of_range_moves_are_forwarded_as_is() {
    let mut coord = Coordinator::new(7);
    connect(&mut coord, "a1");
    let b = connect(&mut coord, "b1");
    b.clear();

    coord.handle_move(&id("a1"), -3.0, 42.0);
    assert_eq!(
        b.messages(),
        vec![ServerMessage::UserMoved {
            id: id("a1"),
            x: -3.0,
            y: 42.0
        }]
    );
}

#[test]
fn move_from_unknown_participant_is_a_no_op() {
    let mut coord = Coordinator::new(7);
    let a = connect(&mut coord, "a1");
    a.clear();
    let before = coord.snapshot();

    assert!(!coord.handle_move(&id("ghost"), 0.5, 0.5));

    assert_eq!(coord.snapshot(), before);
    assert!(a.messages().is_empty());
}

#[test]
fn disconnect_removes_and_announces_to_the_rest() {
    let mut coord = Coordinator::new(7);
    let names = ["a1", "b1", "c1", "d1"];
    let outboxes: Vec<RecordingOutbox> = names.iter().map(|n| connect(&mut coord, n)).collect();
    for o in &outboxes {
        o.clear();
    }

    assert!(coord.disconnect(&id("c1")).is_some());
    assert_eq!(coord.len(), names.len() - 1);
    assert!(!coord.contains(&id("c1")));

    for (name, o) in names.iter().zip(&outboxes) {
        if *name == "c1" {
            assert!(o.messages().is_empty());
        } else {
            assert_eq!(o.messages(), vec![ServerMessage::UserLeft { id: id("c1") }]);
        }
    }

    // Late frames from the departed connection never surface again.
    for o in &outboxes {
        o.clear();
    }
    coord.handle_move(&id("c1"), 0.1, 0.1);
    connect(&mut coord, "e1");
    for o in &outboxes {
        assert!(o.messages().iter().all(|m| m.subject() != &id("c1")));
    }
    assert!(!coord.snapshot().users.contains_key(&id("c1")));
}

#[test]
fn disconnect_of_unknown_id_sends_nothing() {
    let mut coord = Coordinator::new(7);
    let a = connect(&mut coord, "a1");
    a.clear();
    assert!(coord.disconnect(&id("nobody")).is_none());
    assert!(a.messages().is_empty());
}

#[test]
fn failed_delivery_does_not_stop_fanout() {
    let mut coord: Coordinator<Box<dyn DynOutbox>> = Coordinator::new(9);
    let live = RecordingOutbox::default();
    coord.connect_with_id(id("dead"), Box::new(ClosedOutbox));
    coord.connect_with_id(id("live"), Box::new(live.clone()));
    coord.connect_with_id(id("mover"), Box::new(RecordingOutbox::default()));
    live.clear();

    coord.handle_move(&id("mover"), 0.5, 0.5);
    assert_eq!(live.messages().len(), 1);
}

// Lets one coordinator hold heterogeneous outboxes in this test.
trait DynOutbox {
    fn deliver_dyn(&self, msg: &ServerMessage) -> Result<(), String>;
}

impl<T: crosstrail_core::Outbox> DynOutbox for T {
    fn deliver_dyn(&self, msg: &ServerMessage) -> Result<(), String> {
        self.deliver(msg).map_err(|e| e.to_string())
    }
}

impl crosstrail_core::Outbox for Box<dyn DynOutbox> {
    type Error = String;

    fn deliver(&self, msg: &ServerMessage) -> Result<(), Self::Error> {
        self.as_ref().deliver_dyn(msg)
    }
}

#[test]
fn huge_move_keeps_later_init_snapshots_decodable() {
    let mut coord = Coordinator::new(9);
    connect(&mut coord, "a1");
    let msg = decode_client_message(r#"{"type":"move","x":1e39,"y":0.5}"#).unwrap();
    assert!(coord.handle_message(&id("a1"), msg));

    let c = connect(&mut coord, "c1");
    let init = c.messages().remove(0);
    let text = encode(&init).unwrap();
    match decode_server_message(&text).unwrap() {
        ServerMessage::Init { id: self_id, state } => {
            assert_eq!(self_id, id("c1"));
            let a1 = &state.users[&id("a1")];
            assert!(a1.x.is_finite() && a1.x > 1e38);
            assert_eq!(a1.y, 0.5);
        }
        other => panic!("expected init, got {other:?}"),
    }
}
