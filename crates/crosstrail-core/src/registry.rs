//! Authoritative presence registry held by the coordinator.
//!
//! Every mutation happens through `&mut Coordinator`, so whoever owns it is
//! the single writer. The server keeps it behind one async mutex.

use fnv::FnvHashMap;
use rand::prelude::*;

use crate::constants::{HUE_RANGE, SOUND_PROFILE_COUNT};
use crate::protocol::{ClientMessage, Participant, ParticipantId, RegistrySnapshot, ServerMessage};

/// Outbound half of one connection.
///
/// Implementations queue the message for the transport; an error means the
/// peer is gone and is only logged by the caller.
pub trait Outbox {
    type Error: std::fmt::Display;

    fn deliver(&self, msg: &ServerMessage) -> Result<(), Self::Error>;
}

pub struct Coordinator<O: Outbox> {
    users: FnvHashMap<ParticipantId, Participant>,
    outboxes: FnvHashMap<ParticipantId, O>,
    rng: StdRng,
}

impl<O: Outbox> Coordinator<O> {
    pub fn new(seed: u64) -> Self {
        Self {
            users: FnvHashMap::default(),
            outboxes: FnvHashMap::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Registers a new connection under a freshly minted id.
    pub fn connect(&mut self, outbox: O) -> ParticipantId {
        let id = ParticipantId::generate();
        self.connect_with_id(id.clone(), outbox);
        id
    }

    /// Registers a connection under a caller-chosen id.
    ///
    /// The newcomer receives `init` with the full snapshot (itself included);
    /// everyone else receives `userJoined`. Reusing a live id replaces it.
    pub fn connect_with_id(&mut self, id: ParticipantId, outbox: O) -> Participant {
        let user = Participant::new(
            self.rng.gen_range(0..SOUND_PROFILE_COUNT),
            self.rng.gen_range(0..HUE_RANGE),
        );
        self.users.insert(id.clone(), user.clone());
        self.outboxes.insert(id.clone(), outbox);
        log::info!(
            "participant {} connected (soundIndex {}, hue {})",
            id,
            user.sound_index,
            user.hue
        );

        let init = ServerMessage::Init {
            id: id.clone(),
            state: self.snapshot(),
        };
        self.send_to(&id, &init);
        self.broadcast_except(
            &id,
            &ServerMessage::UserJoined {
                id: id.clone(),
                user: user.clone(),
            },
        );
        user
    }

    /// Records `id`'s new position and relays it to every other connection.
    ///
    /// Unknown ids are dropped silently: the connection already closed or the
    /// frame arrived late. Returns whether the move was accepted.
    pub fn handle_move(&mut self, id: &ParticipantId, x: f64, y: f64) -> bool {
        let Some(user) = self.users.get_mut(id) else {
            log::debug!("ignoring move from unknown participant {}", id);
            return false;
        };
        user.x = x;
        user.y = y;
        self.broadcast_except(
            id,
            &ServerMessage::UserMoved {
                id: id.clone(),
                x,
                y,
            },
        );
        true
    }

    pub fn handle_message(&mut self, id: &ParticipantId, msg: ClientMessage) -> bool {
        match msg {
            ClientMessage::Move { x, y } => self.handle_move(id, x, y),
        }
    }

    /// Drops `id` and tells every remaining connection. Unknown ids are a no-op.
    pub fn disconnect(&mut self, id: &ParticipantId) -> Option<Participant> {
        self.outboxes.remove(id);
        let removed = self.users.remove(id)?;
        log::info!("participant {} disconnected", id);
        let left = ServerMessage::UserLeft { id: id.clone() };
        for (peer, outbox) in &self.outboxes {
            deliver_logged(peer, outbox, &left);
        }
        Some(removed)
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            users: self
                .users
                .iter()
                .map(|(id, u)| (id.clone(), u.clone()))
                .collect(),
        }
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.users.get(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.users.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn send_to(&self, id: &ParticipantId, msg: &ServerMessage) {
        if let Some(outbox) = self.outboxes.get(id) {
            deliver_logged(id, outbox, msg);
        }
    }

    /// Fanout that never reaches the originating connection.
    fn broadcast_except(&self, sender: &ParticipantId, msg: &ServerMessage) {
        for (peer, outbox) in self.outboxes.iter().filter(|(peer, _)| *peer != sender) {
            deliver_logged(peer, outbox, msg);
        }
    }
}

fn deliver_logged<O: Outbox>(peer: &ParticipantId, outbox: &O, msg: &ServerMessage) {
    if let Err(e) = outbox.deliver(msg) {
        log::warn!("delivery to {} failed: {}", peer, e);
    }
}
