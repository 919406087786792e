//! Wire contract between the coordinator and every viewer.
//!
//! Frames are JSON text, internally tagged by a camelCase `type` field.
//! Decoding is the only validation step: anything that fails here never
//! reaches the registry or a session.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{HUE_RANGE, OFFSCREEN_POSITION, SOUND_PROFILE_COUNT};

/// Opaque connection-scoped participant identity minted by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Public state of one participant as held by the registry and its mirrors.
///
/// `sound_index` and `hue` are fixed at creation; only `x`/`y` change.
/// Coordinates stay `f64` on the wire and in the registry so any finite JSON
/// number round-trips unchanged; viewers narrow them at the trail boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub x: f64,
    pub y: f64,
    pub sound_index: u8,
    pub hue: u16,
}

impl Participant {
    /// New participant parked at the off-screen sentinel.
    pub fn new(sound_index: u8, hue: u16) -> Self {
        Self {
            x: OFFSCREEN_POSITION[0],
            y: OFFSCREEN_POSITION[1],
            sound_index,
            hue,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    fn validate(&self, id: &ParticipantId) -> Result<(), ProtocolError> {
        if self.sound_index >= SOUND_PROFILE_COUNT {
            return Err(ProtocolError::SoundIndexOutOfRange {
                id: id.clone(),
                value: self.sound_index,
            });
        }
        if self.hue >= HUE_RANGE {
            return Err(ProtocolError::HueOutOfRange {
                id: id.clone(),
                value: self.hue,
            });
        }
        Ok(())
    }
}

/// Full registry snapshot carried by `init`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub users: HashMap<ParticipantId, Participant>,
}

/// Coordinator to viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent once to a new connection: its own id plus everyone already present.
    Init {
        id: ParticipantId,
        state: RegistrySnapshot,
    },
    UserJoined {
        id: ParticipantId,
        user: Participant,
    },
    UserMoved {
        id: ParticipantId,
        x: f64,
        y: f64,
    },
    UserLeft {
        id: ParticipantId,
    },
}

impl ServerMessage {
    /// Participant the message is about (for `init`, the recipient itself).
    pub fn subject(&self) -> &ParticipantId {
        match self {
            ServerMessage::Init { id, .. }
            | ServerMessage::UserJoined { id, .. }
            | ServerMessage::UserMoved { id, .. }
            | ServerMessage::UserLeft { id } => id,
        }
    }
}

/// Viewer to coordinator. Coordinates are normalized but never range-checked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Move { x: f64, y: f64 },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("participant {id}: soundIndex {value} outside [0, 6)")]
    SoundIndexOutOfRange { id: ParticipantId, value: u8 },
    #[error("participant {id}: hue {value} outside [0, 360)")]
    HueOutOfRange { id: ParticipantId, value: u16 },
}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let msg: ServerMessage = serde_json::from_str(text)?;
    match &msg {
        ServerMessage::Init { state, .. } => {
            for (id, user) in &state.users {
                user.validate(id)?;
            }
        }
        ServerMessage::UserJoined { id, user } => user.validate(id)?,
        ServerMessage::UserMoved { .. } | ServerMessage::UserLeft { .. } => {}
    }
    Ok(msg)
}

pub fn encode<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}
