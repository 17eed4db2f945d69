// Use-case level inputs/outputs for the session loop.

use crate::domain::{RoomSnapshot, player};

/// Server-pushed events, already lifted off the wire.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    RoomState(RoomSnapshot),
    Tick(u64),
    Eliminated { box_index: usize },
    Fault { message: String },
}

/// Player intents bound for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundIntent {
    Join { username: String },
    Select { box_index: usize },
}

/// Read-only state published to the presentation layer.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub username: String,
    pub joined: bool,
    pub room: RoomSnapshot,
    pub timer_seconds: u64,
    /// Box currently highlighted as cursed, until the highlight expires.
    pub cursed_box: Option<usize>,
    /// False once the transport stops delivering events.
    pub connected: bool,
}

impl SessionView {
    /// Usernames of living players occupying `box_index`, in snapshot order.
    pub fn occupants(&self, box_index: usize) -> Vec<&str> {
        player::occupants(&self.room, box_index)
    }
}
