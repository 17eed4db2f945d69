// Wire protocol DTOs and conversions for the game server contract.
// Event names and payload field casing follow the server's public schema.

use crate::domain::{Player, RoomSnapshot};
use crate::use_cases::{InboundEvent, OutboundIntent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    // Request to enter the room under a display name.
    JoinRequest { username: String },
    // Intent to occupy a box this round.
    #[serde(rename_all = "camelCase")]
    SelectBox { box_index: usize },
}

/// Messages the server pushes to connected clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    // Full authoritative snapshot, keyed by opaque player id.
    RoomState(BTreeMap<String, PlayerDto>),
    // Seconds remaining, full replacement of the countdown.
    Tick(u64),
    // The cursed box for the current round.
    #[serde(rename_all = "camelCase")]
    Eliminated { box_index: usize },
    // User-facing error; the connection stays open.
    Fault { message: String },
}

/// Per-player entry inside a room snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDto {
    pub username: String,
    // Absent or null both mean the player occupies no box.
    #[serde(default)]
    pub position: Option<usize>,
    pub score: u32,
    pub alive: bool,
}

impl From<OutboundIntent> for ClientMessage {
    fn from(intent: OutboundIntent) -> Self {
        match intent {
            OutboundIntent::Join { username } => ClientMessage::JoinRequest { username },
            OutboundIntent::Select { box_index } => ClientMessage::SelectBox { box_index },
        }
    }
}

impl From<PlayerDto> for Player {
    fn from(player: PlayerDto) -> Self {
        Self {
            username: player.username,
            position: player.position,
            score: player.score,
            alive: player.alive,
        }
    }
}

impl From<ServerMessage> for InboundEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::RoomState(players) => {
                let snapshot: RoomSnapshot = players
                    .into_iter()
                    .map(|(id, player)| (id, Player::from(player)))
                    .collect();
                InboundEvent::RoomState(snapshot)
            }
            ServerMessage::Tick(seconds) => InboundEvent::Tick(seconds),
            ServerMessage::Eliminated { box_index } => InboundEvent::Eliminated { box_index },
            ServerMessage::Fault { message } => InboundEvent::Fault { message },
        }
    }
}
