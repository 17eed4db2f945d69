// Room occupancy types derived from server snapshots.

use std::collections::BTreeMap;

/// Opaque player identifier assigned by the server.
pub type PlayerId = String;

/// One participant as described by the latest room snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub username: String,
    /// Occupied box index; `None` until a selection is made or the round resets.
    pub position: Option<usize>,
    pub score: u32,
    pub alive: bool,
}

/// Full authoritative room view, replaced wholesale on every update.
///
/// Snapshot order is server-defined and opaque; a sorted map keeps iteration
/// deterministic without inventing a tie-break.
pub type RoomSnapshot = BTreeMap<PlayerId, Player>;

/// Usernames of living players occupying `box_index`, in snapshot order.
pub fn occupants(room: &RoomSnapshot, box_index: usize) -> Vec<&str> {
    room.values()
        .filter(|p| p.position == Some(box_index) && p.alive)
        .map(|p| p.username.as_str())
        .collect()
}
