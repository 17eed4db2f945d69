// Session state machine driven by server events and local intents.

use crate::domain::player::RoomSnapshot;

/// Why a local intent was rejected before reaching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentRejection {
    EmptyUsername,
    AlreadyJoined,
    NotJoined,
    RoundLocked,
    BoxOutOfRange,
}

/// Proof that an elimination highlight was set; clearing requires the token
/// minted for that exact signal instance, so a stale expiry can never erase
/// a newer highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightToken(u64);

/// Local session view, mutated only by server events and validated intents.
#[derive(Debug, Clone)]
pub struct SessionState {
    username: String,
    joined: bool,
    room: RoomSnapshot,
    timer_seconds: u64,
    cursed_box: Option<usize>,
    highlight_seq: u64,
}

impl SessionState {
    pub fn new(initial_timer_seconds: u64) -> Self {
        Self {
            username: String::new(),
            joined: false,
            room: RoomSnapshot::new(),
            timer_seconds: initial_timer_seconds,
            cursed_box: None,
            highlight_seq: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn joined(&self) -> bool {
        self.joined
    }

    pub fn room(&self) -> &RoomSnapshot {
        &self.room
    }

    pub fn timer_seconds(&self) -> u64 {
        self.timer_seconds
    }

    pub fn cursed_box(&self) -> Option<usize> {
        self.cursed_box
    }

    /// Anonymous → Active transition. Returns the trimmed username to send
    /// in the join request. The flag flips on send, without waiting for a
    /// server acknowledgment (observed behavior, kept as-is).
    pub fn begin_join(&mut self, username: &str) -> Result<String, IntentRejection> {
        if self.joined {
            return Err(IntentRejection::AlreadyJoined);
        }
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(IntentRejection::EmptyUsername);
        }
        self.username = trimmed.to_string();
        self.joined = true;
        Ok(self.username.clone())
    }

    /// Gate for box-selection intents: joined, strictly above the lockout
    /// threshold, and a valid box index.
    pub fn check_select(
        &self,
        box_index: usize,
        total_boxes: usize,
        lockout_seconds: u64,
    ) -> Result<(), IntentRejection> {
        if box_index >= total_boxes {
            return Err(IntentRejection::BoxOutOfRange);
        }
        if !self.joined {
            return Err(IntentRejection::NotJoined);
        }
        if self.timer_seconds <= lockout_seconds {
            return Err(IntentRejection::RoundLocked);
        }
        Ok(())
    }

    /// Replace the room view wholesale; earlier snapshots are never merged.
    pub fn apply_room_state(&mut self, snapshot: RoomSnapshot) {
        self.room = snapshot;
    }

    /// Replace the countdown wholesale; the client never decrements locally.
    pub fn apply_tick(&mut self, seconds: u64) {
        self.timer_seconds = seconds;
    }

    /// Set the cursed-box highlight and mint the token its expiry must present.
    pub fn apply_elimination(&mut self, box_index: usize) -> HighlightToken {
        self.cursed_box = Some(box_index);
        self.highlight_seq += 1;
        HighlightToken(self.highlight_seq)
    }

    /// Clear the highlight if `token` still names the current signal.
    /// Stale tokens (superseded by a newer elimination) are no-ops.
    pub fn clear_highlight(&mut self, token: HighlightToken) -> bool {
        if token.0 != self.highlight_seq {
            return false;
        }
        self.cursed_box = None;
        true
    }
}
