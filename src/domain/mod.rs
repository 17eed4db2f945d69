// Domain layer: room view types and the session state machine.

pub mod player;
pub mod session;

pub use player::{Player, PlayerId, RoomSnapshot};
pub use session::{HighlightToken, SessionState};
