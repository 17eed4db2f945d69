// Use cases layer: the session workflow and its transport port.

pub mod ports;
pub mod session;
pub mod types;

pub use ports::ServerChannel;
pub use session::{Session, SessionSettings};
pub use types::{InboundEvent, OutboundIntent, SessionView};
