// Interface adapters: wire protocol DTOs and the WebSocket transport.

pub mod net;
pub mod protocol;

pub use net::ServerConnection;
