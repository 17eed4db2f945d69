pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use interface_adapters::net::ServerConnection;
pub use use_cases::session::{Session, SessionSettings};
pub use use_cases::types::SessionView;
