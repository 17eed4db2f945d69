use std::env;

// Runtime/client configuration (not gameplay tuning).

pub fn server_endpoint() -> String {
    env::var("GAME_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string())
}

pub fn username() -> String {
    env::var("GAME_USERNAME").unwrap_or_else(|_| "guest".to_string())
}
