// Framework bootstrap for the headless game client runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::ServerConnection;
use crate::use_cases::session::{Session, SessionSettings};

use tracing::{info, warn};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run_with_config() -> std::io::Result<()> {
    init_runtime();
    run(config::server_endpoint(), config::username()).await
}

/// Activate one session against `endpoint`, join as `username`, and log
/// derived state until the connection ends or the process is interrupted.
pub async fn run(endpoint: String, username: String) -> std::io::Result<()> {
    let connection = ServerConnection::open(endpoint.clone());
    info!(%endpoint, %username, "session starting");

    let (session, mut faults) = Session::activate(connection, SessionSettings::default());
    session.request_join(&username).await;

    let mut view_rx = session.watch_view();
    loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                if !view.connected {
                    warn!("server connection lost");
                    break;
                }
                info!(
                    timer = view.timer_seconds,
                    players = view.room.len(),
                    cursed_box = ?view.cursed_box,
                    "round state"
                );
            }

            Some(message) = faults.recv() => {
                // One-shot user-facing alert, verbatim from the server.
                warn!(%message, "server fault");
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    session.deactivate().await;
    Ok(())
}
