// Session controller: one task per activation reconciles server events,
// player intents, and the highlight expiry into the published view.

use crate::domain::session::{HighlightToken, IntentRejection, SessionState};
use crate::use_cases::ports::ServerChannel;
use crate::use_cases::types::{InboundEvent, OutboundIntent, SessionView};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Session tuning and channel wiring, observed client defaults.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Number of selectable boxes per round.
    pub total_boxes: usize,
    /// Selection is locked once the countdown is at or below this value.
    pub select_lockout_seconds: u64,
    /// How long the cursed-box highlight stays set without a newer signal.
    pub highlight_ttl: Duration,
    /// Countdown shown before the first tick arrives.
    pub initial_timer_seconds: u64,
    /// Capacity for queued player intents.
    pub intent_channel_capacity: usize,
    /// Capacity for pending fault notifications.
    pub fault_channel_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            total_boxes: 4,
            select_lockout_seconds: 3,
            highlight_ttl: Duration::from_secs(5),
            initial_timer_seconds: 100,
            intent_channel_capacity: 64,
            fault_channel_capacity: 16,
        }
    }
}

const DEACTIVATE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum SessionIntent {
    Join { username: String },
    Select { box_index: usize },
}

/// Handle to an activated session.
///
/// Dropping the handle aborts the session task; prefer [`Session::deactivate`]
/// for a teardown that also closes the transport cleanly.
pub struct Session {
    intent_tx: mpsc::Sender<SessionIntent>,
    view_rx: watch::Receiver<SessionView>,
    shutdown: Arc<Notify>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl Session {
    /// Spawn the session task over an already-opened server channel.
    ///
    /// Returns the handle plus the receiver for one-shot fault notifications.
    pub fn activate(
        channel: impl ServerChannel + 'static,
        settings: SessionSettings,
    ) -> (Self, mpsc::Receiver<String>) {
        let (intent_tx, intent_rx) =
            mpsc::channel::<SessionIntent>(settings.intent_channel_capacity);
        let (fault_tx, fault_rx) = mpsc::channel::<String>(settings.fault_channel_capacity);

        let state = SessionState::new(settings.initial_timer_seconds);
        let (view_tx, view_rx) = watch::channel(make_view(&state, true));

        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(session_task(
            channel,
            settings,
            state,
            intent_rx,
            view_tx,
            fault_tx,
            Arc::clone(&shutdown),
        ));

        (
            Self {
                intent_tx,
                view_rx,
                shutdown,
                task: Some(task),
            },
            fault_rx,
        )
    }

    /// Current published view.
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Receiver the presentation layer can watch for view changes.
    pub fn watch_view(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Ask to join the room under `username`. Blank names are rejected
    /// locally; at most one join request leaves per activation.
    pub async fn request_join(&self, username: &str) {
        let _ = self
            .intent_tx
            .send(SessionIntent::Join {
                username: username.to_string(),
            })
            .await;
    }

    /// Ask to occupy `box_index` this round. Dropped locally unless joined,
    /// the round is still open, and the index is in range.
    pub async fn request_select(&self, box_index: usize) {
        let _ = self
            .intent_tx
            .send(SessionIntent::Select { box_index })
            .await;
    }

    /// Tear the session down: close the transport and stop the task. Any
    /// pending highlight expiry dies with the task.
    pub async fn deactivate(mut self) {
        self.shutdown.notify_one();
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(DEACTIVATE_TIMEOUT, &mut task)
                .await
                .is_err()
            {
                warn!("session task did not stop in time; aborting");
                task.abort();
            }
        }
    }
}

impl Drop for Session {
    // Abort rather than leak the task when the handle is dropped without an
    // explicit deactivate; the transport task is torn down by its own Drop.
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn make_view(state: &SessionState, connected: bool) -> SessionView {
    SessionView {
        username: state.username().to_string(),
        joined: state.joined(),
        room: state.room().clone(),
        timer_seconds: state.timer_seconds(),
        cursed_box: state.cursed_box(),
        connected,
    }
}

async fn session_task(
    mut channel: impl ServerChannel,
    settings: SessionSettings,
    mut state: SessionState,
    mut intent_rx: mpsc::Receiver<SessionIntent>,
    view_tx: watch::Sender<SessionView>,
    fault_tx: mpsc::Sender<String>,
    shutdown: Arc<Notify>,
) {
    let mut connected = true;
    // At most one pending expiry exists, always for the latest signal; the
    // token keeps a late firing from clearing a newer highlight.
    let mut pending_clear: Option<(HighlightToken, Instant)> = None;

    loop {
        let clear_at = pending_clear
            .map(|(_, at)| at)
            .unwrap_or_else(far_future);

        tokio::select! {
            incoming = channel.recv() => {
                match incoming {
                    Some(event) => {
                        handle_event(
                            event,
                            &mut state,
                            &settings,
                            &mut pending_clear,
                            &fault_tx,
                        );
                        let _ = view_tx.send(make_view(&state, connected));
                    }
                    None => {
                        // Transport stopped delivering; fatal to the session.
                        debug!("server channel closed");
                        connected = false;
                        let _ = view_tx.send(make_view(&state, connected));
                        break;
                    }
                }
            }

            intent = intent_rx.recv() => {
                match intent {
                    Some(intent) => {
                        if handle_intent(intent, &mut state, &settings, &mut channel).await {
                            let _ = view_tx.send(make_view(&state, connected));
                        }
                    }
                    None => {
                        // Every handle is gone; nothing can drive the session.
                        channel.close().await;
                        break;
                    }
                }
            }

            _ = tokio::time::sleep_until(clear_at), if pending_clear.is_some() => {
                if let Some((token, _)) = pending_clear.take() {
                    if state.clear_highlight(token) {
                        let _ = view_tx.send(make_view(&state, connected));
                    }
                }
            }

            _ = shutdown.notified() => {
                channel.close().await;
                break;
            }
        }
    }
}

fn handle_event(
    event: InboundEvent,
    state: &mut SessionState,
    settings: &SessionSettings,
    pending_clear: &mut Option<(HighlightToken, Instant)>,
    fault_tx: &mpsc::Sender<String>,
) {
    match event {
        InboundEvent::RoomState(snapshot) => {
            state.apply_room_state(snapshot);
        }
        InboundEvent::Tick(seconds) => {
            state.apply_tick(seconds);
        }
        InboundEvent::Eliminated { box_index } => {
            debug!(box_index, "box eliminated");
            let token = state.apply_elimination(box_index);
            // A fresh window replaces any previous pending expiry.
            *pending_clear = Some((token, Instant::now() + settings.highlight_ttl));
        }
        InboundEvent::Fault { message } => {
            debug!(%message, "server fault received");
            if fault_tx.try_send(message).is_err() {
                warn!("fault notification dropped; consumer not keeping up");
            }
        }
    }
}

/// Returns true when the intent changed published state.
async fn handle_intent(
    intent: SessionIntent,
    state: &mut SessionState,
    settings: &SessionSettings,
    channel: &mut impl ServerChannel,
) -> bool {
    match intent {
        SessionIntent::Join { username } => match state.begin_join(&username) {
            Ok(trimmed) => {
                channel.send(OutboundIntent::Join { username: trimmed }).await;
                true
            }
            Err(reason) => {
                debug!(?reason, "join request dropped");
                false
            }
        },
        SessionIntent::Select { box_index } => {
            match state.check_select(
                box_index,
                settings.total_boxes,
                settings.select_lockout_seconds,
            ) {
                Ok(()) => {
                    channel.send(OutboundIntent::Select { box_index }).await;
                    false
                }
                Err(IntentRejection::BoxOutOfRange) => {
                    // Caller bug, not a runtime condition.
                    warn!(box_index, total_boxes = settings.total_boxes, "box index out of range");
                    false
                }
                Err(reason) => {
                    debug!(?reason, box_index, "select request dropped");
                    false
                }
            }
        }
    }
}

fn far_future() -> Instant {
    // Placeholder deadline for the disabled sleep branch.
    Instant::now() + Duration::from_secs(86_400)
}
