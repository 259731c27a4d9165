use crate::application::Session;
use crate::domain::{ChatEntry, Role, Screen, SessionEvent};
use crate::infrastructure::MessageBus;
use roomchat_core::{ConnectionStatus, PeerId, RoomCode};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Tuning for the background driver
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How often the session is polled for frames and timers
    pub poll_interval: Duration,
    /// Bounded command queue size
    pub command_queue: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            command_queue: 100,
        }
    }
}

impl RuntimeConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// User intents forwarded to the session task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    CreateRoom,
    JoinRoom(String),
    Send(String),
    Leave,
    /// Leave the room (if any) and stop the task
    Shutdown,
}

/// Snapshot of session state (read-only, cheap to clone)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub room_code: Option<RoomCode>,
    pub identity: Option<PeerId>,
    pub role: Option<Role>,
    pub status: ConnectionStatus,
    pub screen: Screen,
    pub peer_count: usize,
    pub messages: Vec<ChatEntry>,
}

impl SessionSnapshot {
    fn capture<B: MessageBus>(session: &Session<B>) -> Self {
        Self {
            room_code: session.room_code().cloned(),
            identity: session.identity().cloned(),
            role: session.role(),
            status: session.status(),
            screen: session.screen(),
            peer_count: session.peer_count(),
            messages: session.messages().to_vec(),
        }
    }
}

/// Background driver for one [`Session`]
///
/// Owns the session on a tokio task, applies submitted commands, polls it on
/// a fixed interval, forwards its events and publishes snapshots.
pub struct SessionRuntime {
    /// Send commands to the session task
    cmd_tx: mpsc::Sender<SessionCommand>,

    /// Latest state (always available)
    state_rx: watch::Receiver<SessionSnapshot>,

    /// UI events, until taken by the presentation layer
    event_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,

    task_handle: tokio::task::JoinHandle<()>,
}

impl SessionRuntime {
    /// Spawn the session onto the current tokio runtime
    pub fn spawn<B>(mut session: Session<B>, config: RuntimeConfig) -> Self
    where
        B: MessageBus + Send + 'static,
        B::Channel: Send + 'static,
    {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<SessionCommand>(config.command_queue.max(1));
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::capture(&session));
        let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();

        let task_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!("SessionRuntime started");

            loop {
                let shutdown = tokio::select! {
                    _ = interval.tick() => false,
                    cmd = cmd_rx.recv() => match cmd {
                        Some(cmd) => apply(&mut session, cmd),
                        // Every handle is gone
                        None => true,
                    },
                };

                if shutdown {
                    session.leave();
                    forward_events(&mut session, &event_tx);
                    publish_snapshot(&session, &state_tx);
                    break;
                }

                let processed = session.poll();
                if processed > 0 {
                    tracing::debug!("SessionRuntime processed {} frames", processed);
                }

                forward_events(&mut session, &event_tx);
                publish_snapshot(&session, &state_tx);
            }

            tracing::info!("SessionRuntime stopped");
        });

        Self {
            cmd_tx,
            state_rx,
            event_rx: Some(event_rx),
            task_handle,
        }
    }

    /// Submit a command
    pub async fn submit(
        &self,
        cmd: SessionCommand,
    ) -> Result<(), mpsc::error::SendError<SessionCommand>> {
        self.cmd_tx.send(cmd).await
    }

    /// Get latest state snapshot (never blocks)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Take the event stream (only the first call gets it)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.event_rx.take()
    }

    /// Leave the room and stop the task
    pub async fn shutdown(self) {
        if self.cmd_tx.send(SessionCommand::Shutdown).await.is_err() {
            tracing::debug!("SessionRuntime already stopped");
        }
        if let Err(e) = self.task_handle.await {
            tracing::warn!("SessionRuntime task ended abnormally: {}", e);
        }
    }
}

/// Apply one command; returns `true` on shutdown
fn apply<B: MessageBus>(session: &mut Session<B>, cmd: SessionCommand) -> bool {
    tracing::debug!("SessionRuntime command: {:?}", cmd);

    // Failures already surface as `ErrorRaised` events
    let result = match cmd {
        SessionCommand::CreateRoom => session.create_room().map(|_| ()),
        SessionCommand::JoinRoom(code) => session.join_room(&code),
        SessionCommand::Send(text) => session.send(&text),
        SessionCommand::Leave => {
            session.leave();
            Ok(())
        }
        SessionCommand::Shutdown => return true,
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {}", e);
    }
    false
}

fn forward_events<B: MessageBus>(
    session: &mut Session<B>,
    event_tx: &mpsc::UnboundedSender<SessionEvent>,
) {
    for event in session.drain_events() {
        // Nobody listening is fine
        let _ = event_tx.send(event);
    }
}

fn publish_snapshot<B: MessageBus>(session: &Session<B>, state_tx: &watch::Sender<SessionSnapshot>) {
    let snapshot = SessionSnapshot::capture(session);
    state_tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}
