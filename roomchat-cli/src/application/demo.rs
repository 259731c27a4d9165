use crate::infrastructure::{CliError, Result};
use roomchat_session::{
    ConnectionStatus, LocalBus, RoomCode, RoomRegistry, RuntimeConfig, SessionBuilder,
    SessionCommand, SessionConfig, SessionEvent, SessionRuntime, SessionSnapshot,
};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// One event in the demo transcript, tagged with its tab (1-based)
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptLine {
    pub tab: usize,
    pub event: SessionEvent,
}

/// Outcome of the scripted two-tab scenario
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub room_code: RoomCode,
    pub transcript: Vec<TranscriptLine>,
}

struct DemoTab {
    runtime: SessionRuntime,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

struct Demo {
    tabs: Vec<DemoTab>,
    transcript: Vec<TranscriptLine>,
    poll_interval: Duration,
    deadline: Duration,
}

impl Demo {
    fn collect(&mut self) {
        for (index, tab) in self.tabs.iter_mut().enumerate() {
            while let Ok(event) = tab.events.try_recv() {
                self.transcript.push(TranscriptLine {
                    tab: index + 1,
                    event,
                });
            }
        }
    }

    async fn submit(&self, tab: usize, cmd: SessionCommand) -> Result<()> {
        self.tabs[tab]
            .runtime
            .submit(cmd)
            .await
            .map_err(|_| CliError::RuntimeStopped(tab + 1))
    }

    async fn wait_until(
        &mut self,
        tab: usize,
        what: &str,
        predicate: impl Fn(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let started = tokio::time::Instant::now();
        loop {
            self.collect();
            let snapshot = self.tabs[tab].runtime.snapshot();
            if predicate(&snapshot) {
                tracing::debug!("Demo: tab {} reached {}", tab + 1, what);
                return Ok(snapshot);
            }
            if started.elapsed() > self.deadline {
                return Err(CliError::Timeout(format!("tab {} to reach {}", tab + 1, what)));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Stop both tabs and collect their remaining events
    async fn shutdown(mut self) -> Vec<TranscriptLine> {
        self.collect();
        for (index, tab) in std::mem::take(&mut self.tabs).into_iter().enumerate() {
            let DemoTab {
                runtime,
                mut events,
            } = tab;
            runtime.shutdown().await;
            // The sender side is gone once the task has stopped
            while let Some(event) = events.recv().await {
                self.transcript.push(TranscriptLine {
                    tab: index + 1,
                    event,
                });
            }
        }
        self.transcript
    }
}

/// Run the scripted scenario: tab 1 creates a room, tab 2 joins, both chat,
/// tab 2 leaves
pub async fn run_demo(config: SessionConfig, runtime_config: RuntimeConfig) -> Result<DemoReport> {
    let bus = LocalBus::new();
    let registry = RoomRegistry::new();
    let deadline = config.join_timeout + config.peer_timeout;

    let tabs = (0..2)
        .map(|_| -> Result<DemoTab> {
            let session = SessionBuilder::new(bus.clone())
                .config(config.clone())
                .registry(registry.clone())
                .build();
            let mut runtime = SessionRuntime::spawn(session, runtime_config.clone());
            let events = runtime
                .take_events()
                .ok_or(CliError::RuntimeStopped(0))?;
            Ok(DemoTab { runtime, events })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut demo = Demo {
        tabs,
        transcript: Vec::new(),
        poll_interval: runtime_config.poll_interval,
        deadline,
    };

    tracing::info!("Demo: tab 1 creates a room");
    demo.submit(0, SessionCommand::CreateRoom).await?;
    let room_code = demo
        .wait_until(0, "a room code", |s| s.room_code.is_some())
        .await?
        .room_code
        .ok_or_else(|| CliError::Timeout("room code".to_string()))?;

    tracing::info!("Demo: tab 2 joins {}", room_code);
    demo.submit(1, SessionCommand::JoinRoom(room_code.to_string()))
        .await?;
    demo.wait_until(0, "connected", |s| s.status == ConnectionStatus::Connected)
        .await?;
    demo.wait_until(1, "connected", |s| s.status == ConnectionStatus::Connected)
        .await?;

    let greeting = "Hello from tab 2";
    demo.submit(1, SessionCommand::Send(greeting.to_string()))
        .await?;
    demo.wait_until(0, "the greeting", |s| {
        s.messages.iter().any(|m| m.text == greeting)
    })
    .await?;

    let reply = "Hi tab 2, tab 1 here";
    demo.submit(0, SessionCommand::Send(reply.to_string()))
        .await?;
    demo.wait_until(1, "the reply", |s| s.messages.iter().any(|m| m.text == reply))
        .await?;

    tracing::info!("Demo: tab 2 leaves");
    demo.submit(1, SessionCommand::Leave).await?;
    demo.wait_until(0, "an empty room", |s| s.peer_count == 0)
        .await?;

    let transcript = demo.shutdown().await;

    Ok(DemoReport {
        room_code,
        transcript,
    })
}
