use crate::application::command::{ConsoleCommand, HELP};
use crate::infrastructure::{CliError, Result};
use roomchat_session::{
    EntryKind, LocalBus, RoomRegistry, RuntimeConfig, SessionBuilder, SessionCommand,
    SessionConfig, SessionEvent, SessionRuntime, SessionSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of console output for an event of tab `tab` (1-based)
pub fn render_event(tab: usize, event: &SessionEvent) -> String {
    match event {
        SessionEvent::MessageReceived(entry) => {
            let time = entry.time_label();
            match entry.kind {
                EntryKind::Own => format!("[tab {}] {} you: {}", tab, time, entry.text),
                EntryKind::Other => format!("[tab {}] {} peer: {}", tab, time, entry.text),
                EntryKind::System => format!("[tab {}] {} * {}", tab, time, entry.text),
            }
        }
        SessionEvent::ScreenChanged(screen) => format!("[tab {}] screen: {}", tab, screen),
        SessionEvent::ConnectionStatusChanged(status) => {
            format!("[tab {}] status: {}", tab, status)
        }
        SessionEvent::ErrorRaised(message) => format!("[tab {}] ! {}", tab, message),
    }
}

fn describe(index: usize, active: bool, snapshot: &SessionSnapshot) -> String {
    let marker = if active { "*" } else { " " };
    match &snapshot.room_code {
        Some(code) => format!(
            "{} {}: room {} ({}, {}, {} peer(s))",
            marker,
            index + 1,
            code,
            snapshot.screen,
            snapshot.status,
            snapshot.peer_count
        ),
        None => format!("{} {}: {}", marker, index + 1, snapshot.screen),
    }
}

/// Interactive console: several tabs sharing one in-process bus
pub struct Console {
    bus: LocalBus,
    registry: RoomRegistry,
    config: SessionConfig,
    runtime_config: RuntimeConfig,
    tabs: Vec<SessionRuntime>,
    active: usize,
}

impl Console {
    pub fn new(config: SessionConfig, runtime_config: RuntimeConfig) -> Self {
        Self {
            bus: LocalBus::new(),
            registry: RoomRegistry::global(),
            config,
            runtime_config,
            tabs: Vec::new(),
            active: 0,
        }
    }

    /// Use a specific room registry instead of the process-wide one
    pub fn with_registry(mut self, registry: RoomRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Open a tab and make it active; returns its 0-based index
    ///
    /// Must be called inside a tokio runtime.
    pub fn open_tab(&mut self) -> usize {
        let session = SessionBuilder::new(self.bus.clone())
            .config(self.config.clone())
            .registry(self.registry.clone())
            .build();
        let mut runtime = SessionRuntime::spawn(session, self.runtime_config.clone());

        let index = self.tabs.len();
        if let Some(mut events) = runtime.take_events() {
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    println!("{}", render_event(index + 1, &event));
                }
            });
        }

        self.tabs.push(runtime);
        self.active = index;
        tracing::debug!("Opened tab {}", index + 1);
        index
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Active tab, 0-based
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn snapshot(&self, index: usize) -> Option<SessionSnapshot> {
        self.tabs.get(index).map(SessionRuntime::snapshot)
    }

    async fn submit(&self, cmd: SessionCommand) -> Result<()> {
        let runtime = self
            .tabs
            .get(self.active)
            .ok_or_else(|| CliError::InvalidCommand("no tab open; use /new".to_string()))?;
        runtime
            .submit(cmd)
            .await
            .map_err(|_| CliError::RuntimeStopped(self.active + 1))
    }

    /// Apply one command; returns `false` when the console should exit
    pub async fn execute(&mut self, command: ConsoleCommand) -> Result<bool> {
        match command {
            ConsoleCommand::NewTab => {
                let index = self.open_tab();
                println!("Opened tab {} (now active)", index + 1);
            }
            ConsoleCommand::SwitchTab(n) => {
                if n == 0 || n > self.tabs.len() {
                    return Err(CliError::InvalidCommand(format!(
                        "no tab {} (open tabs: {})",
                        n,
                        self.tabs.len()
                    )));
                }
                self.active = n - 1;
                println!("Switched to tab {}", n);
            }
            ConsoleCommand::ListTabs => {
                for (index, runtime) in self.tabs.iter().enumerate() {
                    println!(
                        "{}",
                        describe(index, index == self.active, &runtime.snapshot())
                    );
                }
            }
            ConsoleCommand::Create => self.submit(SessionCommand::CreateRoom).await?,
            ConsoleCommand::Join(code) => self.submit(SessionCommand::JoinRoom(code)).await?,
            ConsoleCommand::Leave => self.submit(SessionCommand::Leave).await?,
            ConsoleCommand::Say(text) => self.submit(SessionCommand::Send(text)).await?,
            ConsoleCommand::Copy => {
                let code = self
                    .snapshot(self.active)
                    .and_then(|snapshot| snapshot.room_code)
                    .ok_or_else(|| CliError::InvalidCommand("not in a room".to_string()))?;
                println!("Room code: {}", code);
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Leave every room and stop all tabs
    pub async fn shutdown(&mut self) {
        for runtime in self.tabs.drain(..) {
            runtime.shutdown().await;
        }
        self.active = 0;
    }

    /// Read commands from stdin until `/quit`, EOF or Ctrl+C
    pub async fn run(mut self, tabs: usize) -> Result<()> {
        for _ in 0..tabs.max(1) {
            self.open_tab();
        }
        self.active = 0;

        println!("roomchat: {} tab(s) on one local bus", self.tabs.len());
        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let keep_running = match ConsoleCommand::parse(&line) {
                        Ok(Some(command)) => self.execute(command).await,
                        Ok(None) => Ok(true),
                        Err(e) => Err(e),
                    };
                    match keep_running {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => println!("! {}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
        }

        self.shutdown().await;
        println!("Bye");
        Ok(())
    }
}
