use crate::application::{HeartbeatDriver, JoinPolicy, SessionConfig};
use crate::domain::{ChatEntry, EntryKind, Role, Screen, SessionEvent};
use crate::error::{Result, SessionError};
use crate::infrastructure::{BusAdapter, MessageBus};
use instant::Instant;
use roomchat_core::{
    Clock, ConnectionStatus, Frame, PeerId, PresenceChange, PresenceTracker, RoomCode,
    RoomRegistry,
};
use std::collections::HashSet;
use std::sync::Arc;

const NOTICE_JOINED: &str = "Joined room";
const NOTICE_PEER_CONNECTED: &str = "Peer connected";
const NOTICE_PEER_LEFT: &str = "Peer disconnected";
const NOTICE_PEER_TIMED_OUT: &str = "Peer timed out";
const NOTICE_NOT_CONNECTED: &str = "Not connected";
const NOTICE_UNSUPPORTED: &str = "Multi-tab communication is not supported here";

/// Resources owned while the session is inside a room
struct ActiveRoom<C: crate::infrastructure::BusChannel> {
    identity: PeerId,
    code: RoomCode,
    role: Role,
    adapter: BusAdapter<C>,
    tracker: PresenceTracker,
    heartbeat: HeartbeatDriver,
    /// When the initial `join` announcement is due
    announce_at: Option<Instant>,
    /// Identities whose `join` we already answered
    greeted: HashSet<PeerId>,
}

/// UI-visible effect of one inbound frame, applied after presence handling
enum FrameEffect {
    None,
    PeerJoined,
    PeerLeft,
    Chat(ChatEntry),
}

/// Session orchestrator: one execution context's participation in a room
///
/// Single-threaded and poll-driven. Every state change happens inside a
/// direct call (`create_room`, `join_room`, `send`, `leave`) or inside
/// [`Session::poll`], which handles inbound frames and timers to
/// completion before returning. UI notifications are queued and drained
/// with [`Session::drain_events`].
///
/// Dropping a session that is still in a room performs a best-effort
/// teardown (leave frame, registry cleanup) without UI events.
pub struct Session<B: MessageBus> {
    config: SessionConfig,
    bus: B,
    registry: RoomRegistry,
    clock: Arc<dyn Clock>,
    room: Option<ActiveRoom<B::Channel>>,
    screen: Screen,
    status: ConnectionStatus,
    messages: Vec<ChatEntry>,
    events: Vec<SessionEvent>,
}

impl<B: MessageBus> Session<B> {
    pub(crate) fn from_parts(
        config: SessionConfig,
        bus: B,
        registry: RoomRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            bus,
            registry,
            clock,
            room: None,
            screen: Screen::Welcome,
            status: ConnectionStatus::Disconnected,
            messages: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Create a new room and enter it as initiator
    ///
    /// Leaves the current room first, if any.
    pub fn create_room(&mut self) -> Result<RoomCode> {
        self.leave();

        let code = self.fresh_room_code();
        let identity = PeerId::generate();

        self.enter_room(code.clone(), identity, Role::Initiator)?;
        self.set_screen(Screen::RoomCreated);

        tracing::info!("Room created: {} (peer {})", code, self.identity_str());
        Ok(code)
    }

    /// Join an existing room by code
    pub fn join_room(&mut self, code: &str) -> Result<()> {
        let code = match RoomCode::parse(code) {
            Ok(code) => code,
            Err(e) => {
                tracing::debug!("Rejected room code {:?}", code);
                self.raise_error("Please enter a valid 6-character room code");
                return Err(e.into());
            }
        };

        if self.config.join_policy == JoinPolicy::RegistryCheck && !self.registry.exists(&code) {
            tracing::info!("Room {} not found in local registry", code);
            self.raise_error(format!(
                "Room {} not found. Check the code and that the room is open in another tab.",
                code
            ));
            return Err(SessionError::RoomNotFound(code));
        }

        self.leave();

        let identity = PeerId::generate();
        self.enter_room(code.clone(), identity, Role::Joiner)?;
        self.set_screen(Screen::Chat);
        self.push_entry(ChatEntry::system(NOTICE_JOINED));

        tracing::info!("Joined room: {} (peer {})", code, self.identity_str());
        Ok(())
    }

    /// Send a chat message to the room
    ///
    /// Text that is empty after trimming is ignored.
    pub fn send(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let Some(room) = self.room.as_mut() else {
            self.raise_error(NOTICE_NOT_CONNECTED);
            return Err(SessionError::NoActiveChannel);
        };

        let frame = Frame::message(room.identity.clone(), text);
        room.adapter.publish(&frame);

        if let Frame::Message {
            text, timestamp, ..
        } = frame
        {
            self.push_entry(ChatEntry::new(EntryKind::Own, text, timestamp));
        }
        Ok(())
    }

    /// Leave the current room (no-op when not in one)
    pub fn leave(&mut self) {
        let Some(room) = self.room.take() else {
            return;
        };

        tracing::info!("Leaving room {}", room.code);
        self.teardown(room);

        self.messages.clear();
        self.set_status(ConnectionStatus::Disconnected);
        self.set_screen(Screen::Welcome);
    }

    /// Handle all inbound frames and due timers
    ///
    /// Returns the number of frames handled.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();

        let frames = match self.room.as_mut() {
            Some(room) => room.adapter.poll(),
            None => return 0,
        };

        let handled = frames.len();
        for frame in frames {
            self.handle_frame(frame, now);
        }

        self.tick(now);
        handled
    }

    /// Take every queued UI event
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn handle_frame(&mut self, frame: Frame, now: Instant) {
        let Some(room) = self.room.as_mut() else {
            return;
        };

        let change = room.tracker.observe(&frame, now);

        let effect = match (frame, change) {
            // Chat text is delivered even from a peer that already left
            (Frame::Message {
                sender_id,
                text,
                timestamp,
            }, _) if sender_id != room.identity => {
                FrameEffect::Chat(ChatEntry::new(EntryKind::Other, text, timestamp))
            }
            (_, PresenceChange::Ignored) => FrameEffect::None,
            (Frame::Join { sender_id, .. }, _) => {
                if room.greeted.insert(sender_id.clone()) {
                    tracing::info!("Peer {} joined room {}", sender_id, room.code);
                    room.adapter
                        .publish(&Frame::join_response(room.identity.clone()));
                    FrameEffect::PeerJoined
                } else {
                    FrameEffect::None
                }
            }
            (Frame::Leave { sender_id, .. }, PresenceChange::Left(_)) => {
                tracing::info!("Peer {} left room {}", sender_id, room.code);
                FrameEffect::PeerLeft
            }
            _ => FrameEffect::None,
        };

        match effect {
            FrameEffect::None => {}
            FrameEffect::PeerJoined => {
                self.push_entry(ChatEntry::system(NOTICE_PEER_CONNECTED));
                if self.screen == Screen::RoomCreated {
                    self.set_screen(Screen::Chat);
                }
            }
            FrameEffect::PeerLeft => self.push_entry(ChatEntry::system(NOTICE_PEER_LEFT)),
            FrameEffect::Chat(entry) => self.push_entry(entry),
        }

        self.sync_status();
    }

    /// Timers: delayed announcement, heartbeat, liveness eviction, join timeout
    fn tick(&mut self, now: Instant) {
        let Some(room) = self.room.as_mut() else {
            return;
        };

        if room.announce_at.is_some_and(|due| now >= due) {
            room.announce_at = None;
            room.adapter.publish(&Frame::join(room.identity.clone()));
        }

        if room.heartbeat.poll(now) {
            room.adapter
                .publish(&Frame::heartbeat(room.identity.clone()));
        }

        let evicted = room.tracker.expire(now);
        let join_expired = room.tracker.expire_join(now);
        let role = room.role;
        let code = room.code.clone();

        for _ in &evicted {
            self.push_entry(ChatEntry::system(NOTICE_PEER_TIMED_OUT));
        }

        if join_expired {
            if role == Role::Joiner && self.config.join_policy == JoinPolicy::Optimistic {
                tracing::info!("No peer answered in room {}; giving up", code);
                self.leave();
                self.raise_error(format!("Room {} not found", code));
                return;
            }
            tracing::info!("No peers in room {} yet", code);
        }

        self.sync_status();
    }

    fn enter_room(&mut self, code: RoomCode, identity: PeerId, role: Role) -> Result<()> {
        let channel_name = code.channel_name(&self.config.channel_prefix);
        let adapter = match BusAdapter::open(&self.bus, &channel_name) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::error!("Cannot open channel {}: {}", channel_name, e);
                self.raise_error(NOTICE_UNSUPPORTED);
                return Err(SessionError::unsupported(e));
            }
        };

        self.registry.register(&code, &identity);

        let now = self.clock.now();
        let mut tracker = PresenceTracker::new(identity.clone(), self.config.peer_timeout);
        tracker.begin_join(now + self.config.join_timeout);

        let mut heartbeat = HeartbeatDriver::new(self.config.heartbeat_interval);
        heartbeat.start(now);

        self.room = Some(ActiveRoom {
            identity,
            code,
            role,
            adapter,
            tracker,
            heartbeat,
            announce_at: Some(now + self.config.announce_delay),
            greeted: HashSet::new(),
        });
        self.sync_status();
        Ok(())
    }

    /// Release everything a room owns: leave frame, heartbeat, channel, registry
    fn teardown(&self, mut room: ActiveRoom<B::Channel>) {
        room.heartbeat.stop();
        room.adapter.publish(&Frame::leave(room.identity.clone()));
        room.adapter.close();
        self.registry.unregister(&room.code, &room.identity);
    }

    fn fresh_room_code(&self) -> RoomCode {
        let mut code = RoomCode::generate();
        for _ in 1..self.config.max_code_attempts {
            if !self.registry.exists(&code) {
                break;
            }
            tracing::debug!("Room code {} already in use, regenerating", code);
            code = RoomCode::generate();
        }
        code
    }

    fn sync_status(&mut self) {
        let status = self
            .room
            .as_ref()
            .map_or(ConnectionStatus::Disconnected, |room| room.tracker.status());
        self.set_status(status);
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            tracing::debug!("Connection status: {} → {}", self.status, status);
            self.status = status;
            self.events
                .push(SessionEvent::ConnectionStatusChanged(status));
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.events.push(SessionEvent::ScreenChanged(screen));
        }
    }

    fn push_entry(&mut self, entry: ChatEntry) {
        self.messages.push(entry.clone());
        self.events.push(SessionEvent::MessageReceived(entry));
    }

    fn raise_error(&mut self, message: impl Into<String>) {
        self.events.push(SessionEvent::ErrorRaised(message.into()));
    }

    fn identity_str(&self) -> String {
        self.room
            .as_ref()
            .map(|room| room.identity.to_string())
            .unwrap_or_default()
    }

    pub fn room_code(&self) -> Option<&RoomCode> {
        self.room.as_ref().map(|room| &room.code)
    }

    pub fn identity(&self) -> Option<&PeerId> {
        self.room.as_ref().map(|room| &room.identity)
    }

    pub fn role(&self) -> Option<Role> {
        self.room.as_ref().map(|room| room.role)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn messages(&self) -> &[ChatEntry] {
        &self.messages
    }

    pub fn peer_count(&self) -> usize {
        self.room
            .as_ref()
            .map_or(0, |room| room.tracker.peer_count())
    }

    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self
            .room
            .as_ref()
            .map(|room| room.tracker.peers().map(|p| p.id.clone()).collect())
            .unwrap_or_default();
        peers.sort();
        peers
    }

    pub fn is_active(&self) -> bool {
        self.room.is_some()
    }

    pub fn heartbeats_sent(&self) -> u64 {
        self.room.as_ref().map_or(0, |room| room.heartbeat.beats())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }
}

impl<B: MessageBus> Drop for Session<B> {
    fn drop(&mut self) {
        if let Some(room) = self.room.take() {
            tracing::debug!("Session dropped inside room {}; tearing down", room.code);
            self.teardown(room);
        }
    }
}
