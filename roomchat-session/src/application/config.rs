use instant::Duration;

/// How `join_room` decides whether a room exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    /// Refuse codes with no entry in the local room registry
    #[default]
    RegistryCheck,
    /// Open the channel anyway; report `RoomNotFound` only if no peer
    /// answers within `join_timeout`
    Optimistic,
}

/// Configuration for a room session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Channel name prefix (`"<prefix>-<CODE>"`)
    pub channel_prefix: String,

    /// Period between outgoing heartbeats
    pub heartbeat_interval: Duration,

    /// Silence after which a peer is evicted
    pub peer_timeout: Duration,

    /// Delay before the initial `join` announcement
    pub announce_delay: Duration,

    /// Upper bound on the `connecting` state
    pub join_timeout: Duration,

    pub join_policy: JoinPolicy,

    /// Room-code generation attempts before accepting a collision
    pub max_code_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_prefix: "p2p-chat".to_string(),
            heartbeat_interval: Duration::from_secs(3),
            peer_timeout: Duration::from_secs(10),
            announce_delay: Duration::from_millis(100),
            join_timeout: Duration::from_secs(5),
            join_policy: JoinPolicy::RegistryCheck,
            max_code_attempts: 16,
        }
    }
}

impl SessionConfig {
    pub fn new(channel_prefix: impl Into<String>) -> Self {
        Self {
            channel_prefix: channel_prefix.into(),
            ..Default::default()
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = timeout;
        self
    }

    pub fn with_announce_delay(mut self, delay: Duration) -> Self {
        self.announce_delay = delay;
        self
    }

    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    pub fn with_join_policy(mut self, policy: JoinPolicy) -> Self {
        self.join_policy = policy;
        self
    }

    pub fn with_max_code_attempts(mut self, attempts: usize) -> Self {
        self.max_code_attempts = attempts.max(1);
        self
    }
}
