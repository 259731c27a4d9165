use crate::application::{Session, SessionConfig};
use crate::infrastructure::MessageBus;
use roomchat_core::{Clock, RoomRegistry, SystemClock};
use std::sync::Arc;

/// Builder for [`Session`]
///
/// Defaults: `SessionConfig::default()`, the process-wide room registry and
/// the system clock.
pub struct SessionBuilder<B: MessageBus> {
    bus: B,
    config: SessionConfig,
    registry: Option<RoomRegistry>,
    clock: Option<Arc<dyn Clock>>,
}

impl<B: MessageBus> SessionBuilder<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            config: SessionConfig::default(),
            registry: None,
            clock: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific registry instead of the process-wide one
    pub fn registry(mut self, registry: RoomRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> Session<B> {
        let registry = self.registry.unwrap_or_else(RoomRegistry::global);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        tracing::debug!(
            "Building session (prefix {}, heartbeat {:?}, timeout {:?}, policy {:?})",
            self.config.channel_prefix,
            self.config.heartbeat_interval,
            self.config.peer_timeout,
            self.config.join_policy
        );

        Session::from_parts(self.config, self.bus, registry, clock)
    }
}
