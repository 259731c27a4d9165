#![allow(dead_code)]

pub mod flaky_bus;

use roomchat_core::ManualClock;
use roomchat_session::{
    LocalBus, MessageBus, Session, SessionBuilder, SessionConfig, SessionEvent,
};
use roomchat_session::{RoomCode, RoomRegistry};
use std::time::Duration;

/// Several "tabs" of one process: shared bus, shared registry, one clock
pub struct TabsFixture<B: MessageBus + Clone = LocalBus> {
    pub bus: B,
    pub registry: RoomRegistry,
    pub clock: ManualClock,
    pub config: SessionConfig,
    pub tabs: Vec<Session<B>>,
}

impl TabsFixture<LocalBus> {
    /// `count` tabs on a fresh local bus with default timings
    pub fn new(count: usize) -> Self {
        Self::with_config(count, SessionConfig::default())
    }

    pub fn with_config(count: usize, config: SessionConfig) -> Self {
        Self::with_bus(LocalBus::new(), count, config)
    }
}

impl<B: MessageBus + Clone> TabsFixture<B> {
    pub fn with_bus(bus: B, count: usize, config: SessionConfig) -> Self {
        let mut fixture = Self {
            bus,
            registry: RoomRegistry::new(),
            clock: ManualClock::new(),
            config,
            tabs: Vec::new(),
        };
        for _ in 0..count {
            fixture.open_tab();
        }
        fixture
    }

    /// Open one more tab; returns its index
    pub fn open_tab(&mut self) -> usize {
        let session = SessionBuilder::new(self.bus.clone())
            .config(self.config.clone())
            .registry(self.registry.clone())
            .clock(self.clock.clone())
            .build();
        self.tabs.push(session);
        self.tabs.len() - 1
    }

    pub fn tab(&mut self, index: usize) -> &mut Session<B> {
        &mut self.tabs[index]
    }

    /// Poll every tab once, in order
    pub fn poll_all(&mut self) {
        for tab in self.tabs.iter_mut() {
            tab.poll();
        }
    }

    /// Poll every tab `count` times without moving time
    pub fn tick(&mut self, count: usize) {
        for _ in 0..count {
            self.poll_all();
        }
    }

    /// Move time forward in `step`s up to `total`, polling every tab at each step
    pub fn advance(&mut self, total: Duration, step: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            self.clock.advance(step);
            elapsed += step;
            self.tick(2);
        }
    }

    /// Let the delayed join announcement fire and its replies settle
    pub fn settle(&mut self) {
        self.advance(self.config.announce_delay, self.config.announce_delay);
        self.tick(3);
    }

    /// Tab 0 creates a room, the rest join it
    pub fn connect_all(&mut self) -> RoomCode {
        let code = self.tabs[0].create_room().unwrap();
        for i in 1..self.tabs.len() {
            self.tabs[i].join_room(code.as_str()).unwrap();
        }
        self.settle();
        code
    }

    pub fn drain_all(&mut self) {
        for tab in self.tabs.iter_mut() {
            tab.drain_events();
        }
    }

    pub fn texts(&self, index: usize) -> Vec<String> {
        self.tabs[index]
            .messages()
            .iter()
            .map(|entry| entry.text.clone())
            .collect()
    }
}

/// Error notices among a batch of events
pub fn errors(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::ErrorRaised(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
