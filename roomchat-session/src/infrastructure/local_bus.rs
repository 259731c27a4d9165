use crate::infrastructure::bus::{BusChannel, MessageBus};
use crate::infrastructure::error::{BusError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// One subscriber's delivery endpoint
struct Subscriber {
    id: u64,
    inbox: mpsc::UnboundedSender<Vec<u8>>,
}

/// Shared bus state (all channels of one process)
#[derive(Default)]
struct BusState {
    channels: HashMap<String, Vec<Subscriber>>,
    next_id: u64,
}

/// In-process broadcast bus, the local equivalent of a same-origin
/// broadcast channel shared by every context in the process
///
/// Cloning yields another handle onto the same bus.
#[derive(Clone)]
pub struct LocalBus {
    /// `None` models a platform without the broadcast primitive
    state: Option<Arc<Mutex<BusState>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self {
            state: Some(Arc::new(Mutex::new(BusState::default()))),
        }
    }

    /// A bus whose `open` always fails with `BusError::Unsupported`
    pub fn unavailable() -> Self {
        Self { state: None }
    }

    /// Number of live subscribers on a channel
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.state
            .as_ref()
            .map(|state| {
                lock(state)
                    .channels
                    .get(name)
                    .map_or(0, |subscribers| subscribers.len())
            })
            .unwrap_or(0)
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBus")
            .field("available", &self.state.is_some())
            .finish()
    }
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MessageBus for LocalBus {
    type Channel = LocalChannel;

    fn open(&self, name: &str) -> Result<LocalChannel> {
        let state = self.state.as_ref().ok_or(BusError::Unsupported)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let id = {
            let mut guard = lock(state);
            let id = guard.next_id;
            guard.next_id += 1;
            guard
                .channels
                .entry(name.to_string())
                .or_default()
                .push(Subscriber { id, inbox: tx });
            id
        };

        tracing::debug!("Bus: subscriber {} opened channel {}", id, name);

        Ok(LocalChannel {
            name: name.to_string(),
            id,
            state: Arc::clone(state),
            inbox: rx,
            closed: false,
        })
    }
}

/// Subscription to one channel of a [`LocalBus`]
///
/// Dropping the channel closes it.
pub struct LocalChannel {
    name: String,
    id: u64,
    state: Arc<Mutex<BusState>>,
    inbox: mpsc::UnboundedReceiver<Vec<u8>>,
    closed: bool,
}

impl BusChannel for LocalChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn post(&mut self, data: Vec<u8>) -> Result<()> {
        if self.closed {
            return Err(BusError::ChannelClosed);
        }

        let mut state = lock(&self.state);
        let Some(subscribers) = state.channels.get_mut(&self.name) else {
            return Ok(());
        };

        // Never deliver to ourselves; prune receivers that went away
        subscribers.retain(|subscriber| {
            subscriber.id == self.id || subscriber.inbox.send(data.clone()).is_ok()
        });

        tracing::trace!(
            "Bus: {} bytes on {} from subscriber {} ({} subscribers)",
            data.len(),
            self.name,
            self.id,
            subscribers.len()
        );

        Ok(())
    }

    fn drain(&mut self) -> Vec<Vec<u8>> {
        let mut received = Vec::new();
        while let Ok(data) = self.inbox.try_recv() {
            received.push(data);
        }
        received
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.inbox.close();

        let mut state = lock(&self.state);
        if let Some(subscribers) = state.channels.get_mut(&self.name) {
            subscribers.retain(|subscriber| subscriber.id != self.id);
            if subscribers.is_empty() {
                state.channels.remove(&self.name);
            }
        }

        tracing::debug!("Bus: subscriber {} closed channel {}", self.id, self.name);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for LocalChannel {
    fn drop(&mut self) {
        self.close();
    }
}
