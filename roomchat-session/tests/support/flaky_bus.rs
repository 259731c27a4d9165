use roomchat_session::infrastructure::{BusChannel, BusError, LocalBus, LocalChannel, MessageBus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bus whose publishes can be made to fail while delivery keeps working
#[derive(Clone)]
pub struct FlakyBus {
    inner: LocalBus,
    failing: Arc<AtomicBool>,
}

impl FlakyBus {
    pub fn new(inner: LocalBus) -> Self {
        Self {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MessageBus for FlakyBus {
    type Channel = FlakyChannel;

    fn open(&self, name: &str) -> Result<FlakyChannel, BusError> {
        Ok(FlakyChannel {
            inner: self.inner.open(name)?,
            failing: Arc::clone(&self.failing),
        })
    }
}

pub struct FlakyChannel {
    inner: LocalChannel,
    failing: Arc<AtomicBool>,
}

impl BusChannel for FlakyChannel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn post(&mut self, data: Vec<u8>) -> Result<(), BusError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BusError::Delivery("injected failure".to_string()));
        }
        self.inner.post(data)
    }

    fn drain(&mut self) -> Vec<Vec<u8>> {
        self.inner.drain()
    }

    fn close(&mut self) {
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
