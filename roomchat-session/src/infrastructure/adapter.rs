use crate::infrastructure::bus::{BusChannel, MessageBus};
use crate::infrastructure::error::{BusError, Result};
use roomchat_core::Frame;

/// Frame-level wrapper around one room's channel
///
/// Publishing is fire-and-forget: failures are logged and counted, never
/// returned, so a lost frame cannot interrupt the session. Inbound payloads
/// that do not decode as a [`Frame`] are dropped with a warning.
pub struct BusAdapter<C: BusChannel> {
    channel: C,
    published: u64,
    publish_failures: u64,
}

impl<C: BusChannel> BusAdapter<C> {
    /// Open the named channel on `bus`
    pub fn open<B>(bus: &B, channel_name: &str) -> Result<Self>
    where
        B: MessageBus<Channel = C>,
    {
        let channel = bus.open(channel_name)?;
        tracing::info!("Bus channel opened: {}", channel_name);
        Ok(Self::new(channel))
    }

    pub fn new(channel: C) -> Self {
        Self {
            channel,
            published: 0,
            publish_failures: 0,
        }
    }

    /// Publish a frame; failures are swallowed
    pub fn publish(&mut self, frame: &Frame) {
        match self.try_publish(frame) {
            Ok(()) => {
                self.published += 1;
                tracing::debug!(
                    "📤 {} on {} from {}",
                    frame.kind(),
                    self.channel.name(),
                    frame.sender_id()
                );
            }
            Err(e) => {
                self.publish_failures += 1;
                tracing::warn!(
                    "Failed to publish {} on {}: {}",
                    frame.kind(),
                    self.channel.name(),
                    e
                );
            }
        }
    }

    fn try_publish(&mut self, frame: &Frame) -> Result<()> {
        let data = serde_json::to_vec(frame).map_err(BusError::Serialization)?;
        self.channel.post(data)
    }

    /// Decode every frame received since the last poll, in arrival order
    pub fn poll(&mut self) -> Vec<Frame> {
        self.channel
            .drain()
            .into_iter()
            .filter_map(|data| match serde_json::from_slice::<Frame>(&data) {
                Ok(frame) => {
                    tracing::debug!(
                        "📥 {} on {} from {}",
                        frame.kind(),
                        self.channel.name(),
                        frame.sender_id()
                    );
                    Some(frame)
                }
                Err(e) => {
                    tracing::warn!(
                        "Dropping malformed frame on {} ({} bytes): {}",
                        self.channel.name(),
                        data.len(),
                        e
                    );
                    None
                }
            })
            .collect()
    }

    /// Close the underlying channel (idempotent)
    pub fn close(&mut self) {
        if !self.channel.is_closed() {
            self.channel.close();
            tracing::info!("Bus channel closed: {}", self.channel.name());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// Frames handed to the channel successfully
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Frames lost to publish failures
    pub fn publish_failures(&self) -> u64 {
        self.publish_failures
    }
}
