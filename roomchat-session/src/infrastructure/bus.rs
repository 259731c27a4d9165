use crate::infrastructure::error::Result;

/// A local broadcast primitive (allows swapping in test transports)
///
/// Every subscriber of a channel name receives every frame published on it
/// by another subscriber, with no ordering or exactly-once guarantee and no
/// replay for late subscribers.
pub trait MessageBus {
    type Channel: BusChannel;

    /// Open (and subscribe to) the named channel
    ///
    /// Fails with `BusError::Unsupported` when the primitive is missing.
    fn open(&self, name: &str) -> Result<Self::Channel>;
}

/// One open subscription to a named channel
pub trait BusChannel {
    fn name(&self) -> &str;

    /// Send raw bytes to every other subscriber of the channel
    fn post(&mut self, data: Vec<u8>) -> Result<()>;

    /// Take every payload received since the last call
    fn drain(&mut self) -> Vec<Vec<u8>>;

    /// Release the subscription (idempotent)
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}
