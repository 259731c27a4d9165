pub mod adapter;
pub mod bus;
pub mod error;
pub mod local_bus;

pub use adapter::BusAdapter;
pub use bus::{BusChannel, MessageBus};
pub use error::BusError;
pub use local_bus::{LocalBus, LocalChannel};
