mod config;
mod heartbeat;
#[cfg(feature = "native")]
pub mod runtime;
mod session;
mod session_builder;

pub use config::{JoinPolicy, SessionConfig};
pub use heartbeat::HeartbeatDriver;
#[cfg(feature = "native")]
pub use runtime::{RuntimeConfig, SessionCommand, SessionRuntime, SessionSnapshot};
pub use session::Session;
pub use session_builder::SessionBuilder;
