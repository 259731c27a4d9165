mod session_runtime;

pub use session_runtime::{RuntimeConfig, SessionCommand, SessionRuntime, SessionSnapshot};
