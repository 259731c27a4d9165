pub mod application;
pub mod infrastructure;

pub use application::{Console, ConsoleCommand, DemoReport, SessionArgs};
pub use infrastructure::{CliError, LogConfig, Result};
