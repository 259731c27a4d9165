pub mod command;
pub mod console;
pub mod demo;
pub mod settings;

pub use command::ConsoleCommand;
pub use console::{render_event, Console};
pub use demo::{run_demo, DemoReport, TranscriptLine};
pub use settings::SessionArgs;
