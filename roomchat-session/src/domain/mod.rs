mod chat;
mod event;
mod role;
mod screen;

pub use chat::{ChatEntry, EntryKind};
pub use event::SessionEvent;
pub use role::Role;
pub use screen::Screen;
