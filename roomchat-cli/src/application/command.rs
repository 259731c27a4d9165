use crate::infrastructure::{CliError, Result};

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Open another tab on the same bus
    NewTab,
    /// Switch the active tab (1-based)
    SwitchTab(usize),
    ListTabs,
    Create,
    /// Join by code, normalized to upper case
    Join(String),
    Leave,
    /// Print the active room code
    Copy,
    Help,
    Quit,
    /// Plain text is a chat message
    Say(String),
}

pub const HELP: &str = "\
Commands:
  /create         create a room in the active tab
  /join CODE      join a room by its 6-character code
  /leave          leave the current room
  /copy           print the current room code
  /new            open another tab
  /tab N          switch to tab N
  /tabs           list tabs
  /help           show this help
  /quit           leave every room and exit
Anything else is sent as a chat message.";

impl ConsoleCommand {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(ConsoleCommand::Say(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next();

        let command = match (name.as_str(), arg) {
            ("new", None) => ConsoleCommand::NewTab,
            ("tabs", None) => ConsoleCommand::ListTabs,
            ("tab", Some(n)) => {
                let index = n
                    .parse::<usize>()
                    .map_err(|_| CliError::InvalidCommand(format!("not a tab number: {}", n)))?;
                ConsoleCommand::SwitchTab(index)
            }
            ("create", None) => ConsoleCommand::Create,
            ("join", Some(code)) => ConsoleCommand::Join(code.to_uppercase()),
            ("join", None) => {
                return Err(CliError::InvalidCommand(
                    "usage: /join CODE".to_string(),
                ))
            }
            ("leave", None) => ConsoleCommand::Leave,
            ("copy", None) => ConsoleCommand::Copy,
            ("help", None) => ConsoleCommand::Help,
            ("quit" | "exit", None) => ConsoleCommand::Quit,
            _ => return Err(CliError::InvalidCommand(line.to_string())),
        };

        if parts.next().is_some() {
            return Err(CliError::InvalidCommand(line.to_string()));
        }

        Ok(Some(command))
    }
}
