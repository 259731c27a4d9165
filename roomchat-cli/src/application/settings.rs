use crate::infrastructure::{CliError, Result};
use clap::Args;
use roomchat_session::{JoinPolicy, SessionConfig};
use std::time::Duration;

/// Session tuning flags shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Channel name prefix (channels are named "<prefix>-<CODE>")
    #[arg(long, default_value = "p2p-chat", global = true)]
    pub prefix: String,

    /// Heartbeat period in milliseconds
    #[arg(long, default_value_t = 3_000, global = true)]
    pub heartbeat_ms: u64,

    /// Silence after which a peer is dropped, in milliseconds
    #[arg(long, default_value_t = 10_000, global = true)]
    pub peer_timeout_ms: u64,

    /// How long a join may stay in "connecting", in milliseconds
    #[arg(long, default_value_t = 5_000, global = true)]
    pub join_timeout_ms: u64,

    /// Join unknown codes anyway and wait for a peer to answer
    #[arg(long, global = true)]
    pub optimistic_join: bool,
}

impl SessionArgs {
    pub fn session_config(&self) -> Result<SessionConfig> {
        if self.prefix.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "channel prefix must not be empty".to_string(),
            ));
        }
        if self.heartbeat_ms == 0 {
            return Err(CliError::InvalidConfig(
                "heartbeat period must be positive".to_string(),
            ));
        }
        if self.peer_timeout_ms <= self.heartbeat_ms {
            return Err(CliError::InvalidConfig(format!(
                "peer timeout ({} ms) must exceed the heartbeat period ({} ms)",
                self.peer_timeout_ms, self.heartbeat_ms
            )));
        }

        let policy = if self.optimistic_join {
            JoinPolicy::Optimistic
        } else {
            JoinPolicy::RegistryCheck
        };

        Ok(SessionConfig::new(self.prefix.trim())
            .with_heartbeat_interval(Duration::from_millis(self.heartbeat_ms))
            .with_peer_timeout(Duration::from_millis(self.peer_timeout_ms))
            .with_join_timeout(Duration::from_millis(self.join_timeout_ms))
            .with_join_policy(policy))
    }
}
