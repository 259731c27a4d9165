use clap::{Parser, Subcommand};
use roomchat_cli::application::{render_event, run_demo};
use roomchat_cli::{Console, LogConfig, Result, SessionArgs};
use roomchat_session::RuntimeConfig;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "roomchat")]
#[command(
    version,
    about = "Roomchat - room-code chat between sessions sharing one local bus"
)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<tracing::Level>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Session poll interval in milliseconds
    #[arg(long, default_value_t = 50, global = true)]
    poll_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console with several tabs on one bus (default)
    Interactive {
        /// Tabs to open at start
        #[arg(short = 't', long, default_value_t = 2)]
        tabs: usize,
    },

    /// Scripted scenario: create, join, chat, leave
    Demo {
        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Interactive { tabs: 2 });

    let mut log_config = match command {
        Commands::Interactive { .. } => LogConfig::quiet(),
        Commands::Demo { .. } => LogConfig::default(),
    };
    if let Some(level) = cli.log_level {
        log_config = log_config.with_level(level);
    }
    if cli.json_logs {
        log_config = log_config.json();
    }
    log_config.init()?;

    let config = cli.session.session_config()?;
    let runtime_config =
        RuntimeConfig::default().with_poll_interval(Duration::from_millis(cli.poll_ms.max(1)));

    match command {
        Commands::Interactive { tabs } => {
            Console::new(config, runtime_config).run(tabs).await?;
        }
        Commands::Demo { json } => {
            let report = run_demo(config, runtime_config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                info!("Demo finished in room {}", report.room_code);
                for line in &report.transcript {
                    println!("{}", render_event(line.tab, &line.event));
                }
            }
        }
    }

    Ok(())
}
