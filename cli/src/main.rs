mod commands;
mod console;
mod logging;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eqtrak_core::context::AppConfig;

use commands::TriggerEdit;

#[derive(Parser)]
#[command(version, about = "Tail EverQuest logs for kills, zones and triggers")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Single-run overrides; never written back to the config file
#[derive(Args)]
struct Overrides {
    /// Log directory to watch
    #[arg(long, global = true)]
    directory: Option<PathBuf>,
    /// Log filename prefix
    #[arg(long, global = true)]
    prefix: Option<String>,
    /// Poll interval in milliseconds
    #[arg(long, global = true)]
    poll_ms: Option<u64>,
    /// Respawn time for kills as M:SS
    #[arg(long, global = true)]
    respawn: Option<String>,
    #[arg(long, global = true)]
    no_timers: bool,
    #[arg(long, global = true)]
    voice: bool,
    #[arg(long, global = true)]
    overlays: bool,
    /// Trigger file to use instead of the configured one
    #[arg(long, global = true)]
    triggers_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tail the active log until Ctrl-C (default)
    Watch,
    /// Show matching log files and the one that would be tailed
    Source,
    /// Show the effective configuration
    Config,
    /// Persist a new log directory
    SetDirectory {
        #[arg(short, long)]
        path: String,
    },
    /// Inspect or edit the trigger file
    Triggers {
        #[command(subcommand)]
        command: TriggerCommands,
    },
}

#[derive(Subcommand)]
enum TriggerCommands {
    List,
    AddVoice {
        #[arg(short, long)]
        pattern: String,
        #[arg(short, long)]
        text: String,
    },
    RemoveVoice {
        #[arg(short, long)]
        pattern: String,
    },
    AddOverlay {
        #[arg(short, long)]
        pattern: String,
        #[arg(short, long)]
        message: String,
        /// Seconds or M:SS
        #[arg(short, long, default_value = "60")]
        duration: String,
    },
    RemoveOverlay {
        #[arg(short, long)]
        pattern: String,
    },
    AddProfile {
        #[arg(short, long)]
        identity: String,
    },
    RemoveProfile {
        #[arg(short, long)]
        identity: String,
    },
    Subscribe {
        #[arg(short, long)]
        identity: String,
        #[arg(short, long)]
        pattern: String,
    },
    Unsubscribe {
        #[arg(short, long)]
        identity: String,
        #[arg(short, long)]
        pattern: String,
    },
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.directory {
            config.log_directory = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.filename_prefix = prefix.clone();
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(respawn) = &self.respawn {
            config.respawn_override = Some(respawn.clone());
        }
        if self.no_timers {
            config.timers_enabled = false;
        }
        if self.voice {
            config.voice_enabled = true;
        }
        if self.overlays {
            config.overlays_enabled = true;
        }
        if let Some(path) = &self.triggers_file {
            config.triggers_file = Some(path.clone());
        }
    }
}

impl TriggerCommands {
    /// `None` for read-only commands
    fn into_edit(self) -> Option<TriggerEdit> {
        Some(match self {
            TriggerCommands::List => return None,
            TriggerCommands::AddVoice { pattern, text } => TriggerEdit::AddVoice { pattern, text },
            TriggerCommands::RemoveVoice { pattern } => TriggerEdit::RemoveVoice { pattern },
            TriggerCommands::AddOverlay {
                pattern,
                message,
                duration,
            } => TriggerEdit::AddOverlay {
                pattern,
                message,
                duration,
            },
            TriggerCommands::RemoveOverlay { pattern } => TriggerEdit::RemoveOverlay { pattern },
            TriggerCommands::AddProfile { identity } => TriggerEdit::AddProfile { identity },
            TriggerCommands::RemoveProfile { identity } => TriggerEdit::RemoveProfile { identity },
            TriggerCommands::Subscribe { identity, pattern } => {
                TriggerEdit::Subscribe { identity, pattern }
            }
            TriggerCommands::Unsubscribe { identity, pattern } => {
                TriggerEdit::Unsubscribe { identity, pattern }
            }
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // set-directory persists, so it works on the stored config only
    if let Some(Commands::SetDirectory { path }) = &cli.command {
        return commands::set_directory(&mut config, path);
    }

    cli.overrides.apply(&mut config);

    match cli.command {
        None | Some(Commands::Watch) => commands::watch(&config).await,
        Some(Commands::Source) => commands::show_source(&config),
        Some(Commands::Config) => commands::show_config(&config),
        Some(Commands::SetDirectory { .. }) => Ok(()),
        Some(Commands::Triggers { command }) => match command.into_edit() {
            None => commands::list_triggers(&config),
            Some(edit) => commands::edit_triggers(&config, edit),
        },
    }
}
