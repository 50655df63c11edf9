use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eqtrak_core::context::{AppConfig, DirectoryIndex, TailSession, select_active_source};
use eqtrak_core::handlers::{CommandSpeech, LogSpeech, OverlayBars, TimerBoard, VoiceAlerts};
use eqtrak_core::tracking::{TriggerConfigExt, load_triggers, save_triggers};
use eqtrak_types::TriggerConfig;
use eqtrak_types::formatting::format_duration;
use tokio::time::MissedTickBehavior;

use crate::console::ConsolePrinter;

/// Speech requests allowed to wait behind the one being spoken
const SPEECH_QUEUE_DEPTH: usize = 2;
/// Print the timer board every N ticks even when nothing happened
const STATUS_EVERY_TICKS: u64 = 10;
const MIN_POLL_INTERVAL_MS: u64 = 50;

pub async fn watch(config: &AppConfig) -> Result<(), String> {
    let triggers = load_trigger_config(config)?;

    let mut session = TailSession::new(config.session_config());
    session.set_triggers(triggers.resolve());
    session.set_respawn_override(config.respawn_override.clone());

    let timers = TimerBoard::new();
    timers.set_enabled(config.timers_enabled);
    session.register(Box::new(timers.clone()));

    let overlays = OverlayBars::new(config.overlays_enabled);
    session.register(Box::new(overlays.clone()));

    let spawned = match config.speech_command.as_deref().and_then(CommandSpeech::new) {
        Some(backend) => VoiceAlerts::spawn(backend, SPEECH_QUEUE_DEPTH, config.voice_enabled),
        None => VoiceAlerts::spawn(LogSpeech, SPEECH_QUEUE_DEPTH, config.voice_enabled),
    };
    let (voice, speech_worker) =
        spawned.map_err(|e| format!("Failed to start speech worker: {e}"))?;
    session.register(Box::new(voice));

    session.register(Box::new(ConsolePrinter));

    println!(
        "Watching {} for {}* files (Ctrl-C to stop)",
        config.log_directory.display(),
        config.filename_prefix
    );

    let poll = Duration::from_millis(config.poll_interval_ms.max(MIN_POLL_INTERVAL_MS));
    let mut interval = tokio::time::interval(poll);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            _ = interval.tick() => {
                let report = session.tick();
                ticks += 1;
                if !report.events.is_empty() || ticks % STATUS_EVERY_TICKS == 0 {
                    print_status(&timers, &overlays);
                }
            }
        }
    }

    session.close();
    // Dropping the session drops the registered speech handle, which stops the worker
    drop(session);
    if speech_worker.join().is_err() {
        tracing::warn!("Speech worker panicked");
    }
    println!("Stopped");
    Ok(())
}

fn print_status(timers: &TimerBoard, overlays: &OverlayBars) {
    let now = Instant::now();
    let entries = timers.snapshot(now);
    let bars = overlays.snapshot(now);
    if entries.is_empty() && bars.is_empty() {
        return;
    }

    println!("-- {} --", timers.header());
    for entry in &entries {
        println!("  {}", entry.label);
    }
    for bar in &bars {
        println!("  [{:>3.0}%] {}", bar.progress * 100.0, bar.label);
    }
}

pub fn show_source(config: &AppConfig) -> Result<(), String> {
    let index = match DirectoryIndex::scan(&config.log_directory, &config.filename_prefix) {
        Ok(index) => index,
        Err(e) => {
            println!("No log source: {e}");
            return Ok(());
        }
    };

    for entry in index.entries() {
        println!("  {:<16} {}", entry.character_name, entry.filename);
    }

    match select_active_source(&config.log_directory, &config.filename_prefix) {
        Ok(source) => println!("Active: {} ({})", source.label, source.path().display()),
        Err(e) => println!("No log source: {e}"),
    }
    Ok(())
}

pub fn show_config(config: &AppConfig) -> Result<(), String> {
    match AppConfig::config_path() {
        Ok(path) => println!("Config file:      {}", path.display()),
        Err(e) => println!("Config file:      unavailable ({e})"),
    }
    if let Some(path) = config.triggers_path() {
        println!("Trigger file:     {}", path.display());
    }
    println!("Log directory:    {}", config.log_directory.display());
    println!("Filename prefix:  {}", config.filename_prefix);
    println!("Poll interval:    {} ms", config.poll_interval_ms);
    println!("Reselect every:   {} polls", config.reselect_every);
    println!(
        "Respawn override: {}",
        config.respawn_override.as_deref().unwrap_or("(zone default)")
    );
    println!("Timers enabled:   {}", config.timers_enabled);
    println!("Voice enabled:    {}", config.voice_enabled);
    println!("Overlays enabled: {}", config.overlays_enabled);
    if let Some(argv) = &config.speech_command {
        println!("Speech command:   {}", argv.join(" "));
    }
    Ok(())
}

pub fn set_directory(config: &mut AppConfig, path: &str) -> Result<(), String> {
    config
        .set_log_directory(Path::new(path))
        .map_err(|e| format!("Cannot use {path} as the log directory: {e}"))?;
    config.save().map_err(|e| e.to_string())?;
    println!("Log directory set to {}", config.log_directory.display());
    Ok(())
}

#[derive(Debug, Clone)]
pub enum TriggerEdit {
    AddVoice { pattern: String, text: String },
    RemoveVoice { pattern: String },
    AddOverlay {
        pattern: String,
        message: String,
        duration: String,
    },
    RemoveOverlay { pattern: String },
    AddProfile { identity: String },
    RemoveProfile { identity: String },
    Subscribe { identity: String, pattern: String },
    Unsubscribe { identity: String, pattern: String },
}

pub fn list_triggers(config: &AppConfig) -> Result<(), String> {
    let triggers = load_trigger_config(config)?;

    println!("Voice triggers:");
    for voice in &triggers.voice {
        println!("  {:?} -> {:?}", voice.pattern, voice.text);
    }
    println!("Overlays:");
    for overlay in &triggers.overlays {
        println!(
            "  {:?} -> {} ({})",
            overlay.pattern,
            overlay.message,
            format_duration(u64::from(overlay.duration_secs))
        );
    }
    println!("Profiles:");
    for profile in &triggers.profiles {
        println!("  {}: {}", profile.identity, profile.overlays.join(", "));
    }
    Ok(())
}

pub fn edit_triggers(config: &AppConfig, edit: TriggerEdit) -> Result<(), String> {
    let path = triggers_path(config)?;
    let mut triggers = load_triggers(&path).map_err(|e| e.to_string())?;

    let result = match &edit {
        TriggerEdit::AddVoice { pattern, text } => triggers.add_voice(pattern, text),
        TriggerEdit::RemoveVoice { pattern } => triggers.remove_voice(pattern),
        TriggerEdit::AddOverlay {
            pattern,
            message,
            duration,
        } => {
            let secs = parse_overlay_duration(duration)?;
            triggers.add_overlay(pattern, message, secs)
        }
        TriggerEdit::RemoveOverlay { pattern } => triggers.remove_overlay(pattern),
        TriggerEdit::AddProfile { identity } => triggers.add_profile(identity),
        TriggerEdit::RemoveProfile { identity } => triggers.remove_profile(identity),
        TriggerEdit::Subscribe { identity, pattern } => triggers.subscribe(identity, pattern),
        TriggerEdit::Unsubscribe { identity, pattern } => triggers.unsubscribe(identity, pattern),
    };
    result.map_err(|e| e.to_string())?;

    save_triggers(&path, &triggers).map_err(|e| e.to_string())?;
    tracing::info!(?edit, path = %path.display(), "Trigger file updated");
    println!("Saved {}", path.display());
    Ok(())
}

/// Plain seconds or `M:SS`
fn parse_overlay_duration(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let secs = match text.parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => eqtrak_types::formatting::parse_clock_duration(text),
    };
    secs.and_then(|s| u32::try_from(s).ok())
        .ok_or_else(|| format!("Invalid duration {text:?}, expected seconds or M:SS"))
}

fn triggers_path(config: &AppConfig) -> Result<PathBuf, String> {
    config
        .triggers_path()
        .ok_or_else(|| "No configuration directory for the trigger file".to_string())
}

fn load_trigger_config(config: &AppConfig) -> Result<TriggerConfig, String> {
    match config.triggers_path() {
        Some(path) => load_triggers(&path).map_err(|e| e.to_string()),
        None => Ok(TriggerConfig::default()),
    }
}
