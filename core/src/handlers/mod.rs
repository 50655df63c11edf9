//! Built-in event consumers.

mod countdown;
mod overlay_bars;
mod timer_board;
mod voice_alerts;

pub use overlay_bars::{OverlayBar, OverlayBars};
pub use timer_board::{TimerBoard, TimerEntry};
pub use voice_alerts::{CommandSpeech, LogSpeech, SpeechBackend, SpeechError, VoiceAlerts};
