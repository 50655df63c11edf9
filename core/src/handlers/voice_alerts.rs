//! Spoken alerts for speech triggers.
//!
//! Speaking is slow, so text is handed to a dedicated worker thread over a
//! bounded queue. The poll tick never waits on it: when the queue is full
//! the request is dropped.

use std::io;
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use eqtrak_types::TriggerPayload;

use crate::events::{EventHandler, EventKind, GameEvent, HandlerError};

const INTERESTS: &[EventKind] = &[EventKind::Trigger];

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{program} exited with {status}")]
    Status { program: String, status: ExitStatus },
}

/// Something that can turn text into sound. Runs on the speech worker.
pub trait SpeechBackend: Send + 'static {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

/// Writes utterances to the log instead of speaking them.
#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechBackend for LogSpeech {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        tracing::info!(text, "Speech alert");
        Ok(())
    }
}

/// Runs an external program per utterance with the text as its last argument,
/// e.g. `espeak -s 160 <text>`.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    /// `None` when `argv` is empty
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl SpeechBackend for CommandSpeech {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SpeechError::Status {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Handle to the speech worker. Clones share the queue.
///
/// The worker exits once every handle is dropped and the queue drains.
#[derive(Debug, Clone)]
pub struct VoiceAlerts {
    tx: SyncSender<String>,
    enabled: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl VoiceAlerts {
    /// Start the worker thread. `queue_depth` requests may wait while one
    /// is being spoken; with 0, requests are only accepted while idle.
    pub fn spawn<B: SpeechBackend>(
        backend: B,
        queue_depth: usize,
        enabled: bool,
    ) -> io::Result<(Self, JoinHandle<()>)> {
        let (tx, rx) = mpsc::sync_channel(queue_depth);
        let busy = Arc::new(AtomicBool::new(false));

        let worker_busy = Arc::clone(&busy);
        let handle = thread::Builder::new()
            .name("eqtrak-speech".to_string())
            .spawn(move || run_speech_loop(backend, rx, worker_busy))?;

        let alerts = Self {
            tx,
            enabled: Arc::new(AtomicBool::new(enabled)),
            busy,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        Ok((alerts, handle))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Requests dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Queue `text` without blocking.
    pub fn say(&self, text: &str) -> Result<(), HandlerError> {
        match self.tx.try_send(text.to_string()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(text)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(text, "Speech worker busy, dropping alert");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(HandlerError::WorkerGone),
        }
    }
}

fn run_speech_loop<B: SpeechBackend>(mut backend: B, rx: Receiver<String>, busy: Arc<AtomicBool>) {
    while let Ok(text) = rx.recv() {
        busy.store(true, Ordering::Release);
        if let Err(e) = backend.speak(&text) {
            tracing::warn!(error = %e, text, "Speech failed");
        }
        busy.store(false, Ordering::Release);
    }
    tracing::debug!("Speech worker stopped");
}

impl EventHandler for VoiceAlerts {
    fn name(&self) -> &str {
        "voice"
    }

    fn interests(&self) -> &[EventKind] {
        INTERESTS
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn handle_event(&mut self, event: &GameEvent) -> Result<(), HandlerError> {
        match event {
            GameEvent::TriggerMatched {
                payload: TriggerPayload::Speech { text },
                ..
            } => self.say(text),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Blocks each utterance until the test releases it.
    struct GatedSpeech {
        gate: Receiver<()>,
        spoken: Arc<Mutex<Vec<String>>>,
    }

    impl SpeechBackend for GatedSpeech {
        fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
            let _ = self.gate.recv();
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn wait_until(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn drops_requests_while_queue_is_full() {
        let (gate_tx, gate) = mpsc::channel();
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let backend = GatedSpeech {
            gate,
            spoken: Arc::clone(&spoken),
        };
        let (voice, worker) = VoiceAlerts::spawn(backend, 1, true).unwrap();

        voice.say("one").unwrap();
        wait_until(|| voice.is_busy());
        voice.say("two").unwrap();
        voice.say("three").unwrap();
        assert_eq!(voice.dropped(), 1);

        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
        drop(voice);
        worker.join().unwrap();

        assert_eq!(*spoken.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn speaks_only_speech_payloads() {
        let (gate_tx, gate) = mpsc::channel();
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let backend = GatedSpeech {
            gate,
            spoken: Arc::clone(&spoken),
        };
        let (voice, worker) = VoiceAlerts::spawn(backend, 4, true).unwrap();
        let mut handler = voice.clone();

        handler
            .handle_event(&GameEvent::TriggerMatched {
                pattern: "Stone".to_string(),
                payload: TriggerPayload::Overlay {
                    message: "Stone Stance".to_string(),
                    duration_secs: 480,
                },
            })
            .unwrap();
        handler
            .handle_event(&GameEvent::TriggerMatched {
                pattern: "Your root has broken".to_string(),
                payload: TriggerPayload::Speech {
                    text: "Root has broken!".to_string(),
                },
            })
            .unwrap();

        gate_tx.send(()).unwrap();
        drop(handler);
        drop(voice);
        worker.join().unwrap();
        assert_eq!(*spoken.lock().unwrap(), vec!["Root has broken!"]);
    }

    #[test]
    fn command_backend_needs_a_program() {
        assert!(CommandSpeech::new(&[]).is_none());
        let backend = CommandSpeech::new(&["espeak".to_string(), "-s".to_string(), "160".to_string()])
            .unwrap();
        assert_eq!(backend.program, "espeak");
        assert_eq!(backend.args, vec!["-s", "160"]);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut backend = CommandSpeech::new(&["eqtrak-no-such-speech-program".to_string()]).unwrap();
        assert!(matches!(
            backend.speak("hello"),
            Err(SpeechError::Spawn { .. })
        ));
    }
}
