//! Incremental reader for the active log file.
//!
//! The cursor only ever surfaces lines appended after it attached. It owns
//! the file handle and the byte offset; nothing else reads the file.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

use encoding_rs::WINDOWS_1252;
use memchr::{memchr_iter, memrchr};

use crate::context::SourceIdentity;

#[derive(Debug, thiserror::Error)]
pub enum TailError {
    #[error("failed to open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to seek in {path:?}: {source}")]
    Seek { path: PathBuf, source: io::Error },
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to stat {path:?}: {source}")]
    Metadata { path: PathBuf, source: io::Error },
}

/// Result of a single poll.
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Complete lines appended since the previous poll, in file order
    Lines(Vec<String>),
    /// No usable handle; the caller should re-run selection and attach
    Detached,
}

#[derive(Debug)]
struct AttachedFile {
    identity: SourceIdentity,
    path: PathBuf,
    file: File,
    offset: u64,
}

/// Last good position of a file whose read failed while it still existed.
#[derive(Debug)]
struct ResumePoint {
    filename: String,
    held: fs::Metadata,
    offset: u64,
}

#[derive(Debug, Default)]
pub struct TailCursor {
    attached: Option<AttachedFile>,
    resume: Option<ResumePoint>,
}

impl TailCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `identity`'s file positioned at its current end.
    ///
    /// After a read failure, re-attaching to the same file (same name, same
    /// file on disk, not shorter than before) resumes from the last good
    /// offset instead, so lines appended in the meantime are not lost.
    ///
    /// Any previous handle is closed first, even if the open fails.
    /// Returns the starting offset.
    pub fn attach(&mut self, identity: SourceIdentity) -> Result<u64, TailError> {
        self.attached = None;

        let path = identity.path();
        let mut file = File::open(&path).map_err(|source| TailError::Open {
            path: path.clone(),
            source,
        })?;
        let on_open = file.metadata().map_err(|source| TailError::Metadata {
            path: path.clone(),
            source,
        })?;

        let resume_from = self.resume.take().and_then(|point| {
            (point.filename == identity.filename
                && same_file(&point.held, &on_open)
                && on_open.len() >= point.offset)
                .then_some(point.offset)
        });
        let start = match resume_from {
            Some(offset) => SeekFrom::Start(offset),
            None => SeekFrom::End(0),
        };
        let offset = file.seek(start).map_err(|source| TailError::Seek {
            path: path.clone(),
            source,
        })?;

        if resume_from.is_some() {
            tracing::info!(path = %path.display(), offset, label = %identity.label, "Resumed log file after read failure");
        } else {
            tracing::info!(path = %path.display(), offset, label = %identity.label, "Attached to log file");
        }
        self.attached = Some(AttachedFile {
            identity,
            path,
            file,
            offset,
        });
        Ok(offset)
    }

    /// Drop the handle, returning the identity that was attached.
    /// Forgets any pending resume point.
    pub fn detach(&mut self) -> Option<SourceIdentity> {
        self.resume = None;
        self.attached.take().map(|a| a.identity)
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn identity(&self) -> Option<&SourceIdentity> {
        self.attached.as_ref().map(|a| &a.identity)
    }

    pub fn offset(&self) -> Option<u64> {
        self.attached.as_ref().map(|a| a.offset)
    }

    /// Read complete lines appended since the last poll.
    ///
    /// A stale handle (file removed, replaced or truncated) or any I/O
    /// failure detaches the cursor and returns [`PollOutcome::Detached`].
    /// Only an I/O failure remembers the offset for the next [`attach`].
    ///
    /// [`attach`]: TailCursor::attach
    pub fn poll(&mut self) -> PollOutcome {
        let Some(attached) = self.attached.as_mut() else {
            return PollOutcome::Detached;
        };

        match attached.read_new_lines() {
            Ok(Some(lines)) => PollOutcome::Lines(lines),
            Ok(None) => {
                tracing::info!(path = %attached.path.display(), "Log file went stale, detaching");
                self.detach();
                PollOutcome::Detached
            }
            Err(e) => {
                tracing::warn!(error = %e, offset = attached.offset, "Log read failed, detaching");
                let resume = attached.file.metadata().ok().map(|held| ResumePoint {
                    filename: attached.identity.filename.clone(),
                    held,
                    offset: attached.offset,
                });
                self.detach();
                self.resume = resume;
                PollOutcome::Detached
            }
        }
    }
}

impl AttachedFile {
    /// `Ok(None)` when the handle no longer refers to the file at `path`.
    fn read_new_lines(&mut self) -> Result<Option<Vec<String>>, TailError> {
        let on_disk = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TailError::Metadata {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let held = self.file.metadata().map_err(|source| TailError::Metadata {
            path: self.path.clone(),
            source,
        })?;

        if !same_file(&on_disk, &held) {
            return Ok(None);
        }

        let len = held.len();
        if len < self.offset {
            return Ok(None);
        }
        if len == self.offset {
            return Ok(Some(Vec::new()));
        }

        self.file
            .seek(SeekFrom::Start(self.offset))
            .map_err(|source| TailError::Seek {
                path: self.path.clone(),
                source,
            })?;

        let mut buf = Vec::with_capacity((len - self.offset) as usize);
        (&mut self.file)
            .take(len - self.offset)
            .read_to_end(&mut buf)
            .map_err(|source| TailError::Read {
                path: self.path.clone(),
                source,
            })?;

        // A trailing line without its terminator is left for the next poll
        let Some(last_newline) = memrchr(b'\n', &buf) else {
            return Ok(Some(Vec::new()));
        };
        let complete = &buf[..=last_newline];
        self.offset += complete.len() as u64;

        Ok(Some(split_lines(complete)))
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        let raw = &bytes[start..end];
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(raw);
        lines.push(text.into_owned());
        start = end + 1;
    }
    lines
}

#[cfg(unix)]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

// No stable file index off unix; a recreated file gets a new creation time
#[cfg(not(unix))]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    match (a.created(), b.created()) {
        (Ok(a), Ok(b)) => a == b,
        _ => true,
    }
}
