//! Active log file selection.
//!
//! The game client writes one file per character, named
//! `<prefix>_<character>_<rest>`. The most recently modified match is the
//! live one; its second underscore-delimited token is the identity label.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Label used when a matching filename has no usable character token.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("log directory {0:?} does not exist")]
    DirectoryMissing(PathBuf),
    #[error("no files starting with {prefix:?} in {dir:?}")]
    NoMatchingFiles { dir: PathBuf, prefix: String },
    #[error("failed to list {dir:?}: {source}")]
    Io { dir: PathBuf, source: io::Error },
}

/// The log file currently treated as the live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub directory: PathBuf,
    pub filename: String,
    /// Derived from `filename`, never edited
    pub label: String,
}

impl SourceIdentity {
    pub fn new(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let label = parse_log_filename(&filename);
        Self {
            directory: directory.into(),
            filename,
            label,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Extract the character label from a log filename.
///
/// `eqlog_Bort_server.txt` -> `Bort`
pub fn parse_log_filename(filename: &str) -> String {
    filename
        .split('_')
        .nth(1)
        .filter(|token| !token.is_empty())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string()
}

#[derive(Debug, Clone)]
pub struct LogFileEntry {
    pub path: PathBuf,
    pub filename: String,
    pub character_name: String,
    pub modified: SystemTime,
}

/// Matching log files in one directory, newest first.
#[derive(Debug, Clone, Default)]
pub struct DirectoryIndex {
    dir: PathBuf,
    entries: Vec<LogFileEntry>,
}

impl DirectoryIndex {
    /// List the regular files in `dir` whose names start with `prefix`.
    ///
    /// Ordered by modification time descending, then filename ascending so
    /// equal timestamps always resolve the same way.
    pub fn scan(dir: &Path, prefix: &str) -> Result<Self, SelectError> {
        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SelectError::DirectoryMissing(dir.to_path_buf()));
            }
            Err(source) => {
                return Err(SelectError::Io {
                    dir: dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut entries: Vec<LogFileEntry> = read_dir
            .flatten()
            .filter_map(|entry| {
                let filename = entry.file_name().into_string().ok()?;
                if !filename.starts_with(prefix) {
                    return None;
                }
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                Some(LogFileEntry {
                    path: entry.path(),
                    character_name: parse_log_filename(&filename),
                    filename,
                    modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    pub fn entries(&self) -> &[LogFileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest_file(&self) -> Option<&LogFileEntry> {
        self.entries.first()
    }

    /// Identity of the newest file
    pub fn active_source(&self) -> Option<SourceIdentity> {
        self.newest_file()
            .map(|entry| SourceIdentity::new(&self.dir, entry.filename.clone()))
    }
}

/// Pick the live log file in `dir`.
///
/// Cheap enough to call on every poll tick. A missing directory or an
/// empty match set is an error the caller retries later.
pub fn select_active_source(dir: &Path, prefix: &str) -> Result<SourceIdentity, SelectError> {
    DirectoryIndex::scan(dir, prefix)?
        .active_source()
        .ok_or_else(|| SelectError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn picks_most_recently_modified() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "eqlog_Grimm_server.txt", 120);
        touch(dir.path(), "eqlog_Bort_server.txt", 10);
        touch(dir.path(), "dbg.txt", 0);

        let identity = select_active_source(dir.path(), "eqlog_").unwrap();
        assert_eq!(identity.filename, "eqlog_Bort_server.txt");
        assert_eq!(identity.label, "Bort");
        assert_eq!(identity.path(), dir.path().join("eqlog_Bort_server.txt"));
    }

    #[test]
    fn equal_mtimes_break_ties_by_filename() {
        let dir = TempDir::new().unwrap();
        let when = SystemTime::now() - Duration::from_secs(30);
        for name in ["eqlog_Zed_server.txt", "eqlog_Amy_server.txt"] {
            File::create(dir.path().join(name))
                .unwrap()
                .set_modified(when)
                .unwrap();
        }

        let identity = select_active_source(dir.path(), "eqlog_").unwrap();
        assert_eq!(identity.label, "Amy");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            select_active_source(&missing, "eqlog_"),
            Err(SelectError::DirectoryMissing(_))
        ));
    }

    #[test]
    fn no_matches_is_reported() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "other.txt", 0);
        fs::create_dir(dir.path().join("eqlog_Dir_server")).unwrap();
        assert!(matches!(
            select_active_source(dir.path(), "eqlog_"),
            Err(SelectError::NoMatchingFiles { .. })
        ));
    }

    #[test]
    fn label_is_second_token() {
        assert_eq!(parse_log_filename("eqlog_Bort_server.txt"), "Bort");
        assert_eq!(parse_log_filename("eqlog_Bort.txt"), "Bort.txt");
        assert_eq!(parse_log_filename("eqlog__server.txt"), UNKNOWN_LABEL);
        assert_eq!(parse_log_filename("eqlog"), UNKNOWN_LABEL);
    }

    #[test]
    fn index_lists_newest_first() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "eqlog_A_s.txt", 300);
        touch(dir.path(), "eqlog_B_s.txt", 200);
        touch(dir.path(), "eqlog_C_s.txt", 100);

        let index = DirectoryIndex::scan(dir.path(), "eqlog_").unwrap();
        let names: Vec<_> = index.entries().iter().map(|e| e.character_name.as_str()).collect();
        assert_eq!(names, ["C", "B", "A"]);
    }
}
