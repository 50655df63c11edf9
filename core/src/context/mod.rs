mod app_config;
mod directory_index;
mod tail_session;

pub use app_config::{APP_NAME, AppConfig, validate_log_directory};
pub use directory_index::{
    DirectoryIndex, LogFileEntry, SelectError, SourceIdentity, UNKNOWN_LABEL, parse_log_filename,
    select_active_source,
};
pub use tail_session::{PipelineState, SessionConfig, TailSession, TickReport};
