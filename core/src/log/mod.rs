//! Raw log access: the tailing cursor and line normalization.

mod line;
mod tail;

pub use line::{normalize, strip_timestamp};
pub use tail::{PollOutcome, TailCursor, TailError};
