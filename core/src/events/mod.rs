pub mod classifier;
pub mod dispatcher;
pub mod handler;
pub mod signal;

pub use classifier::classify;
pub use dispatcher::{DispatchReport, EventDispatcher, HandlerId};
pub use handler::{EventHandler, HandlerError};
pub use signal::{EventKind, GameEvent};
